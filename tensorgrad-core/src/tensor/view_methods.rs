use crate::device::StorageDevice;
use crate::error::TensorGradError;
use crate::ops::device::to_device_op;
use crate::ops::linalg::{permute_op, transpose_op};
use crate::ops::view::{concat_op, expand_op, index_select_op, narrow_op, reshape_op};
use crate::tensor::Tensor;

/// Shape manipulation. Tensors stay contiguous: `reshape` shares the buffer and
/// the other methods copy the selected elements.
impl Tensor {
    /// Returns a tensor with the same elements and `new_shape`.
    ///
    /// This method delegates the operation (including autograd handling) to
    /// [`ops::view::reshape_op`](crate::ops::view::reshape_op).
    pub fn reshape(&self, new_shape: Vec<usize>) -> Result<Tensor, TensorGradError> {
        reshape_op(self, new_shape)
    }

    /// Swaps dimensions `dim0` and `dim1`.
    pub fn transpose(&self, dim0: usize, dim1: usize) -> Result<Tensor, TensorGradError> {
        transpose_op(self, dim0, dim1)
    }

    /// Reorders dimensions so that output axis `i` is input axis `dims[i]`.
    pub fn permute(&self, dims: &[usize]) -> Result<Tensor, TensorGradError> {
        permute_op(self, dims)
    }

    pub fn index_select(&self, axis: usize, indices: &[usize]) -> Result<Tensor, TensorGradError> {
        index_select_op(self, axis, indices)
    }

    pub fn narrow(&self, axis: usize, start: usize, length: usize) -> Result<Tensor, TensorGradError> {
        narrow_op(self, axis, start, length)
    }

    /// Replicates the tensor to `shape` following broadcasting rules.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Tensor, TensorGradError> {
        expand_op(self, shape)
    }

    /// Joins `tensors` along `axis`.
    pub fn concat(tensors: &[Tensor], axis: usize) -> Result<Tensor, TensorGradError> {
        concat_op(tensors, axis)
    }

    pub fn to_device(&self, device: StorageDevice) -> Result<Tensor, TensorGradError> {
        to_device_op(self, device)
    }
}

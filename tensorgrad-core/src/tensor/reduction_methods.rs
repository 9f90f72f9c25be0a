use crate::error::TensorGradError;
use crate::ops::reduction::{max_op, mean_op, min_op, sum_op};
use crate::tensor::Tensor;

impl Tensor {
    /// Sum of all elements, as a 0-d tensor.
    pub fn sum(&self) -> Result<Tensor, TensorGradError> {
        sum_op(self, None, false)
    }

    /// Sums over `axes`. Delegates to `ops::reduction::sum_op`.
    pub fn sum_axes(&self, axes: &[usize], keep_dims: bool) -> Result<Tensor, TensorGradError> {
        sum_op(self, Some(axes), keep_dims)
    }

    /// Computes the mean of the tensor elements over given axes.
    /// Delegates to `ops::reduction::mean_op`.
    pub fn mean(&self, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, TensorGradError> {
        mean_op(self, axes, keep_dims)
    }

    /// Computes the maximum of the tensor elements over given axes.
    /// Delegates to `ops::reduction::max_op`.
    pub fn max(&self, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, TensorGradError> {
        max_op(self, axes, keep_dims)
    }

    pub fn min(&self, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, TensorGradError> {
        min_op(self, axes, keep_dims)
    }
}

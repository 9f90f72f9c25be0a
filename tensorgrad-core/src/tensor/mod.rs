use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::autograd::NodeId;
use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::TensorGradError;
use crate::tensor_data::TensorData;
use crate::types::DType;

mod arithmetic_methods;
mod autograd;
mod inplace;
mod reduction_methods;
mod traits;
mod view_methods;

pub mod broadcast_utils;
pub mod create;
pub mod utils;

pub use create::{
    from_vec, from_vec_f32, from_vec_f64, from_vec_with_config, full, full_like, full_with_config, ones, ones_like, rand_uniform,
    rand_uniform_with_config, randn, randn_with_config, scalar, zeros, zeros_like,
    zeros_with_config,
};

/// Represents a multi-dimensional array that can take part in a computation graph.
///
/// `Tensor` is a cheap handle: cloning it clones the `Arc`, so every clone refers to
/// the same node. `Arc<RwLock<..>>` lets operation records and the backward executor
/// update `grad` and `grad_fn` through shared references.
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates an F32 tensor on the default device.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, TensorGradError> {
        let device = crate::config::default_config().device;
        Tensor::from_buffer(Buffer::F32(data_vec), shape, device)
    }

    /// Creates an F64 tensor on the default device.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, TensorGradError> {
        let device = crate::config::default_config().device;
        Tensor::from_buffer(Buffer::F64(data_vec), shape, device)
    }

    /// Wraps an owned buffer into a new leaf tensor.
    pub fn from_buffer(
        buffer: Buffer,
        shape: Vec<usize>,
        device: StorageDevice,
    ) -> Result<Self, TensorGradError> {
        Ok(Tensor::from_data(TensorData::new(buffer, shape, device)?))
    }

    pub(crate) fn from_data(data: TensorData) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    ///
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    pub fn dtype(&self) -> DType {
        self.read_data().dtype
    }

    pub fn device(&self) -> StorageDevice {
        self.read_data().device
    }

    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Shared handle to the element buffer.
    pub fn buffer(&self) -> Arc<Buffer> {
        Arc::clone(&self.read_data().buffer)
    }

    /// Copies the elements out, widened to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.read_data().buffer.to_f64_vec()
    }

    /// Copies the elements out. Fails with `DataTypeMismatch` unless the tensor is F32.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, TensorGradError> {
        Ok(self.read_data().buffer.try_get_f32()?.to_vec())
    }

    /// Copies the elements out. Fails with `DataTypeMismatch` unless the tensor is F64.
    pub fn get_f64_data(&self) -> Result<Vec<f64>, TensorGradError> {
        Ok(self.read_data().buffer.try_get_f64()?.to_vec())
    }

    /// Reads one element by multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Result<f64, TensorGradError> {
        let guard = self.read_data();
        let offset = utils::flat_index(index, &guard.shape)?;
        guard
            .buffer
            .get_f64(offset)
            .ok_or_else(|| TensorGradError::InternalError("buffer shorter than shape".to_string()))
    }

    /// Value of a single-element tensor (any rank).
    pub fn item(&self) -> Result<f64, TensorGradError> {
        let guard = self.read_data();
        if guard.numel() != 1 {
            return Err(TensorGradError::ShapeMismatch {
                expected: vec![],
                actual: guard.shape.clone(),
                operation: "item".to_string(),
            });
        }
        guard
            .buffer
            .get_f64(0)
            .ok_or_else(|| TensorGradError::InternalError("empty buffer".to_string()))
    }

    /// Stable identity of the graph node behind this handle.
    pub fn node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }

    /// Whether both handles refer to the same graph node.
    pub fn ptr_eq(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::TensorGradError;
use crate::tensor::Tensor;
use crate::types::DType;

/// Internal storage and metadata for a Tensor.
///
/// It is wrapped in `Arc<RwLock<TensorData>>` by `Tensor` so that operation records,
/// user handles and the backward executor can share one node of the graph.
#[derive(Debug)]
pub struct TensorData {
    /// Contiguous row-major elements. Shared (not copied) by reshape and detach;
    /// in-place writes go through `Arc::make_mut`, so sharers never observe them.
    pub(crate) buffer: Arc<Buffer>,
    /// Backend the tensor's kernels run on.
    pub(crate) device: StorageDevice,
    pub(crate) dtype: DType,
    pub(crate) shape: Vec<usize>,

    /// If true, operations involving this tensor are recorded in the graph.
    pub(crate) requires_grad: bool,
    /// Accumulated gradient, same shape as the tensor. Allocated on the first
    /// backward contribution.
    pub(crate) grad: Option<Tensor>,
    /// Record of the operation that produced this tensor. `None` for leaves.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp>>,
    /// Number of live operation records holding this tensor as an input or saved operand.
    pub(crate) uses: Arc<AtomicUsize>,
}

impl TensorData {
    /// Creates leaf metadata around `buffer`.
    ///
    /// # Errors
    /// `TensorCreationError` if the buffer length does not match the number of
    /// elements described by `shape`.
    pub fn new(buffer: Buffer, shape: Vec<usize>, device: StorageDevice) -> Result<Self, TensorGradError> {
        let numel: usize = shape.iter().product();
        if buffer.len() != numel {
            return Err(TensorGradError::TensorCreationError {
                data_len: buffer.len(),
                shape,
            });
        }
        Ok(TensorData {
            dtype: buffer.dtype(),
            buffer: Arc::new(buffer),
            device,
            shape,
            requires_grad: false,
            grad: None,
            grad_fn: None,
            uses: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Leaf metadata sharing an existing buffer. The caller guarantees the length matches.
    pub(crate) fn sharing(buffer: Arc<Buffer>, shape: Vec<usize>, device: StorageDevice) -> Self {
        TensorData {
            dtype: buffer.dtype(),
            buffer,
            device,
            shape,
            requires_grad: false,
            grad: None,
            grad_fn: None,
            uses: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn is_leaf(&self) -> bool {
        self.grad_fn.is_none()
    }

    /// How many live operation records currently reference this tensor.
    pub fn live_uses(&self) -> usize {
        self.uses.load(Ordering::SeqCst)
    }
}

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::TensorGradError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Identity of a graph node: the address of the tensor's shared lock.
///
/// Only used as a map key; the executor keeps `Tensor` handles alive for as long
/// as an id is in use.
pub type NodeId = *const RwLock<TensorData>;

/// Defines the backward pass of one differentiable operation.
///
/// An implementation is stored in the output tensor's `grad_fn` and holds
/// everything the local derivative needs. The executor calls `backward` with
/// dL/dOutput and expects dL/dInput for every input.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes the gradient of every input from the gradient of the output.
    ///
    /// The returned vector has exactly one entry per element of `inputs()`, in the
    /// same order, each with the shape the input had when the operation ran.
    /// Runs with grad mode disabled, so the tensors built here are never tracked.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError>;

    /// The tensors this operation consumed, in gradient order.
    fn inputs(&self) -> Vec<Tensor>;

    /// Short operation name used in logs and error messages.
    fn name(&self) -> &'static str;
}

/// A tensor retained by an operation record.
///
/// While the handle lives, the tensor's use counter is raised, which makes in-place
/// mutation of the tensor fail instead of silently invalidating the record.
#[derive(Debug)]
pub struct SavedTensor {
    tensor: Tensor,
    uses: Arc<AtomicUsize>,
}

impl SavedTensor {
    pub fn new(tensor: &Tensor) -> Self {
        let uses = Arc::clone(&tensor.read_data().uses);
        uses.fetch_add(1, Ordering::SeqCst);
        SavedTensor {
            tensor: tensor.clone(),
            uses,
        }
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }
}

impl Drop for SavedTensor {
    fn drop(&mut self) {
        self.uses.fetch_sub(1, Ordering::SeqCst);
    }
}

use std::sync::Arc;

use crate::autograd::graph::{self, ComputationGraph};
use crate::autograd::BackwardOp;
use crate::error::TensorGradError;
use crate::tensor::create::ones_like;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

impl Tensor {
    /// Checks if the tensor requires gradient computation.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` status of this tensor in place.
    /// Only allowed on leaf tensors.
    pub fn requires_grad_(&self, requires_grad: bool) -> Result<(), TensorGradError> {
        let mut guard = self.write_data();
        if guard.grad_fn.is_some() {
            return Err(TensorGradError::RequiresGradOnNonLeaf);
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// Builder form of [`Tensor::requires_grad_`].
    pub fn with_requires_grad(self, requires_grad: bool) -> Result<Self, TensorGradError> {
        self.requires_grad_(requires_grad)?;
        Ok(self)
    }

    pub fn is_leaf(&self) -> bool {
        self.read_data().is_leaf()
    }

    /// The record of the operation that produced this tensor.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp>> {
        self.read_data().grad_fn.clone()
    }

    /// The accumulated gradient, if any backward pass reached this tensor.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    /// Resets the gradient of this tensor to None.
    pub fn zero_grad(&self) {
        self.write_data().grad = None;
    }

    /// Creates a new leaf that shares this tensor's buffer but is detached from
    /// the computation graph (`requires_grad == false`).
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        Tensor::from_data(TensorData::sharing(
            Arc::clone(&guard.buffer),
            guard.shape.clone(),
            guard.device,
        ))
    }

    /// Severs this tensor from its history in place.
    ///
    /// The tensor keeps `requires_grad`, so later operations still track it and a
    /// backward pass stops here, accumulating into its `grad` slot.
    pub fn detach_(&self) {
        let previous = self.write_data().grad_fn.take();
        if let Some(op) = previous {
            log::debug!("Detached tensor from its {} history", op.name());
        }
    }

    /// Alias of [`Tensor::detach_`]: cuts a hand-unrolled graph at this value.
    pub fn truncate(&self) {
        self.detach_();
    }

    /// Number of graph nodes reachable from this tensor, itself included.
    pub fn graph_size(&self) -> usize {
        graph::graph_size(self)
    }

    /// Number of live operation records that reference this tensor.
    pub fn live_uses(&self) -> usize {
        self.read_data().live_uses()
    }

    /// Computes gradients of this single-element tensor w.r.t. every tracked
    /// tensor of its graph. The seed is 1.
    pub fn backward(&self) -> Result<(), TensorGradError> {
        let numel = self.numel();
        if numel != 1 {
            return Err(TensorGradError::BackwardNonScalar { shape: self.shape() });
        }
        let seed = ones_like(self)?;
        self.backward_with_grad(&seed)
    }

    /// Computes gradients seeded with `gradient` (dL/dself), which must have this
    /// tensor's shape, precision and device.
    pub fn backward_with_grad(&self, gradient: &Tensor) -> Result<(), TensorGradError> {
        let (requires_grad, is_leaf, shape, dtype, device) = {
            let guard = self.read_data();
            (guard.requires_grad, guard.is_leaf(), guard.shape.clone(), guard.dtype, guard.device)
        };
        if !requires_grad {
            return Err(TensorGradError::RequiresGradNotMet);
        }
        if gradient.shape() != shape {
            return Err(TensorGradError::ShapeMismatch {
                expected: shape,
                actual: gradient.shape(),
                operation: "backward".to_string(),
            });
        }
        if gradient.dtype() != dtype {
            return Err(TensorGradError::DataTypeMismatch {
                expected: dtype,
                actual: gradient.dtype(),
                operation: "backward".to_string(),
            });
        }
        if gradient.device() != device {
            return Err(TensorGradError::DeviceMismatch {
                expected: device,
                actual: gradient.device(),
                operation: "backward".to_string(),
            });
        }
        if is_leaf {
            log::warn!("backward() called on a leaf tensor; only its own grad is updated");
        }
        let mut graph = ComputationGraph::new(self);
        graph.backward(gradient.detach())
    }
}

impl Clone for Tensor {
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

#[cfg(test)]
#[path = "autograd_test.rs"]
mod tests;

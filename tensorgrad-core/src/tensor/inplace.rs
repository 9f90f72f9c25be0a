//! In-place arithmetic.
//!
//! Every check runs before the tensor is touched, and the new values are computed
//! into a fresh buffer that replaces the old one, so handles sharing the previous
//! buffer never observe the write.

use std::sync::Arc;

use crate::error::TensorGradError;
use crate::ops::arithmetic::{add_op, add_scalar_op, div_op, mul_op, mul_scalar_op, sub_op};
use crate::tensor::broadcast_utils::broadcast_shapes;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

impl Tensor {
    /// Rejects mutations that would invalidate recorded history.
    fn check_inplace_allowed(&self, operation: &str) -> Result<(), TensorGradError> {
        let guard = self.read_data();
        if guard.live_uses() > 0 {
            return Err(TensorGradError::InplaceModification {
                operation: operation.to_string(),
                reason: format!(
                    "tensor is saved by {} live operation record(s) needed for backward",
                    guard.live_uses()
                ),
            });
        }
        if crate::autograd::is_grad_enabled() && guard.requires_grad && guard.is_leaf() {
            return Err(TensorGradError::InplaceModification {
                operation: operation.to_string(),
                reason: "a leaf tensor that requires grad cannot be modified while grad mode is enabled"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// The broadcast of `other` against `self` must not grow `self`.
    fn check_inplace_shape(&self, other: &Tensor, operation: &str) -> Result<(), TensorGradError> {
        let target = self.shape();
        let other_shape = other.shape();
        let mismatch = || TensorGradError::ShapeMismatch {
            expected: target.clone(),
            actual: other_shape.clone(),
            operation: operation.to_string(),
        };
        match broadcast_shapes(&target, &other_shape) {
            Ok(shape) if shape == target => Ok(()),
            _ => Err(mismatch()),
        }
    }

    /// A detached copy of this node carrying its history: same buffer, same record,
    /// fresh use counter.
    fn history_snapshot(&self) -> Tensor {
        let guard = self.read_data();
        let mut data = TensorData::sharing(Arc::clone(&guard.buffer), guard.shape.clone(), guard.device);
        data.requires_grad = guard.requires_grad;
        data.grad_fn = guard.grad_fn.clone();
        Tensor::from_data(data)
    }

    /// Runs `op(self, other)` and stores the result in `self`.
    ///
    /// When the operation must be tracked, the pre-mutation state moves into a
    /// snapshot tensor and `self` receives the new record `op(snapshot, other)`.
    fn apply_inplace<F>(&self, operation: &str, other: Option<&Tensor>, op: F) -> Result<(), TensorGradError>
    where
        F: FnOnce(&Tensor, &Tensor) -> Result<Tensor, TensorGradError>,
    {
        if let Some(other) = other {
            self.check_inplace_shape(other, operation)?;
        }
        self.check_inplace_allowed(operation)?;

        let tracking = crate::autograd::is_grad_enabled()
            && (self.requires_grad() || other.map_or(false, |o| o.requires_grad()));
        let source = if tracking { self.history_snapshot() } else { self.clone() };
        let rhs = match other {
            Some(other) if !other.ptr_eq(self) => other.clone(),
            _ => source.clone(),
        };
        let result = op(&source, &rhs)?;
        let (buffer, grad_fn) = {
            let guard = result.read_data();
            (Arc::clone(&guard.buffer), guard.grad_fn.clone())
        };
        drop(result);

        let mut guard = self.write_data();
        guard.buffer = buffer;
        if tracking {
            if let Some(op) = &grad_fn {
                log::debug!("Rebased history of in-place {} onto a new {} record", operation, op.name());
            }
            guard.requires_grad = grad_fn.is_some();
            guard.grad_fn = grad_fn;
        }
        Ok(())
    }

    /// `self += other` with broadcasting of `other`.
    ///
    /// # Errors
    /// `ShapeMismatch` if broadcasting would change `self`'s shape, `InplaceModification`
    /// if a live record saved `self` or `self` is a leaf requiring grad in grad mode.
    pub fn add_(&self, other: &Tensor) -> Result<(), TensorGradError> {
        self.apply_inplace("add_", Some(other), add_op)
    }

    pub fn sub_(&self, other: &Tensor) -> Result<(), TensorGradError> {
        self.apply_inplace("sub_", Some(other), sub_op)
    }

    pub fn mul_(&self, other: &Tensor) -> Result<(), TensorGradError> {
        self.apply_inplace("mul_", Some(other), mul_op)
    }

    pub fn div_(&self, other: &Tensor) -> Result<(), TensorGradError> {
        self.apply_inplace("div_", Some(other), div_op)
    }

    pub fn add_scalar_(&self, value: f64) -> Result<(), TensorGradError> {
        self.apply_inplace("add_scalar_", None, |t, _| add_scalar_op(t, value))
    }

    pub fn mul_scalar_(&self, value: f64) -> Result<(), TensorGradError> {
        self.apply_inplace("mul_scalar_", None, |t, _| mul_scalar_op(t, value))
    }
}

#[cfg(test)]
#[path = "inplace_test.rs"]
mod tests;

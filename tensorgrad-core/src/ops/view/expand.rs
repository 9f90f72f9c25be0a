use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::error::TensorGradError;
use crate::ops::{make_output, should_track, Operand};
use crate::tensor::broadcast_utils::broadcast_shapes;
use crate::tensor::Tensor;

/// The gradient of a broadcast is summed back over the replicated axes.
#[derive(Debug)]
struct ExpandBackward {
    input: SavedTensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for ExpandBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        Ok(vec![grad_output.reduce_to_shape(&self.input_shape)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        "expand"
    }
}

/// Materialises `input` broadcast to `target_shape` (NumPy rules).
///
/// Fails with `BroadcastError` when the shapes are incompatible and with
/// `ShapeMismatch` when broadcasting would need to grow beyond `target_shape`.
pub fn expand_op(input: &Tensor, target_shape: &[usize]) -> Result<Tensor, TensorGradError> {
    let operand = Operand::of(input);
    let broadcast = broadcast_shapes(&operand.shape, target_shape)?;
    if broadcast != target_shape {
        return Err(TensorGradError::ShapeMismatch {
            expected: target_shape.to_vec(),
            actual: broadcast,
            operation: "expand".to_string(),
        });
    }
    let buffer = operand
        .backend()
        .expand(&operand.buffer, &operand.shape, target_shape);
    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[input]) {
        Some(Arc::new(ExpandBackward {
            input: SavedTensor::new(input),
            input_shape: operand.shape.clone(),
        }))
    } else {
        None
    };
    make_output(buffer, target_shape.to_vec(), operand.device, grad_fn)
}

#[cfg(test)]
#[path = "expand_test.rs"]
mod tests;

use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::error::TensorGradError;
use crate::ops::{make_shared_output, should_track, Operand};
use crate::tensor::Tensor;

#[derive(Debug)]
struct ReshapeBackward {
    input: SavedTensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for ReshapeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        Ok(vec![reshape_op(grad_output, self.input_shape.clone())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        "reshape"
    }
}

/// Reinterprets `input` with `new_shape`. The element count must not change.
///
/// The result shares the input buffer.
pub fn reshape_op(input: &Tensor, new_shape: Vec<usize>) -> Result<Tensor, TensorGradError> {
    let operand = Operand::of(input);
    let new_numel: usize = new_shape.iter().product();
    if new_numel != operand.numel() {
        return Err(TensorGradError::ShapeMismatch {
            expected: operand.shape,
            actual: new_shape,
            operation: "reshape (element count must be preserved)".to_string(),
        });
    }
    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[input]) {
        Some(Arc::new(ReshapeBackward {
            input: SavedTensor::new(input),
            input_shape: operand.shape.clone(),
        }))
    } else {
        None
    };
    Ok(make_shared_output(operand.buffer, new_shape, operand.device, grad_fn))
}

#[cfg(test)]
#[path = "reshape_test.rs"]
mod tests;

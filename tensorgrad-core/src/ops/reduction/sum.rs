use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::backend::ReduceOp;
use crate::error::TensorGradError;
use crate::ops::reduction::utils::{calculate_reduction_output_shape, process_reduction_axes};
use crate::ops::view::{expand_op, reshape_op};
use crate::ops::{make_output, should_track, Operand};
use crate::tensor::Tensor;

/// Backward record for `sum_op`: the incoming gradient is spread uniformly over
/// every reduced position.
#[derive(Debug)]
struct SumBackward {
    input: SavedTensor,
    input_shape: Vec<usize>,
    axes: Vec<usize>,
}

impl BackwardOp for SumBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        let kept = calculate_reduction_output_shape(&self.input_shape, &self.axes, true);
        let grad = reshape_op(grad_output, kept)?;
        Ok(vec![expand_op(&grad, &self.input_shape)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        "sum"
    }
}

/// Sums `input` over `axes` (all axes when `None`).
///
/// An explicitly empty axis list reduces nothing and returns a copy.
pub fn sum_op(input: &Tensor, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, TensorGradError> {
    let operand = Operand::of(input);
    let axes = process_reduction_axes(operand.shape.len(), axes)?;
    let reduced = operand
        .backend()
        .reduce(ReduceOp::Sum, &operand.buffer, &operand.shape, &axes);
    let output_shape = calculate_reduction_output_shape(&operand.shape, &axes, keep_dims);

    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[input]) {
        Some(Arc::new(SumBackward {
            input: SavedTensor::new(input),
            input_shape: operand.shape.clone(),
            axes,
        }))
    } else {
        None
    };
    make_output(reduced.buffer, output_shape, operand.device, grad_fn)
}

#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;

//! Element-wise functions of a single tensor.
//!
//! All of them share [`UnaryBackward`]: the record keeps the input and the forward
//! output buffer, and the backend evaluates `grad * f'(x)` from both.

use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::backend::{backend_for, UnaryOp};
use crate::buffer::Buffer;
use crate::error::TensorGradError;
use crate::ops::{make_output, make_shared_output, should_track, Operand};
use crate::tensor::Tensor;

/// Backward record for every `UnaryOp`.
///
/// The output is saved as a buffer rather than a tensor so the record never owns
/// the node that owns it.
#[derive(Debug)]
struct UnaryBackward {
    op: UnaryOp,
    name: &'static str,
    input: SavedTensor,
    output: Arc<Buffer>,
}

impl BackwardOp for UnaryBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        let input = Operand::of(self.input.tensor());
        let grad = Operand::of(grad_output);
        let buffer = backend_for(input.device).unary_backward(
            self.op,
            &input.buffer,
            &self.output,
            &grad.buffer,
        )?;
        Ok(vec![make_output(buffer, input.shape, input.device, None)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Applies `op` element-wise and records a [`UnaryBackward`] when tracking.
pub(crate) fn unary_op(input: &Tensor, op: UnaryOp, name: &'static str) -> Result<Tensor, TensorGradError> {
    let operand = Operand::of(input);
    let output = Arc::new(operand.backend().unary(op, &operand.buffer));
    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[input]) {
        Some(Arc::new(UnaryBackward {
            op,
            name,
            input: SavedTensor::new(input),
            output: Arc::clone(&output),
        }))
    } else {
        None
    };
    Ok(make_shared_output(output, operand.shape, operand.device, grad_fn))
}

pub fn exp_op(input: &Tensor) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::Exp, "exp")
}

/// Natural logarithm. Non-positive inputs yield NaN / -inf like the underlying float op.
pub fn ln_op(input: &Tensor) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::Ln, "ln")
}

pub fn sqrt_op(input: &Tensor) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::Sqrt, "sqrt")
}

/// Absolute value. The derivative at 0 is taken as 0.
pub fn abs_op(input: &Tensor) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::Abs, "abs")
}

pub fn tanh_op(input: &Tensor) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::Tanh, "tanh")
}

pub fn sigmoid_op(input: &Tensor) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::Sigmoid, "sigmoid")
}

#[cfg(test)]
#[path = "math_elem_test.rs"]
mod tests;

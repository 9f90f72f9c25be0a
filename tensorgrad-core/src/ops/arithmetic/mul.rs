use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::backend::BinaryOp;
use crate::error::TensorGradError;
use crate::ops::{binary_forward, make_output, should_track};
use crate::tensor::Tensor;

/// Backward operation context for multiplication. Both operands are saved.
#[derive(Debug)]
struct MulBackward {
    a: SavedTensor,
    b: SavedTensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for MulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        // grad_a = grad_output * b
        let grad_a = mul_op(grad_output, self.b.tensor())?.reduce_to_shape(&self.a_shape)?;
        // grad_b = grad_output * a
        let grad_b = mul_op(grad_output, self.a.tensor())?.reduce_to_shape(&self.b_shape)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.tensor().clone(), self.b.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        "mul"
    }
}

/// Element-wise `a * b` with broadcasting.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorGradError> {
    let (buffer, shape, device) = binary_forward(BinaryOp::Mul, a, b, "mul")?;
    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[a, b]) {
        Some(Arc::new(MulBackward {
            a: SavedTensor::new(a),
            b: SavedTensor::new(b),
            a_shape: a.shape(),
            b_shape: b.shape(),
        }))
    } else {
        None
    };
    make_output(buffer, shape, device, grad_fn)
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;

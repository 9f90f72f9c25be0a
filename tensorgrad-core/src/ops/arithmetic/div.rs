use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::backend::BinaryOp;
use crate::error::TensorGradError;
use crate::ops::arithmetic::{mul_op, neg_op};
use crate::ops::{binary_forward, make_output, should_track};
use crate::tensor::Tensor;

#[derive(Debug)]
struct DivBackward {
    a: SavedTensor,
    b: SavedTensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for DivBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        let a = self.a.tensor();
        let b = self.b.tensor();
        // d(a/b)/da = 1/b
        let grad_a = div_op(grad_output, b)?.reduce_to_shape(&self.a_shape)?;
        // d(a/b)/db = -a/b^2
        let b_squared = mul_op(b, b)?;
        let grad_b = neg_op(&div_op(&mul_op(grad_output, a)?, &b_squared)?)?
            .reduce_to_shape(&self.b_shape)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.tensor().clone(), self.b.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        "div"
    }
}

/// Element-wise `a / b` with broadcasting. Division by zero follows IEEE semantics.
pub fn div_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorGradError> {
    let (buffer, shape, device) = binary_forward(BinaryOp::Div, a, b, "div")?;
    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[a, b]) {
        Some(Arc::new(DivBackward {
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
#[path = "div_test.rs"]
mod tests;

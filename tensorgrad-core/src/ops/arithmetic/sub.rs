use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::backend::BinaryOp;
use crate::error::TensorGradError;
use crate::ops::arithmetic::neg_op;
use crate::ops::{binary_forward, make_output, should_track};
use crate::tensor::Tensor;

#[derive(Debug)]
struct SubBackward {
    a: SavedTensor,
    b: SavedTensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for SubBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        let grad_a = grad_output.reduce_to_shape(&self.a_shape)?;
        let grad_b = neg_op(grad_output)?.reduce_to_shape(&self.b_shape)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.tensor().clone(), self.b.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        "sub"
    }
}

/// Element-wise `a - b` with broadcasting.
pub fn sub_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorGradError> {
    let (buffer, shape, device) = binary_forward(BinaryOp::Sub, a, b, "sub")?;
    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[a, b]) {
        Some(Arc::new(SubBackward {
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
#[path = "sub_test.rs"]
mod tests;

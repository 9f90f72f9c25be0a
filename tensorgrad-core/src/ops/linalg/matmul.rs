use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::error::TensorGradError;
use crate::ops::linalg::transpose_op;
use crate::ops::{check_compatible, make_output, should_track, Operand};
use crate::tensor::Tensor;

/// Backward record for `a · b`. Both operands are saved.
#[derive(Debug)]
struct MatmulBackward {
    a: SavedTensor,
    b: SavedTensor,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        // dA = dC · Bᵀ, dB = Aᵀ · dC
        let grad_a = matmul_op(grad_output, &transpose_op(self.b.tensor(), 0, 1)?)?;
        let grad_b = matmul_op(&transpose_op(self.a.tensor(), 0, 1)?, grad_output)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.tensor().clone(), self.b.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        "matmul"
    }
}

/// Matrix product of two 2-D tensors: `(m, k) · (k, n) -> (m, n)`.
pub fn matmul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorGradError> {
    let lhs = Operand::of(a);
    let rhs = Operand::of(b);
    check_compatible(&lhs, &rhs, "matmul")?;
    if lhs.shape.len() != 2 || rhs.shape.len() != 2 {
        return Err(TensorGradError::UnsupportedOperation(format!(
            "matmul expects 2-D operands, got shapes {:?} and {:?}",
            lhs.shape, rhs.shape
        )));
    }
    let (m, k) = (lhs.shape[0], lhs.shape[1]);
    let (k2, n) = (rhs.shape[0], rhs.shape[1]);
    if k != k2 {
        return Err(TensorGradError::ShapeMismatch {
            expected: vec![k, n],
            actual: rhs.shape.clone(),
            operation: "matmul (inner dim)".to_string(),
        });
    }
    let buffer = lhs.backend().matmul(&lhs.buffer, &rhs.buffer, m, k, n)?;
    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[a, b]) {
        Some(Arc::new(MatmulBackward {
            a: SavedTensor::new(a),
            b: SavedTensor::new(b),
        }))
    } else {
        None
    };
    make_output(buffer, vec![m, n], lhs.device, grad_fn)
}

#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;

use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::buffer::Buffer;
use crate::error::TensorGradError;
use crate::ops::arithmetic::{add_scalar_op, mul_op, neg_op};
use crate::ops::{check_compatible, make_output, make_shared_output, should_track, Operand};
use crate::tensor::broadcast_utils::broadcast_shapes;
use crate::tensor::Tensor;

/// The incoming gradient is split by the selection mask: selected positions go to
/// `a`, the others to `b`, each then reduced to its operand's shape.
#[derive(Debug)]
struct WhereBackward {
    a: SavedTensor,
    b: SavedTensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
    /// Condition broadcast to the output shape, normalised to 0/1.
    mask: Arc<Buffer>,
}

impl BackwardOp for WhereBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        let mask = make_shared_output(
            Arc::clone(&self.mask),
            grad_output.shape(),
            grad_output.device(),
            None,
        );
        let inverse = add_scalar_op(&neg_op(&mask)?, 1.0)?;
        let grad_a = mul_op(grad_output, &mask)?.reduce_to_shape(&self.a_shape)?;
        let grad_b = mul_op(grad_output, &inverse)?.reduce_to_shape(&self.b_shape)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.tensor().clone(), self.b.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        "where"
    }
}

/// Selects `a` where `condition` is non-zero and `b` elsewhere. All three operands
/// broadcast together; the condition itself is never differentiated.
pub fn where_op(condition: &Tensor, a: &Tensor, b: &Tensor) -> Result<Tensor, TensorGradError> {
    let cond = Operand::of(condition);
    let lhs = Operand::of(a);
    let rhs = Operand::of(b);
    check_compatible(&lhs, &rhs, "where")?;
    check_compatible(&lhs, &cond, "where (condition)")?;
    let out_shape = broadcast_shapes(&broadcast_shapes(&cond.shape, &lhs.shape)?, &rhs.shape)?;

    let backend = lhs.backend();
    let cond_full = backend.expand(&cond.buffer, &cond.shape, &out_shape);
    let mask = Buffer::from_f64_vec(
        cond_full
            .to_f64_vec()
            .into_iter()
            .map(|v| if v != 0.0 { 1.0 } else { 0.0 })
            .collect(),
        lhs.dtype,
    );
    let a_full = backend.expand(&lhs.buffer, &lhs.shape, &out_shape);
    let b_full = backend.expand(&rhs.buffer, &rhs.shape, &out_shape);
    let buffer = Buffer::select(&mask, &a_full, &b_full)?;

    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[a, b]) {
        Some(Arc::new(WhereBackward {
            a: SavedTensor::new(a),
            b: SavedTensor::new(b),
            a_shape: lhs.shape.clone(),
            b_shape: rhs.shape.clone(),
            mask: Arc::new(mask),
        }))
    } else {
        None
    };
    make_output(buffer, out_shape, lhs.device, grad_fn)
}

#[cfg(test)]
#[path = "where_op_test.rs"]
mod tests;

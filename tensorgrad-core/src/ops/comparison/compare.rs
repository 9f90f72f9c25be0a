use crate::backend::BinaryOp;
use crate::error::TensorGradError;
use crate::ops::{binary_forward, make_output};
use crate::tensor::Tensor;

fn compare(op: BinaryOp, a: &Tensor, b: &Tensor, name: &str) -> Result<Tensor, TensorGradError> {
    let (buffer, shape, device) = binary_forward(op, a, b, name)?;
    make_output(buffer, shape, device, None)
}

/// Mask of `a > b`, broadcasting.
pub fn gt_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorGradError> {
    compare(BinaryOp::Gt, a, b, "gt")
}

pub fn lt_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorGradError> {
    compare(BinaryOp::Lt, a, b, "lt")
}

pub fn ge_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorGradError> {
    compare(BinaryOp::Ge, a, b, "ge")
}

pub fn le_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorGradError> {
    compare(BinaryOp::Le, a, b, "le")
}

/// Exact equality mask. NaN compares unequal to everything.
pub fn eq_op(a: &Tensor, b: &Tensor) -> Result<Tensor, TensorGradError> {
    compare(BinaryOp::Eq, a, b, "eq")
}

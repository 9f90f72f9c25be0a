use crate::backend::UnaryOp;
use crate::error::TensorGradError;
use crate::ops::math_elem::unary_op;
use crate::tensor::Tensor;

/// Adds a constant to every element.
pub fn add_scalar_op(input: &Tensor, value: f64) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::AddScalar(value), "add_scalar")
}

/// Multiplies every element by a constant.
pub fn mul_scalar_op(input: &Tensor, value: f64) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::MulScalar(value), "mul_scalar")
}

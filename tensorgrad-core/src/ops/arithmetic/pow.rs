use crate::backend::UnaryOp;
use crate::error::TensorGradError;
use crate::ops::math_elem::unary_op;
use crate::tensor::Tensor;

/// Raises every element to the scalar power `exponent`.
///
/// The record keeps the input and the exponent; the derivative is
/// `exponent * x^(exponent - 1)`.
pub fn pow_scalar_op(input: &Tensor, exponent: f64) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::PowScalar(exponent), "pow_scalar")
}

#[cfg(test)]
#[path = "pow_test.rs"]
mod tests;

use crate::backend::UnaryOp;
use crate::error::TensorGradError;
use crate::ops::math_elem::unary_op;
use crate::tensor::Tensor;

/// `max(x, 0)`. The derivative at 0 is taken as 0.
pub fn relu_op(input: &Tensor) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::Relu, "relu")
}

/// `x` for positive inputs, `alpha * x` otherwise.
pub fn leaky_relu_op(input: &Tensor, alpha: f64) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::LeakyRelu(alpha), "leaky_relu")
}

/// `x` for positive inputs, `alpha * (exp(x) - 1)` otherwise.
pub fn elu_op(input: &Tensor, alpha: f64) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::Elu(alpha), "elu")
}

/// Scaled ELU with the standard self-normalising constants.
pub fn selu_op(input: &Tensor) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::Selu, "selu")
}

#[cfg(test)]
#[path = "relu_test.rs"]
mod tests;

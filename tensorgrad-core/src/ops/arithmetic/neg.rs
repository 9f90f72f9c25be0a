use crate::backend::UnaryOp;
use crate::error::TensorGradError;
use crate::ops::math_elem::unary_op;
use crate::tensor::Tensor;

/// Element-wise negation.
pub fn neg_op(input: &Tensor) -> Result<Tensor, TensorGradError> {
    unary_op(input, UnaryOp::Neg, "neg")
}

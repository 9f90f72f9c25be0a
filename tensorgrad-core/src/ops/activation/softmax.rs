use crate::error::TensorGradError;
use crate::ops::arithmetic::{div_op, sub_op};
use crate::ops::math_elem::exp_op;
use crate::ops::reduction::{max_op, sum_op};
use crate::tensor::utils::check_axis;
use crate::tensor::Tensor;

/// Softmax along `axis`, composed from primitives.
///
/// The per-slice maximum is subtracted as a constant first, which leaves the
/// result and its gradient unchanged.
pub fn softmax_op(input: &Tensor, axis: usize) -> Result<Tensor, TensorGradError> {
    check_axis(axis, input.rank())?;
    let shift = max_op(input, Some(&[axis]), true)?.detach();
    let exps = exp_op(&sub_op(input, &shift)?)?;
    let total = sum_op(&exps, Some(&[axis]), true)?;
    div_op(&exps, &total)
}

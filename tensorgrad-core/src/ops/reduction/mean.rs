use crate::error::TensorGradError;
use crate::ops::arithmetic::mul_scalar_op;
use crate::ops::reduction::sum_op;
use crate::ops::reduction::utils::{process_reduction_axes, reduced_extent};
use crate::tensor::Tensor;

/// Arithmetic mean over `axes` (all axes when `None`).
///
/// Built as `sum * (1 / count)`, so the gradient is the uniform sum gradient scaled
/// by `1 / count`. Averaging over an empty extent yields NaN.
pub fn mean_op(input: &Tensor, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, TensorGradError> {
    let shape = input.shape();
    let axes = process_reduction_axes(shape.len(), axes)?;
    let count = reduced_extent(&shape, &axes) as f64;
    let sum = sum_op(input, Some(&axes), keep_dims)?;
    mul_scalar_op(&sum, 1.0 / count)
}

#[cfg(test)]
#[path = "mean_test.rs"]
mod tests;

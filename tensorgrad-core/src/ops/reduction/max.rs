use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::backend::ReduceOp;
use crate::error::TensorGradError;
use crate::ops::reduction::utils::{
    calculate_reduction_output_shape, process_reduction_axes, reduced_extent,
};
use crate::ops::{make_output, should_track, Operand};
use crate::tensor::Tensor;

/// Backward record shared by `max_op` and `min_op`.
///
/// `arg_indices[o]` is the flat input position selected for output element `o`; the
/// gradient is routed there and nowhere else.
#[derive(Debug)]
struct ExtremumBackward {
    name: &'static str,
    input: SavedTensor,
    input_shape: Vec<usize>,
    arg_indices: Vec<usize>,
}

impl BackwardOp for ExtremumBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        let grad = Operand::of(grad_output);
        let numel = self.input_shape.iter().product();
        let buffer = grad.buffer.scatter_add_flat(numel, &self.arg_indices)?;
        Ok(vec![make_output(buffer, self.input_shape.clone(), grad.device, None)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

fn extremum_op(
    op: ReduceOp,
    name: &'static str,
    input: &Tensor,
    axes: Option<&[usize]>,
    keep_dims: bool,
) -> Result<Tensor, TensorGradError> {
    let operand = Operand::of(input);
    let axes = process_reduction_axes(operand.shape.len(), axes)?;
    if reduced_extent(&operand.shape, &axes) == 0 {
        return Err(TensorGradError::InvalidArgument(format!(
            "{} over an empty extent of shape {:?}",
            name, operand.shape
        )));
    }
    let reduced = operand.backend().reduce(op, &operand.buffer, &operand.shape, &axes);
    let output_shape = calculate_reduction_output_shape(&operand.shape, &axes, keep_dims);
    let arg_indices = reduced.arg_indices.ok_or_else(|| {
        TensorGradError::InternalError(format!("{} reduction returned no arg indices", name))
    })?;

    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[input]) {
        Some(Arc::new(ExtremumBackward {
            name,
            input: SavedTensor::new(input),
            input_shape: operand.shape.clone(),
            arg_indices,
        }))
    } else {
        None
    };
    make_output(reduced.buffer, output_shape, operand.device, grad_fn)
}

/// Maximum over `axes` (all axes when `None`).
///
/// The gradient flows only to the first maximal element, in row-major order over the
/// reduced axes.
pub fn max_op(input: &Tensor, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, TensorGradError> {
    extremum_op(ReduceOp::Max, "max", input, axes, keep_dims)
}

/// Minimum over `axes`; ties resolve like [`max_op`].
pub fn min_op(input: &Tensor, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, TensorGradError> {
    extremum_op(ReduceOp::Min, "min", input, axes, keep_dims)
}

#[cfg(test)]
#[path = "max_test.rs"]
mod tests;

//! Element selection along one axis: `index_select` and `narrow`.
//!
//! Both compute, for every output element, the flat input position it is copied
//! from. The backward pass scatter-adds the gradient to those positions, so
//! repeated indices accumulate and unselected positions receive zero.

use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::error::TensorGradError;
use crate::ops::{make_output, should_track, Operand};
use crate::tensor::utils::check_axis;
use crate::tensor::Tensor;

#[derive(Debug)]
struct GatherBackward {
    name: &'static str,
    input: SavedTensor,
    input_shape: Vec<usize>,
    source_positions: Vec<usize>,
}

impl BackwardOp for GatherBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        let grad = Operand::of(grad_output);
        let numel = self.input_shape.iter().product();
        let buffer = grad.buffer.scatter_add_flat(numel, &self.source_positions)?;
        Ok(vec![make_output(buffer, self.input_shape.clone(), grad.device, None)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Flat input positions of the output obtained by picking `indices` along `axis`.
fn source_positions(shape: &[usize], axis: usize, indices: &[usize]) -> Vec<usize> {
    let outer: usize = shape[..axis].iter().product();
    let inner: usize = shape[axis + 1..].iter().product();
    let dim = shape[axis];
    let mut positions = Vec::with_capacity(outer * indices.len() * inner);
    for o in 0..outer {
        for &i in indices {
            let base = (o * dim + i) * inner;
            positions.extend(base..base + inner);
        }
    }
    positions
}

fn gather_along(
    name: &'static str,
    input: &Tensor,
    axis: usize,
    indices: &[usize],
) -> Result<Tensor, TensorGradError> {
    let operand = Operand::of(input);
    check_axis(axis, operand.shape.len())?;
    let dim = operand.shape[axis];
    if let Some(&bad) = indices.iter().find(|&&i| i >= dim) {
        let mut index = vec![0; operand.shape.len()];
        index[axis] = bad;
        return Err(TensorGradError::IndexOutOfBounds {
            index,
            shape: operand.shape,
        });
    }
    let positions = source_positions(&operand.shape, axis, indices);
    let buffer = operand.buffer.gather_flat(&positions)?;
    let mut output_shape = operand.shape.clone();
    output_shape[axis] = indices.len();

    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[input]) {
        Some(Arc::new(GatherBackward {
            name,
            input: SavedTensor::new(input),
            input_shape: operand.shape.clone(),
            source_positions: positions,
        }))
    } else {
        None
    };
    make_output(buffer, output_shape, operand.device, grad_fn)
}

/// Picks the slices `indices` along `axis`, in order. Indices may repeat.
pub fn index_select_op(input: &Tensor, axis: usize, indices: &[usize]) -> Result<Tensor, TensorGradError> {
    gather_along("index_select", input, axis, indices)
}

/// Keeps `length` consecutive slices along `axis` starting at `start`.
pub fn narrow_op(input: &Tensor, axis: usize, start: usize, length: usize) -> Result<Tensor, TensorGradError> {
    let shape = input.shape();
    check_axis(axis, shape.len())?;
    let end = match start.checked_add(length) {
        Some(end) if end <= shape[axis] => end,
        _ => {
            return Err(TensorGradError::InvalidArgument(format!(
                "narrow: range starting at {} with length {} exceeds dimension {} of size {}",
                start, length, axis, shape[axis]
            )))
        }
    };
    let indices: Vec<usize> = (start..end).collect();
    gather_along("narrow", input, axis, &indices)
}

#[cfg(test)]
#[path = "gather_test.rs"]
mod tests;

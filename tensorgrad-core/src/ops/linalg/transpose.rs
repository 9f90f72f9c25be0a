use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::error::TensorGradError;
use crate::ops::{make_output, should_track, Operand};
use crate::tensor::utils::check_axis;
use crate::tensor::Tensor;

/// Applies the inverse permutation to the gradient.
#[derive(Debug)]
struct PermuteBackward {
    input: SavedTensor,
    dims: Vec<usize>,
}

impl BackwardOp for PermuteBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        let mut inverse = vec![0; self.dims.len()];
        for (i, &d) in self.dims.iter().enumerate() {
            inverse[d] = i;
        }
        Ok(vec![permute_op(grad_output, &inverse)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        "permute"
    }
}

/// Reorders the axes: output axis `i` is input axis `dims[i]`.
pub fn permute_op(input: &Tensor, dims: &[usize]) -> Result<Tensor, TensorGradError> {
    let operand = Operand::of(input);
    let rank = operand.shape.len();
    let mut seen = vec![false; rank];
    let valid = dims.len() == rank
        && dims.iter().all(|&d| d < rank && !std::mem::replace(&mut seen[d], true));
    if !valid {
        return Err(TensorGradError::InvalidPermutation {
            dims: dims.to_vec(),
            rank,
        });
    }
    let buffer = operand.backend().permute(&operand.buffer, &operand.shape, dims);
    let output_shape = dims.iter().map(|&d| operand.shape[d]).collect();
    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[input]) {
        Some(Arc::new(PermuteBackward {
            input: SavedTensor::new(input),
            dims: dims.to_vec(),
        }))
    } else {
        None
    };
    make_output(buffer, output_shape, operand.device, grad_fn)
}

/// Swaps two axes.
pub fn transpose_op(input: &Tensor, dim0: usize, dim1: usize) -> Result<Tensor, TensorGradError> {
    let rank = input.rank();
    check_axis(dim0, rank)?;
    check_axis(dim1, rank)?;
    let mut dims: Vec<usize> = (0..rank).collect();
    dims.swap(dim0, dim1);
    permute_op(input, &dims)
}

#[cfg(test)]
#[path = "transpose_test.rs"]
mod tests;

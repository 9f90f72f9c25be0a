use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::buffer::Buffer;
use crate::error::TensorGradError;
use crate::ops::view::narrow_op;
use crate::ops::{check_compatible, make_output, should_track, Operand};
use crate::tensor::utils::check_axis;
use crate::tensor::Tensor;

/// Splits the gradient back into one piece per input along the concatenation axis.
#[derive(Debug)]
struct ConcatBackward {
    inputs: Vec<SavedTensor>,
    axis: usize,
    sizes: Vec<usize>,
}

impl BackwardOp for ConcatBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        let mut start = 0;
        let mut grads = Vec::with_capacity(self.sizes.len());
        for &size in &self.sizes {
            grads.push(narrow_op(grad_output, self.axis, start, size)?);
            start += size;
        }
        Ok(grads)
    }

    fn inputs(&self) -> Vec<Tensor> {
        self.inputs.iter().map(|saved| saved.tensor().clone()).collect()
    }

    fn name(&self) -> &'static str {
        "concat"
    }
}

/// Joins `tensors` along `axis`. All other dimensions must agree.
pub fn concat_op(tensors: &[Tensor], axis: usize) -> Result<Tensor, TensorGradError> {
    let operands: Vec<Operand> = tensors.iter().map(Operand::of).collect();
    let first = operands.first().ok_or(TensorGradError::EmptyTensorList)?;
    let rank = first.shape.len();
    check_axis(axis, rank)?;
    for operand in &operands[1..] {
        check_compatible(first, operand, "concat")?;
        let agrees = operand.shape.len() == rank
            && (0..rank).all(|d| d == axis || operand.shape[d] == first.shape[d]);
        if !agrees {
            return Err(TensorGradError::ShapeMismatch {
                expected: first.shape.clone(),
                actual: operand.shape.clone(),
                operation: format!("concat along axis {}", axis),
            });
        }
    }

    let sizes: Vec<usize> = operands.iter().map(|o| o.shape[axis]).collect();
    let outer: usize = first.shape[..axis].iter().product();
    let inner: usize = first.shape[axis + 1..].iter().product();

    // Positions into the inputs laid end to end.
    let mut input_offsets = Vec::with_capacity(operands.len());
    let mut running = 0;
    for operand in &operands {
        input_offsets.push(running);
        running += operand.numel();
    }
    let mut positions = Vec::with_capacity(running);
    for o in 0..outer {
        for (t, &size) in sizes.iter().enumerate() {
            let chunk = size * inner;
            let base = input_offsets[t] + o * chunk;
            positions.extend(base..base + chunk);
        }
    }
    let buffers: Vec<&Buffer> = operands.iter().map(|o| o.buffer.as_ref()).collect();
    let buffer = Buffer::concat_flat(&buffers)?.gather_flat(&positions)?;

    let mut output_shape = first.shape.clone();
    output_shape[axis] = sizes.iter().sum();

    let refs: Vec<&Tensor> = tensors.iter().collect();
    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&refs) {
        Some(Arc::new(ConcatBackward {
            inputs: tensors.iter().map(SavedTensor::new).collect(),
            axis,
            sizes,
        }))
    } else {
        None
    };
    make_output(buffer, output_shape, first.device, grad_fn)
}

#[cfg(test)]
#[path = "concat_test.rs"]
mod tests;

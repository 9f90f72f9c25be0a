use crate::error::TensorGradError;
use crate::ops::reduction::sum_op;
use crate::ops::view::reshape_op;
use crate::tensor::Tensor;

/// Determines the output shape resulting from broadcasting two input shapes.
///
/// NumPy rules: shapes are aligned on their trailing dimensions, missing leading
/// dimensions count as 1, and a dimension of size 1 stretches to match the other.
pub fn broadcast_shapes(shape_a: &[usize], shape_b: &[usize]) -> Result<Vec<usize>, TensorGradError> {
    let rank = shape_a.len().max(shape_b.len());
    let mut result = vec![0; rank];
    for i in 0..rank {
        let dim_a = shape_a.len().checked_sub(i + 1).map_or(1, |j| shape_a[j]);
        let dim_b = shape_b.len().checked_sub(i + 1).map_or(1, |j| shape_b[j]);
        result[rank - 1 - i] = if dim_a == dim_b || dim_b == 1 {
            dim_a
        } else if dim_a == 1 {
            dim_b
        } else {
            return Err(TensorGradError::BroadcastError {
                shape1: shape_a.to_vec(),
                shape2: shape_b.to_vec(),
            });
        };
    }
    Ok(result)
}

/// Axes of `output_shape` along which a value of `input_shape` was replicated:
/// every leading axis `input_shape` lacks, plus every aligned axis where the input
/// has size 1 and the output does not.
pub fn broadcast_reduction_axes(input_shape: &[usize], output_shape: &[usize]) -> Vec<usize> {
    let rank_diff = output_shape.len().saturating_sub(input_shape.len());
    let mut axes: Vec<usize> = (0..rank_diff).collect();
    for (i, &dim) in input_shape.iter().enumerate() {
        let axis = rank_diff + i;
        if dim == 1 && output_shape.get(axis).map_or(false, |&out| out != 1) {
            axes.push(axis);
        }
    }
    axes
}

impl Tensor {
    /// Reduces a gradient computed in a broadcast output shape back to `target_shape`
    /// by summing over the replicated axes.
    pub fn reduce_to_shape(&self, target_shape: &[usize]) -> Result<Tensor, TensorGradError> {
        let current_shape = self.shape();
        if current_shape == target_shape {
            return Ok(self.clone());
        }
        let expected = broadcast_shapes(target_shape, &current_shape)?;
        if expected != current_shape {
            return Err(TensorGradError::InternalError(format!(
                "cannot reduce shape {:?} to {:?}",
                current_shape, target_shape
            )));
        }
        let axes = broadcast_reduction_axes(target_shape, &current_shape);
        let reduced = if axes.is_empty() {
            self.clone()
        } else {
            sum_op(self, Some(&axes), true)?
        };
        if reduced.shape() == target_shape {
            Ok(reduced)
        } else {
            reshape_op(&reduced, target_shape.to_vec())
        }
    }
}

#[cfg(test)]
#[path = "broadcast_utils_test.rs"]
mod tests;

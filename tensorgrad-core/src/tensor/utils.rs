use crate::error::TensorGradError;

/// Calculates the contiguous row-major strides for a given shape.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Converts a multi-dimensional index into the flat offset of a contiguous tensor.
pub fn flat_index(index: &[usize], shape: &[usize]) -> Result<usize, TensorGradError> {
    if index.len() != shape.len() || index.iter().zip(shape).any(|(&i, &d)| i >= d) {
        return Err(TensorGradError::IndexOutOfBounds {
            index: index.to_vec(),
            shape: shape.to_vec(),
        });
    }
    Ok(index
        .iter()
        .zip(calculate_strides(shape))
        .map(|(&i, stride)| i * stride)
        .sum())
}

/// Validates that `axis` addresses a dimension of a tensor of rank `rank`.
pub(crate) fn check_axis(axis: usize, rank: usize) -> Result<(), TensorGradError> {
    if axis >= rank {
        return Err(TensorGradError::InvalidAxis { axis, rank });
    }
    Ok(())
}

/// Sorts and validates a list of axes. Duplicates are rejected.
pub(crate) fn normalize_axes(axes: &[usize], rank: usize) -> Result<Vec<usize>, TensorGradError> {
    let mut sorted = axes.to_vec();
    sorted.sort_unstable();
    for window in sorted.windows(2) {
        if window[0] == window[1] {
            return Err(TensorGradError::InvalidArgument(format!(
                "axis {} listed more than once",
                window[0]
            )));
        }
    }
    for &axis in &sorted {
        check_axis(axis, rank)?;
    }
    Ok(sorted)
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;

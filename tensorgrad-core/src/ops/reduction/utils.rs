//! Axis bookkeeping shared by the reductions.

use crate::error::TensorGradError;
use crate::tensor::utils::normalize_axes;

/// Resolves the axes to reduce: `None` means all of them, otherwise the list is
/// validated against `rank` and sorted.
pub(crate) fn process_reduction_axes(
    rank: usize,
    axes: Option<&[usize]>,
) -> Result<Vec<usize>, TensorGradError> {
    match axes {
        None => Ok((0..rank).collect()),
        Some(axes) => normalize_axes(axes, rank),
    }
}

/// Shape of the reduction result.
pub(crate) fn calculate_reduction_output_shape(
    input_shape: &[usize],
    axes: &[usize],
    keep_dims: bool,
) -> Vec<usize> {
    input_shape
        .iter()
        .enumerate()
        .filter_map(|(i, &dim)| match (axes.contains(&i), keep_dims) {
            (false, _) => Some(dim),
            (true, true) => Some(1),
            (true, false) => None,
        })
        .collect()
}

/// Number of input elements folded into each output element.
pub(crate) fn reduced_extent(input_shape: &[usize], axes: &[usize]) -> usize {
    axes.iter().map(|&axis| input_shape[axis]).product()
}

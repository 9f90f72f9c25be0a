//! 2-D pooling over the spatial axes of `(N, C, H, W)` tensors.

use crate::error::TensorGradError;
use crate::ops::linalg::permute_op;
use crate::ops::reduction::{max_op, mean_op};
use crate::ops::view::window::{check_image, window_count};
use crate::ops::view::{pad_spatial_op, reshape_op, unfold_op};
use crate::tensor::Tensor;

/// Pads, unfolds and flattens each window to `(N, OH, OW, C, KH * KW)`.
fn pooling_windows(
    input: &Tensor,
    kernel: (usize, usize),
    stride: (usize, usize),
    padding: (usize, usize),
    fill: f64,
    operation: &str,
) -> Result<Tensor, TensorGradError> {
    let [n, c, h, w] = check_image(input, operation)?;
    if padding.0 >= kernel.0 || padding.1 >= kernel.1 {
        return Err(TensorGradError::InvalidArgument(format!(
            "{}: padding {:?} must be smaller than kernel {:?}",
            operation, padding, kernel
        )));
    }
    let oh = window_count(h + 2 * padding.0, kernel.0, stride.0, operation)?;
    let ow = window_count(w + 2 * padding.1, kernel.1, stride.1, operation)?;
    let padded = if padding == (0, 0) {
        input.clone()
    } else {
        pad_spatial_op(input, padding, fill)?
    };
    let patches = unfold_op(&padded, kernel, stride)?;
    reshape_op(&patches, vec![n, oh, ow, c, kernel.0 * kernel.1])
}

/// Maximum of every `kernel` window. Padding is filled with `-inf`, so it never wins.
pub fn max_pool2d_op(
    input: &Tensor,
    kernel: (usize, usize),
    stride: (usize, usize),
    padding: (usize, usize),
) -> Result<Tensor, TensorGradError> {
    let windows = pooling_windows(input, kernel, stride, padding, f64::NEG_INFINITY, "max_pool2d")?;
    let pooled = max_op(&windows, Some(&[4]), false)?;
    permute_op(&pooled, &[0, 3, 1, 2])
}

/// Mean of every `kernel` window. Padded zeros count towards the divisor.
pub fn avg_pool2d_op(
    input: &Tensor,
    kernel: (usize, usize),
    stride: (usize, usize),
    padding: (usize, usize),
) -> Result<Tensor, TensorGradError> {
    let windows = pooling_windows(input, kernel, stride, padding, 0.0, "avg_pool2d")?;
    let pooled = mean_op(&windows, Some(&[4]), false)?;
    permute_op(&pooled, &[0, 3, 1, 2])
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod tests;

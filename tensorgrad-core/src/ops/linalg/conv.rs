//! 2-D convolution and its transpose over `(N, C, H, W)` tensors.
//!
//! Both lower to `unfold` followed by a single `matmul`; the backward pass is the
//! composition of those records.

use crate::error::TensorGradError;
use crate::ops::linalg::{matmul_op, permute_op, transpose_op};
use crate::ops::view::window::{check_image, window_count};
use crate::ops::view::{dilate_spatial_op, index_select_op, pad_spatial_op, reshape_op, unfold_op};
use crate::tensor::Tensor;

fn check_filter(weight: &Tensor, operation: &str) -> Result<[usize; 4], TensorGradError> {
    let shape = weight.shape();
    match *shape.as_slice() {
        [a, b, kh, kw] => Ok([a, b, kh, kw]),
        _ => Err(TensorGradError::UnsupportedOperation(format!(
            "{} expects a 4-D filter, got shape {:?}",
            operation, shape
        ))),
    }
}

/// Cross-correlation of `input (N, C, H, W)` with `weight (OC, C, KH, KW)`.
///
/// The input is zero-padded by `padding` on each side; the output has shape
/// `(N, OC, (H + 2ph - KH) / sh + 1, (W + 2pw - KW) / sw + 1)`.
pub fn conv2d_op(
    input: &Tensor,
    weight: &Tensor,
    stride: (usize, usize),
    padding: (usize, usize),
) -> Result<Tensor, TensorGradError> {
    let [n, c, h, w] = check_image(input, "conv2d")?;
    let [oc, wc, kh, kw] = check_filter(weight, "conv2d")?;
    if wc != c {
        return Err(TensorGradError::ShapeMismatch {
            expected: vec![oc, c, kh, kw],
            actual: weight.shape(),
            operation: "conv2d (input channels)".to_string(),
        });
    }
    let oh = window_count(h + 2 * padding.0, kh, stride.0, "conv2d")?;
    let ow = window_count(w + 2 * padding.1, kw, stride.1, "conv2d")?;

    let padded = if padding == (0, 0) {
        input.clone()
    } else {
        pad_spatial_op(input, padding, 0.0)?
    };
    let patches = unfold_op(&padded, (kh, kw), stride)?;
    let columns = reshape_op(&patches, vec![n * oh * ow, c * kh * kw])?;
    let filters = transpose_op(&reshape_op(weight, vec![oc, c * kh * kw])?, 0, 1)?;
    let out = matmul_op(&columns, &filters)?;
    permute_op(&reshape_op(&out, vec![n, oh, ow, oc])?, &[0, 3, 1, 2])
}

/// Transposed convolution of `input (N, C, H, W)` with `weight (C, OC, KH, KW)`.
///
/// Output extent is `(H - 1) * sh + KH - 2ph`. Computed as a stride-1
/// convolution of the dilated, padded input with the flipped filter, which
/// requires `padding <= kernel - 1`.
pub fn conv_transpose2d_op(
    input: &Tensor,
    weight: &Tensor,
    stride: (usize, usize),
    padding: (usize, usize),
) -> Result<Tensor, TensorGradError> {
    let [_, c, _, _] = check_image(input, "conv_transpose2d")?;
    let [wc, oc, kh, kw] = check_filter(weight, "conv_transpose2d")?;
    if wc != c {
        return Err(TensorGradError::ShapeMismatch {
            expected: vec![c, oc, kh, kw],
            actual: weight.shape(),
            operation: "conv_transpose2d (input channels)".to_string(),
        });
    }
    if kh == 0 || kw == 0 || padding.0 >= kh || padding.1 >= kw {
        return Err(TensorGradError::InvalidArgument(format!(
            "conv_transpose2d: padding {:?} must be smaller than kernel {:?}",
            padding,
            (kh, kw)
        )));
    }

    let dilated = dilate_spatial_op(input, stride)?;
    let rows: Vec<usize> = (0..kh).rev().collect();
    let cols: Vec<usize> = (0..kw).rev().collect();
    let flipped = index_select_op(&index_select_op(weight, 2, &rows)?, 3, &cols)?;
    let filters = permute_op(&flipped, &[1, 0, 2, 3])?;
    conv2d_op(&dilated, &filters, (1, 1), (kh - 1 - padding.0, kw - 1 - padding.1))
}

#[cfg(test)]
#[path = "conv_test.rs"]
mod tests;

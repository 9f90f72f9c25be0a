//! Sliding-window helpers over the two trailing (spatial) axes of `(N, C, H, W)`
//! tensors. They compose `concat` and `index_select`, so gradients come from
//! those records.

use crate::config::Config;
use crate::error::TensorGradError;
use crate::ops::view::{concat_op, index_select_op, reshape_op};
use crate::tensor::create::full_with_config;
use crate::tensor::Tensor;

pub(crate) fn check_image(input: &Tensor, operation: &str) -> Result<[usize; 4], TensorGradError> {
    let shape = input.shape();
    match *shape.as_slice() {
        [n, c, h, w] => Ok([n, c, h, w]),
        _ => Err(TensorGradError::UnsupportedOperation(format!(
            "{} expects a (N, C, H, W) tensor, got shape {:?}",
            operation, shape
        ))),
    }
}

/// Output extent of a window of `kernel` sliding by `stride` over `size`.
pub(crate) fn window_count(size: usize, kernel: usize, stride: usize, operation: &str) -> Result<usize, TensorGradError> {
    if stride == 0 || kernel == 0 || kernel > size {
        return Err(TensorGradError::InvalidArgument(format!(
            "{}: window {} with stride {} does not fit extent {}",
            operation, kernel, stride, size
        )));
    }
    Ok((size - kernel) / stride + 1)
}

/// Surrounds the spatial axes with `padding` rows and columns of `value`.
pub fn pad_spatial_op(input: &Tensor, padding: (usize, usize), value: f64) -> Result<Tensor, TensorGradError> {
    let [n, c, h, w] = check_image(input, "pad_spatial")?;
    let config = Config::new(input.dtype(), input.device());
    let (ph, pw) = padding;
    let mut out = input.clone();
    if ph > 0 {
        let band = full_with_config(&[n, c, ph, w], value, &config)?;
        out = concat_op(&[band.clone(), out, band], 2)?;
    }
    if pw > 0 {
        let band = full_with_config(&[n, c, h + 2 * ph, pw], value, &config)?;
        out = concat_op(&[band.clone(), out, band], 3)?;
    }
    Ok(out)
}

/// Inserts `stride - 1` zeros between neighbouring spatial elements, turning
/// `(H, W)` into `((H - 1) * sh + 1, (W - 1) * sw + 1)`.
pub fn dilate_spatial_op(input: &Tensor, stride: (usize, usize)) -> Result<Tensor, TensorGradError> {
    let [_, _, h, w] = check_image(input, "dilate_spatial")?;
    if stride.0 == 0 || stride.1 == 0 {
        return Err(TensorGradError::InvalidArgument("dilate_spatial: stride must be positive".to_string()));
    }
    let config = Config::new(input.dtype(), input.device());
    let mut out = input.clone();
    for (axis, size, step) in [(2, h, stride.0), (3, w, stride.1)] {
        if step == 1 || size == 1 {
            continue;
        }
        let mut zero_shape = out.shape();
        zero_shape[axis] = 1;
        let zero = full_with_config(&zero_shape, 0.0, &config)?;
        // Index `size` is the appended zero slice.
        let padded = concat_op(&[out, zero], axis)?;
        let indices: Vec<usize> = (0..size)
            .flat_map(|i| {
                let gap = if i + 1 < size { step - 1 } else { 0 };
                std::iter::once(i).chain(std::iter::repeat(size).take(gap))
            })
            .collect();
        out = index_select_op(&padded, axis, &indices)?;
    }
    Ok(out)
}

/// Extracts every `kernel` window, sliding by `stride`, into a tensor of shape
/// `(N, OH, OW, C, KH, KW)`. No padding is applied.
pub fn unfold_op(input: &Tensor, kernel: (usize, usize), stride: (usize, usize)) -> Result<Tensor, TensorGradError> {
    let [n, c, h, w] = check_image(input, "unfold")?;
    let (kh, kw) = kernel;
    let oh = window_count(h, kh, stride.0, "unfold")?;
    let ow = window_count(w, kw, stride.1, "unfold")?;

    let mut indices = Vec::with_capacity(oh * ow * c * kh * kw);
    for y in 0..oh {
        for x in 0..ow {
            for ch in 0..c {
                for dy in 0..kh {
                    let row = y * stride.0 + dy;
                    for dx in 0..kw {
                        indices.push((ch * h + row) * w + x * stride.1 + dx);
                    }
                }
            }
        }
    }
    let flat = reshape_op(input, vec![n, c * h * w])?;
    let patches = index_select_op(&flat, 1, &indices)?;
    reshape_op(&patches, vec![n, oh, ow, c, kh, kw])
}

#[cfg(test)]
#[path = "window_test.rs"]
mod tests;

use rand::Rng;

use crate::buffer::Buffer;
use crate::error::TensorGradError;
use crate::ops::arithmetic::mul_op;
use crate::tensor::Tensor;

pub(crate) fn check_probability(p: f64) -> Result<f64, TensorGradError> {
    if !(0.0..1.0).contains(&p) {
        return Err(TensorGradError::InvalidArgument(format!(
            "dropout probability must lie in [0, 1), got {}",
            p
        )));
    }
    Ok(1.0 / (1.0 - p))
}

/// Constant mask of `shape` holding `0` with probability `p`, `1 / (1 - p)` otherwise.
fn draw_mask<R: Rng + ?Sized>(input: &Tensor, shape: Vec<usize>, p: f64, rng: &mut R) -> Result<Tensor, TensorGradError> {
    let scale = check_probability(p)?;
    let numel = shape.iter().product();
    let values: Vec<f64> = (0..numel)
        .map(|_| if rng.gen::<f64>() < p { 0.0 } else { scale })
        .collect();
    Tensor::from_buffer(Buffer::from_f64_vec(values, input.dtype()), shape, input.device())
}

/// Zeroes each element with probability `p` and scales the survivors by `1 / (1 - p)`.
///
/// The mask is drawn from `rng`, so the same seed reproduces the same mask. The
/// mask enters the graph as a constant: the gradient is `grad * mask`.
pub fn dropout_op<R: Rng + ?Sized>(input: &Tensor, p: f64, rng: &mut R) -> Result<Tensor, TensorGradError> {
    let mask = draw_mask(input, input.shape(), p, rng)?;
    mul_op(input, &mask)
}

/// Drops whole feature maps: one draw per `(sample, channel)` pair, broadcast over
/// every remaining axis of a `(N, C, ...)` input.
pub fn spatial_dropout_op<R: Rng + ?Sized>(input: &Tensor, p: f64, rng: &mut R) -> Result<Tensor, TensorGradError> {
    let shape = input.shape();
    if shape.len() < 2 {
        return Err(TensorGradError::InvalidArgument(format!(
            "spatial dropout needs a (N, C, ...) input, got shape {:?}",
            shape
        )));
    }
    let mut mask_shape = vec![1; shape.len()];
    mask_shape[0] = shape[0];
    mask_shape[1] = shape[1];
    let mask = draw_mask(input, mask_shape, p, rng)?;
    mul_op(input, &mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::reduction::sum_op;
    use crate::tensor::create::seeded_rng;
    use crate::utils::testing::leaf_f64;

    #[test]
    fn test_dropout_same_seed_same_mask() {
        let x = leaf_f64(vec![1.0; 64], vec![8, 8]);
        let a = dropout_op(&x, 0.5, &mut seeded_rng(Some(7))).unwrap();
        let b = dropout_op(&x, 0.5, &mut seeded_rng(Some(7))).unwrap();
        assert_eq!(a.to_f64_vec(), b.to_f64_vec());
        assert!(a.to_f64_vec().iter().all(|&v| v == 0.0 || v == 2.0));
    }

    #[test]
    fn test_dropout_zero_probability_is_identity() {
        let x = leaf_f64(vec![1.0, -2.0, 3.0], vec![3]);
        let y = dropout_op(&x, 0.0, &mut seeded_rng(Some(1))).unwrap();
        assert_eq!(y.to_f64_vec(), vec![1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_dropout_invalid_probability() {
        let x = leaf_f64(vec![1.0], vec![1]);
        for p in [1.0, -0.1, f64::NAN] {
            assert!(matches!(
                dropout_op(&x, p, &mut seeded_rng(Some(1))),
                Err(TensorGradError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_dropout_gradient_is_mask() -> Result<(), TensorGradError> {
        let x = leaf_f64(vec![1.0; 16], vec![16]);
        let y = dropout_op(&x, 0.25, &mut seeded_rng(Some(3)))?;
        sum_op(&y, None, false)?.backward()?;
        assert_eq!(x.grad().unwrap().to_f64_vec(), y.to_f64_vec());
        Ok(())
    }

    #[test]
    fn test_spatial_dropout_drops_whole_channels() {
        let x = leaf_f64(vec![1.0; 2 * 6 * 3 * 3], vec![2, 6, 3, 3]);
        let y = spatial_dropout_op(&x, 0.5, &mut seeded_rng(Some(11))).unwrap();
        let values = y.to_f64_vec();
        for map in values.chunks(9) {
            assert!(map.iter().all(|&v| v == map[0]));
            assert!(map[0] == 0.0 || map[0] == 2.0);
        }
        let again = spatial_dropout_op(&x, 0.5, &mut seeded_rng(Some(11))).unwrap();
        assert_eq!(values, again.to_f64_vec());
    }

    #[test]
    fn test_spatial_dropout_needs_channels() {
        let x = leaf_f64(vec![1.0, 2.0], vec![2]);
        assert!(matches!(
            spatial_dropout_op(&x, 0.5, &mut seeded_rng(Some(1))),
            Err(TensorGradError::InvalidArgument(_))
        ));
    }
}

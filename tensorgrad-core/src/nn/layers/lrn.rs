use crate::config::Config;
use crate::error::TensorGradError;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::ops::view::window::check_image;
use crate::tensor::{zeros_with_config, Tensor};

/// Local response normalisation across channels:
/// `y = x / (k + alpha * s) ^ beta`, where `s` sums `x²` over the `size`
/// channels centred on each position (missing neighbours count as zero).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lrn {
    size: usize,
    k: f64,
    alpha: f64,
    beta: f64,
}

impl Default for Lrn {
    fn default() -> Self {
        Lrn {
            size: 5,
            k: 2.0,
            alpha: 1e-4,
            beta: 0.75,
        }
    }
}

impl Lrn {
    pub fn new(size: usize, k: f64, alpha: f64, beta: f64) -> Result<Self, TensorGradError> {
        if size == 0 {
            return Err(TensorGradError::InvalidArgument(
                "lrn: neighbourhood size must be positive".to_string(),
            ));
        }
        Ok(Lrn { size, k, alpha, beta })
    }
}

impl Module for Lrn {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        let [n, c, h, w] = check_image(input, "lrn")?;
        let squared = input.mul(input)?;
        let half = self.size / 2;
        let padded = if half > 0 {
            let band = zeros_with_config(&[n, half, h, w], &Config::new(input.dtype(), input.device()))?;
            Tensor::concat(&[band.clone(), squared, band], 1)?
        } else {
            squared
        };
        let mut window_sum = padded.narrow(1, 0, c)?;
        for offset in 1..self.size {
            window_sum = window_sum.add(&padded.narrow(1, offset, c)?)?;
        }
        let denominator = window_sum.mul_scalar(self.alpha)?.add_scalar(self.k)?.pow_scalar(self.beta)?;
        input.div(&denominator)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad_check::{check_grad, DEFAULT_ATOL, DEFAULT_EPSILON, DEFAULT_RTOL};
    use crate::tensor::from_vec_f64;
    use crate::utils::testing::{check_tensor_near, leaf_f64};

    #[test]
    fn test_lrn_sums_neighbouring_channels() {
        let mut lrn = Lrn::new(3, 1.0, 1.0, 1.0).unwrap();
        let x = from_vec_f64(vec![1.0, 2.0, 3.0], vec![1, 3, 1, 1]).unwrap();
        let y = lrn.forward(&x).unwrap();
        // Window sums of squares: 1+4, 1+4+9, 4+9
        check_tensor_near(&y, &[1, 3, 1, 1], &[1.0 / 6.0, 2.0 / 15.0, 3.0 / 14.0], 1e-12);
    }

    #[test]
    fn test_lrn_rejects_flat_input() {
        let x = from_vec_f64(vec![1.0, 2.0], vec![1, 2]).unwrap();
        assert!(matches!(
            Lrn::default().forward(&x),
            Err(TensorGradError::UnsupportedOperation(_))
        ));
        assert!(Lrn::new(0, 2.0, 1e-4, 0.75).is_err());
    }

    #[test]
    fn test_lrn_grad_check() {
        let data: Vec<f64> = (0..2 * 6 * 2 * 2).map(|i| ((i as f64) * 0.9).cos() * 3.0).collect();
        let x = leaf_f64(data, vec![2, 6, 2, 2]);
        let func = |inputs: &[Tensor]| Lrn::new(5, 1.0, 0.1, 0.75)?.forward(&inputs[0])?.sum();
        check_grad(func, &[x], DEFAULT_EPSILON, DEFAULT_ATOL, DEFAULT_RTOL).unwrap();
    }
}

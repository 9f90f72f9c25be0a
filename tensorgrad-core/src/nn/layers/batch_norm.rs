use crate::autograd::no_grad;
use crate::config::Config;
use crate::error::TensorGradError;
use crate::nn::init::{Constant, Initializer};
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;

/// Which axes [`BatchNormalize`] treats as the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchNormMode {
    /// `(N, F)` inputs, statistics per feature over the batch axis.
    #[default]
    Activation,
    /// `(N, C, H, W)` inputs, statistics per channel over batch and space.
    FeatureMap,
}

impl BatchNormMode {
    fn axes(self) -> &'static [usize] {
        match self {
            BatchNormMode::Activation => &[0],
            BatchNormMode::FeatureMap => &[0, 2, 3],
        }
    }

    fn parameter_shape(self, features: usize) -> Vec<usize> {
        match self {
            BatchNormMode::Activation => vec![1, features],
            BatchNormMode::FeatureMap => vec![1, features, 1, 1],
        }
    }
}

/// Batch normalisation: `y = (x - mean) / sqrt(var + epsilon) * weight + bias`.
///
/// In training the statistics come from the batch (biased variance) and are
/// folded into running estimates with
/// `running = momentum * running + (1 - momentum) * batch`. In inference the
/// running estimates are used instead and nothing is updated.
#[derive(Debug)]
pub struct BatchNormalize {
    mode: BatchNormMode,
    num_features: usize,
    epsilon: f64,
    momentum: f64,
    weight: Parameter,
    bias: Parameter,
    running_mean: Tensor,
    running_var: Tensor,
    inference: bool,
}

impl BatchNormalize {
    pub const DEFAULT_EPSILON: f64 = 1e-5;
    pub const DEFAULT_MOMENTUM: f64 = 0.99;

    pub fn new(num_features: usize, mode: BatchNormMode, config: &Config) -> Result<Self, TensorGradError> {
        let shape = mode.parameter_shape(num_features);
        let (dtype, device) = (config.dtype, config.device);
        Ok(BatchNormalize {
            mode,
            num_features,
            epsilon: Self::DEFAULT_EPSILON,
            momentum: Self::DEFAULT_MOMENTUM,
            weight: Parameter::new_named(Constant(1.0).initialize(&shape, dtype, device)?, "weight")?,
            bias: Parameter::new_named(Constant(0.0).initialize(&shape, dtype, device)?, "bias")?,
            running_mean: Constant(0.0).initialize(&shape, dtype, device)?,
            running_var: Constant(1.0).initialize(&shape, dtype, device)?,
            inference: false,
        })
    }

    pub fn with_momentum(mut self, momentum: f64) -> Result<Self, TensorGradError> {
        if !(0.0..=1.0).contains(&momentum) {
            return Err(TensorGradError::InvalidArgument(format!(
                "batch_normalize: momentum must lie in [0, 1], got {}",
                momentum
            )));
        }
        self.momentum = momentum;
        Ok(self)
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Result<Self, TensorGradError> {
        if epsilon.is_nan() || epsilon <= 0.0 {
            return Err(TensorGradError::InvalidArgument(format!(
                "batch_normalize: epsilon must be positive, got {}",
                epsilon
            )));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    pub fn mode(&self) -> BatchNormMode {
        self.mode
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> &Parameter {
        &self.bias
    }

    pub fn running_mean(&self) -> &Tensor {
        &self.running_mean
    }

    pub fn running_var(&self) -> &Tensor {
        &self.running_var
    }

    fn check_input(&self, input: &Tensor) -> Result<(), TensorGradError> {
        let shape = input.shape();
        let rank = self.mode.parameter_shape(self.num_features).len();
        if shape.len() != rank || shape[1] != self.num_features {
            let mut expected = self.mode.parameter_shape(self.num_features);
            if let Some(batch) = shape.first() {
                expected[0] = *batch;
            }
            return Err(TensorGradError::ShapeMismatch {
                expected,
                actual: shape,
                operation: "batch_normalize".to_string(),
            });
        }
        Ok(())
    }

    fn blend(&self, running: &Tensor, batch: &Tensor) -> Result<Tensor, TensorGradError> {
        running
            .mul_scalar(self.momentum)?
            .add(&batch.detach().mul_scalar(1.0 - self.momentum)?)
    }
}

impl Module for BatchNormalize {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        self.check_input(input)?;
        let normalized = if self.inference {
            let scale = self.running_var.add_scalar(self.epsilon)?.sqrt()?;
            input.sub(&self.running_mean)?.div(&scale)?
        } else {
            let axes = self.mode.axes();
            let mean = input.mean(Some(axes), true)?;
            let centered = input.sub(&mean)?;
            let var = centered.mul(&centered)?.mean(Some(axes), true)?;
            let normalized = centered.div(&var.add_scalar(self.epsilon)?.sqrt()?)?;

            let _guard = no_grad();
            self.running_mean = self.blend(&self.running_mean, &mean)?;
            self.running_var = self.blend(&self.running_var, &var)?;
            normalized
        };
        normalized.mul(&self.weight)?.add(&self.bias)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.weight, &self.bias]
    }

    fn set_inference(&mut self, inference: bool) {
        self.inference = inference;
    }
}

#[cfg(test)]
#[path = "batch_norm_test.rs"]
mod tests;

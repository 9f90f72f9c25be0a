use crate::config::Config;
use crate::error::TensorGradError;
use crate::nn::init::{Constant, Initializer};
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;

/// Applies a linear transformation to the incoming data: `y = x · W + b`.
///
/// `W` has shape `(in_features, out_features)` so a batch `(N, in_features)`
/// multiplies without a transpose. The bias has shape `(1, out_features)` and
/// broadcasts over the batch.
#[derive(Debug)]
pub struct Linear {
    weight: Parameter,
    bias: Option<Parameter>,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Builds the layer with `init` for the weight and a zero bias (when `bias` is set).
    pub fn new(
        in_features: usize,
        out_features: usize,
        bias: bool,
        init: &dyn Initializer,
        config: &Config,
    ) -> Result<Self, TensorGradError> {
        let weight = Parameter::new_named(
            init.initialize(&[in_features, out_features], config.dtype, config.device)?,
            "weight",
        )?;
        let bias = if bias {
            Some(Parameter::new_named(
                Constant(0.0).initialize(&[1, out_features], config.dtype, config.device)?,
                "bias",
            )?)
        } else {
            None
        };
        log::debug!("Created Linear({} -> {})", in_features, out_features);
        Ok(Linear {
            weight,
            bias,
            in_features,
            out_features,
        })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> Option<&Parameter> {
        self.bias.as_ref()
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        let output = input.matmul(&self.weight)?;
        match &self.bias {
            Some(bias) => output.add(bias),
            None => Ok(output),
        }
    }

    fn parameters(&self) -> Vec<&Parameter> {
        let mut params = vec![&self.weight];
        if let Some(bias) = &self.bias {
            params.push(bias);
        }
        params
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;

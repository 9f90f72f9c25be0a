use rand::rngs::StdRng;

use crate::error::TensorGradError;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::ops::activation::dropout::check_probability;
use crate::ops::activation::{dropout_op, spatial_dropout_op};
use crate::tensor::create::seeded_rng;
use crate::tensor::Tensor;

/// Element-wise dropout with its own seeded generator. Identity in inference.
#[derive(Debug)]
pub struct Dropout {
    p: f64,
    rng: StdRng,
    inference: bool,
}

impl Dropout {
    pub fn new(p: f64, seed: Option<u64>) -> Result<Self, TensorGradError> {
        check_probability(p)?;
        Ok(Dropout {
            p,
            rng: seeded_rng(seed),
            inference: false,
        })
    }
}

impl Module for Dropout {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        if self.inference {
            return Ok(input.clone());
        }
        dropout_op(input, self.p, &mut self.rng)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }

    fn set_inference(&mut self, inference: bool) {
        self.inference = inference;
    }
}

/// Drops whole channels of `(N, C, ...)` inputs. Identity in inference.
#[derive(Debug)]
pub struct SpatialDropout {
    p: f64,
    rng: StdRng,
    inference: bool,
}

impl SpatialDropout {
    pub fn new(p: f64, seed: Option<u64>) -> Result<Self, TensorGradError> {
        check_probability(p)?;
        Ok(SpatialDropout {
            p,
            rng: seeded_rng(seed),
            inference: false,
        })
    }
}

impl Module for SpatialDropout {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        if self.inference {
            return Ok(input.clone());
        }
        spatial_dropout_op(input, self.p, &mut self.rng)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }

    fn set_inference(&mut self, inference: bool) {
        self.inference = inference;
    }
}

use crate::config::Config;
use crate::error::TensorGradError;
use crate::nn::init::Initializer;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;

/// A lookup table mapping integer ids to dense rows of `weight`.
///
/// `forward` takes a tensor of ids (stored as floats) of any shape and returns a
/// tensor of shape `ids.shape ++ [embedding_dim]`. Only the selected rows receive
/// gradient.
#[derive(Debug)]
pub struct Embedding {
    weight: Parameter,
    num_embeddings: usize,
    embedding_dim: usize,
}

impl Embedding {
    pub fn new(
        num_embeddings: usize,
        embedding_dim: usize,
        init: &dyn Initializer,
        config: &Config,
    ) -> Result<Self, TensorGradError> {
        let weight = Parameter::new_named(
            init.initialize(&[num_embeddings, embedding_dim], config.dtype, config.device)?,
            "weight",
        )?;
        Ok(Embedding {
            weight,
            num_embeddings,
            embedding_dim,
        })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn num_embeddings(&self) -> usize {
        self.num_embeddings
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Rows for `ids`, shape `(ids.len(), embedding_dim)`.
    pub fn lookup(&self, ids: &[usize]) -> Result<Tensor, TensorGradError> {
        self.weight.index_select(0, ids)
    }
}

fn to_ids(input: &Tensor) -> Result<Vec<usize>, TensorGradError> {
    input
        .to_f64_vec()
        .into_iter()
        .map(|v| {
            if v >= 0.0 && v.fract() == 0.0 {
                Ok(v as usize)
            } else {
                Err(TensorGradError::InvalidArgument(format!(
                    "embedding ids must be non-negative integers, got {}",
                    v
                )))
            }
        })
        .collect()
}

impl Module for Embedding {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        let ids = to_ids(input)?;
        let mut out_shape = input.shape();
        out_shape.push(self.embedding_dim);
        self.lookup(&ids)?.reshape(out_shape)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.weight]
    }
}

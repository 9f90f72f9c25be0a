use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Uniform};

use crate::buffer::Buffer;
use crate::config::{default_config, Config};
use crate::error::TensorGradError;
use crate::tensor::Tensor;

/// Creates a tensor filled with `value`, allocated per `config`.
pub fn full_with_config(shape: &[usize], value: f64, config: &Config) -> Result<Tensor, TensorGradError> {
    let numel = shape.iter().product();
    Tensor::from_buffer(
        Buffer::full(config.dtype, numel, value),
        shape.to_vec(),
        config.device,
    )
}

pub fn zeros_with_config(shape: &[usize], config: &Config) -> Result<Tensor, TensorGradError> {
    full_with_config(shape, 0.0, config)
}

/// Creates a tensor filled with `value` using the process-wide default precision and device.
pub fn full(shape: &[usize], value: f64) -> Result<Tensor, TensorGradError> {
    full_with_config(shape, value, &default_config())
}

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, TensorGradError> {
    full(shape, 0.0)
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Result<Tensor, TensorGradError> {
    full(shape, 1.0)
}

/// Creates a 0-dimensional tensor holding `value`.
pub fn scalar(value: f64) -> Result<Tensor, TensorGradError> {
    full(&[], value)
}

/// Creates a tensor from `f64` values, converted to the precision in `config`.
pub fn from_vec_with_config(
    data_vec: Vec<f64>,
    shape: Vec<usize>,
    config: &Config,
) -> Result<Tensor, TensorGradError> {
    Tensor::from_buffer(Buffer::from_f64_vec(data_vec, config.dtype), shape, config.device)
}

/// Creates a tensor from `f64` values using the default precision and device.
pub fn from_vec(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Tensor, TensorGradError> {
    from_vec_with_config(data_vec, shape, &default_config())
}

/// Creates a new F32 Tensor from a Vec<f32> and shape.
pub fn from_vec_f32(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Tensor, TensorGradError> {
    Tensor::new(data_vec, shape)
}

/// Creates a new F64 Tensor from a Vec<f64> and shape.
pub fn from_vec_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Tensor, TensorGradError> {
    Tensor::new_f64(data_vec, shape)
}

/// Creates a tensor filled with `value`, with the shape, precision and device of `tensor`.
pub fn full_like(tensor: &Tensor, value: f64) -> Result<Tensor, TensorGradError> {
    let (shape, dtype, device) = {
        let guard = tensor.read_data();
        (guard.shape.clone(), guard.dtype, guard.device)
    };
    full_with_config(&shape, value, &Config::new(dtype, device))
}

pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, TensorGradError> {
    full_like(tensor, 0.0)
}

pub fn ones_like(tensor: &Tensor) -> Result<Tensor, TensorGradError> {
    full_like(tensor, 1.0)
}

/// Random generator seeded with `seed`, or from OS entropy when `None`.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Samples every element uniformly from `[low, high)`.
pub fn rand_uniform_with_config<R: Rng + ?Sized>(
    shape: &[usize],
    low: f64,
    high: f64,
    rng: &mut R,
    config: &Config,
) -> Result<Tensor, TensorGradError> {
    if !(low < high) {
        return Err(TensorGradError::InvalidArgument(format!(
            "uniform range [{}, {}) is empty",
            low, high
        )));
    }
    let numel: usize = shape.iter().product();
    let dist = Uniform::new(low, high);
    let data: Vec<f64> = (0..numel).map(|_| dist.sample(rng)).collect();
    from_vec_with_config(data, shape.to_vec(), config)
}

/// Samples every element from a normal distribution.
pub fn randn_with_config<R: Rng + ?Sized>(
    shape: &[usize],
    mean: f64,
    std: f64,
    rng: &mut R,
    config: &Config,
) -> Result<Tensor, TensorGradError> {
    if !(std >= 0.0) {
        return Err(TensorGradError::InvalidArgument(format!(
            "normal distribution needs a non-negative std, got {}",
            std
        )));
    }
    let dist = Normal::new(mean, std).map_err(|e| {
        TensorGradError::InvalidArgument(format!("normal distribution (std {}): {}", std, e))
    })?;
    let numel: usize = shape.iter().product();
    let data: Vec<f64> = (0..numel).map(|_| dist.sample(rng)).collect();
    from_vec_with_config(data, shape.to_vec(), config)
}

/// Uniform random tensor using the default configuration. A fixed `seed` makes it reproducible.
pub fn rand_uniform(shape: &[usize], low: f64, high: f64, seed: Option<u64>) -> Result<Tensor, TensorGradError> {
    rand_uniform_with_config(shape, low, high, &mut seeded_rng(seed), &default_config())
}

/// Normal random tensor using the default configuration. A fixed `seed` makes it reproducible.
pub fn randn(shape: &[usize], mean: f64, std: f64, seed: Option<u64>) -> Result<Tensor, TensorGradError> {
    randn_with_config(shape, mean, std, &mut seeded_rng(seed), &default_config())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;

//! Parameter initialisation.
//!
//! Random initialisers own a seeded generator, so two initialisers built with the
//! same seed produce the same sequence of tensors.

use std::fmt::Debug;
use std::sync::Mutex;

use rand::rngs::StdRng;

use crate::config::Config;
use crate::device::StorageDevice;
use crate::error::TensorGradError;
use crate::tensor::create::{full_with_config, rand_uniform_with_config, randn_with_config, seeded_rng};
use crate::tensor::Tensor;
use crate::types::DType;

/// Produces the initial value of a parameter.
pub trait Initializer: Debug + Send + Sync {
    fn initialize(&self, shape: &[usize], dtype: DType, device: StorageDevice) -> Result<Tensor, TensorGradError>;
}

/// Every element set to `value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl Initializer for Constant {
    fn initialize(&self, shape: &[usize], dtype: DType, device: StorageDevice) -> Result<Tensor, TensorGradError> {
        full_with_config(shape, self.0, &Config::new(dtype, device))
    }
}

fn lock_rng(rng: &Mutex<StdRng>) -> Result<std::sync::MutexGuard<'_, StdRng>, TensorGradError> {
    rng.lock()
        .map_err(|_| TensorGradError::InternalError("initializer generator poisoned".to_string()))
}

/// Samples uniformly from `[low, high)`.
#[derive(Debug)]
pub struct Uniform {
    low: f64,
    high: f64,
    rng: Mutex<StdRng>,
}

impl Uniform {
    pub fn new(low: f64, high: f64, seed: Option<u64>) -> Self {
        Uniform {
            low,
            high,
            rng: Mutex::new(seeded_rng(seed)),
        }
    }

    /// `U(-1/sqrt(fan_in), 1/sqrt(fan_in))`, the usual range for dense layers.
    pub fn scaled(fan_in: usize, seed: Option<u64>) -> Self {
        let bound = 1.0 / (fan_in.max(1) as f64).sqrt();
        Uniform::new(-bound, bound, seed)
    }
}

impl Initializer for Uniform {
    fn initialize(&self, shape: &[usize], dtype: DType, device: StorageDevice) -> Result<Tensor, TensorGradError> {
        let mut rng = lock_rng(&self.rng)?;
        rand_uniform_with_config(shape, self.low, self.high, &mut *rng, &Config::new(dtype, device))
    }
}

/// Samples from `N(mean, std²)`.
#[derive(Debug)]
pub struct Normal {
    mean: f64,
    std: f64,
    rng: Mutex<StdRng>,
}

impl Normal {
    pub fn new(mean: f64, std: f64, seed: Option<u64>) -> Self {
        Normal {
            mean,
            std,
            rng: Mutex::new(seeded_rng(seed)),
        }
    }
}

impl Initializer for Normal {
    fn initialize(&self, shape: &[usize], dtype: DType, device: StorageDevice) -> Result<Tensor, TensorGradError> {
        let mut rng = lock_rng(&self.rng)?;
        randn_with_config(shape, self.mean, self.std, &mut *rng, &Config::new(dtype, device))
    }
}

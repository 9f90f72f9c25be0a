//! Reverse-mode automatic differentiation over n-dimensional tensors.
//!
//! Operations on [`Tensor`]s record a backward node when any input requires grad;
//! [`Tensor::backward`] walks the recorded graph in reverse topological order and
//! accumulates gradients into every tracked tensor.

// Buffer macros are used by the backend kernels, so this must come first.
#[macro_use]
pub mod buffer;

pub mod autograd;
pub mod backend;
pub mod config;
pub mod device;
pub mod error;
pub mod nn;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod types;
pub mod utils;

pub use autograd::{is_grad_enabled, no_grad};
pub use config::{default_config, set_default_device, set_default_dtype, Config, ConfigGuard};
pub use device::StorageDevice;
pub use error::TensorGradError;
pub use tensor::Tensor;
pub use types::DType;

// Re-export traits required by public functions/structs
pub use num_traits;

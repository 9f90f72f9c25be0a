//! Process-wide allocation defaults.
//!
//! The default [`Config`] is read only when a leaf tensor is allocated without an
//! explicit configuration. Operation outputs always inherit the precision and device
//! of their inputs, so changing the defaults never affects a graph that is already
//! being built.

use crate::device::StorageDevice;
use crate::types::DType;
use once_cell::sync::Lazy;
use std::sync::RwLock;

/// Precision and execution backend used for new allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub dtype: DType,
    pub device: StorageDevice,
}

impl Config {
    pub fn new(dtype: DType, device: StorageDevice) -> Self {
        Config { dtype, device }
    }

    pub fn with_dtype(mut self, dtype: DType) -> Self {
        self.dtype = dtype;
        self
    }

    pub fn with_device(mut self, device: StorageDevice) -> Self {
        self.device = device;
        self
    }
}

static DEFAULT_CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

/// Returns a copy of the current process-wide default configuration.
pub fn default_config() -> Config {
    *DEFAULT_CONFIG.read().expect("RwLock poisoned")
}

/// Replaces the process-wide default configuration and returns the previous one.
pub fn set_default_config(config: Config) -> Config {
    let mut guard = DEFAULT_CONFIG.write().expect("RwLock poisoned");
    let previous = *guard;
    *guard = config;
    log::debug!("Default config changed from {:?} to {:?}", previous, config);
    previous
}

/// Sets the precision used by subsequent default allocations.
pub fn set_default_dtype(dtype: DType) -> Config {
    set_default_config(default_config().with_dtype(dtype))
}

/// Sets the execution backend used by subsequent default allocations.
pub fn set_default_device(device: StorageDevice) -> Config {
    set_default_config(default_config().with_device(device))
}

/// Scoped override of the default configuration.
///
/// The previous configuration is restored when the guard is dropped.
#[must_use = "the previous configuration is restored as soon as the guard is dropped"]
pub struct ConfigGuard {
    previous: Config,
}

impl ConfigGuard {
    pub fn new(config: Config) -> Self {
        ConfigGuard {
            previous: set_default_config(config),
        }
    }
}

impl Drop for ConfigGuard {
    fn drop(&mut self) {
        set_default_config(self.previous);
    }
}

use std::fmt::Debug;

/// Represents the execution backend a tensor's data is bound to.
///
/// Both devices keep their buffers in host memory; the device decides which
/// [`Backend`](crate::backend::Backend) runs the kernels for operations on the tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageDevice {
    /// Sequential host execution.
    /// This is the default device.
    #[default]
    CPU,
    /// Data-parallel execution. Produces results bitwise identical to `CPU`.
    Accelerated,
}

use crate::device::StorageDevice;
use crate::types::DType;
use thiserror::Error;

/// Custom error type for the tensorgrad engine.
///
/// Every fallible operation reports misuse synchronously through this enum. Nothing
/// is retried internally: when an error is returned, the tensors involved are left
/// exactly as they were before the call.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum TensorGradError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Cannot broadcast shapes: {shape1:?} and {shape2:?}")]
    BroadcastError {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("In-place operation '{operation}' rejected: {reason}")]
    InplaceModification { operation: String, reason: String },

    #[error("Backward called on non-scalar tensor of shape {shape:?} without explicit gradient.")]
    BackwardNonScalar { shape: Vec<usize> },

    #[error("Data type mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DataTypeMismatch {
        expected: DType,
        actual: DType,
        operation: String,
    },

    #[error("Device mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DeviceMismatch {
        expected: StorageDevice,
        actual: StorageDevice,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Invalid axis {axis} for tensor of rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Invalid permutation: dims {dims:?} are not a valid permutation for rank {rank}")]
    InvalidPermutation { dims: Vec<usize>, rank: usize },

    #[error("Cannot concatenate an empty list of tensors")]
    EmptyTensorList,

    #[error("Operation requires tensor to require grad, but it doesn't.")]
    RequiresGradNotMet,

    #[error("requires_grad can only be changed on leaf tensors")]
    RequiresGradOnNonLeaf,

    #[error("Computation graph is in state {state}, expected {expected}")]
    InvalidGraphState { state: String, expected: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

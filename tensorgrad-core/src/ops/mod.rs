//! # Tensor Operations Module (`ops`)
//!
//! Every differentiable operation is a `xxx_op` function that validates its operands,
//! computes the result through the [`Backend`](crate::backend::Backend) of the
//! operands' device and, when the result must be tracked, attaches a `XxxBackward`
//! record implementing [`BackwardOp`]. Records capture exactly what their local
//! derivative needs and return gradients in the inputs' original shapes.
//!
//! ## Submodules
//!
//! - [`arithmetic`]: add, sub, mul, div, neg, pow and scalar forms.
//! - [`math_elem`]: exp, ln, sqrt, abs, tanh, sigmoid (shared unary record).
//! - [`activation`]: relu family, softmax, dropout.
//! - [`linalg`]: matmul, transpose, permute.
//! - [`reduction`]: sum, mean, max, min.
//! - [`view`]: reshape, broadcast_to, concat, index_select, narrow.
//! - [`comparison`]: masks and `where_op`.
//! - [`device`]: moving tensors between backends.

use std::sync::Arc;

use crate::autograd::{is_grad_enabled, BackwardOp};
use crate::backend::{backend_for, Backend, BinaryOp};
use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::TensorGradError;
use crate::tensor::broadcast_utils::broadcast_shapes;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;

pub mod activation;
pub mod arithmetic;
pub mod comparison;
pub mod device;
pub mod linalg;
pub mod math_elem;
pub mod reduction;
pub mod view;

/// What a forward kernel reads from one operand, captured under a single short lock.
#[derive(Debug, Clone)]
pub(crate) struct Operand {
    pub buffer: Arc<Buffer>,
    pub shape: Vec<usize>,
    pub dtype: DType,
    pub device: StorageDevice,
}

impl Operand {
    pub(crate) fn of(tensor: &Tensor) -> Self {
        let guard = tensor.read_data();
        Operand {
            buffer: Arc::clone(&guard.buffer),
            shape: guard.shape.clone(),
            dtype: guard.dtype,
            device: guard.device,
        }
    }

    pub(crate) fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    pub(crate) fn backend(&self) -> &'static dyn Backend {
        backend_for(self.device)
    }
}

/// True when grad mode is on and at least one input requires grad.
pub(crate) fn should_track(inputs: &[&Tensor]) -> bool {
    is_grad_enabled() && inputs.iter().any(|t| t.requires_grad())
}

/// Both operands must share precision and device; nothing is converted implicitly.
pub(crate) fn check_compatible(a: &Operand, b: &Operand, operation: &str) -> Result<(), TensorGradError> {
    if a.dtype != b.dtype {
        return Err(TensorGradError::DataTypeMismatch {
            expected: a.dtype,
            actual: b.dtype,
            operation: operation.to_string(),
        });
    }
    if a.device != b.device {
        return Err(TensorGradError::DeviceMismatch {
            expected: a.device,
            actual: b.device,
            operation: operation.to_string(),
        });
    }
    Ok(())
}

/// Builds an operation output. It requires grad exactly when a record is attached.
pub(crate) fn make_output(
    buffer: Buffer,
    shape: Vec<usize>,
    device: StorageDevice,
    grad_fn: Option<Arc<dyn BackwardOp>>,
) -> Result<Tensor, TensorGradError> {
    let mut data = TensorData::new(buffer, shape, device)?;
    data.requires_grad = grad_fn.is_some();
    data.grad_fn = grad_fn;
    Ok(Tensor::from_data(data))
}

/// Output of an operation that reuses the input buffer unchanged (reshape, device moves).
pub(crate) fn make_shared_output(
    buffer: Arc<Buffer>,
    shape: Vec<usize>,
    device: StorageDevice,
    grad_fn: Option<Arc<dyn BackwardOp>>,
) -> Tensor {
    let mut data = TensorData::sharing(buffer, shape, device);
    data.requires_grad = grad_fn.is_some();
    data.grad_fn = grad_fn;
    Tensor::from_data(data)
}

/// Broadcasting element-wise forward shared by arithmetic and comparison ops.
pub(crate) fn binary_forward(
    op: BinaryOp,
    a: &Tensor,
    b: &Tensor,
    operation: &str,
) -> Result<(Buffer, Vec<usize>, StorageDevice), TensorGradError> {
    let lhs = Operand::of(a);
    let rhs = Operand::of(b);
    check_compatible(&lhs, &rhs, operation)?;
    let out_shape = broadcast_shapes(&lhs.shape, &rhs.shape)?;
    let buffer = lhs.backend().binary(
        op,
        &lhs.buffer,
        &lhs.shape,
        &rhs.buffer,
        &rhs.shape,
        &out_shape,
    )?;
    Ok((buffer, out_shape, lhs.device))
}

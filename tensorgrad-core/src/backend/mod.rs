//! # Execution backends
//!
//! Operations never touch element data directly for arithmetic: they hand buffers and
//! shapes to a [`Backend`], resolved from the device the inputs live on. Two
//! implementations exist:
//!
//! - [`CpuBackend`]: sequential host loops.
//! - [`AcceleratedBackend`]: the same kernels, data-parallel over output elements
//!   (rayon). Each output element is computed by exactly the same sequence of
//!   floating-point operations as on the host, so both backends produce bitwise
//!   identical buffers and therefore identical graphs and gradients.

use std::fmt::Debug;

use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::TensorGradError;

pub mod accelerated;
pub mod cpu;
pub(crate) mod kernels;

pub use accelerated::AcceleratedBackend;
pub use cpu::CpuBackend;

/// Element-wise functions of one operand.
///
/// Scalar parameters are stored as `f64` and converted to the buffer precision by the kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Neg,
    Exp,
    Ln,
    Sqrt,
    Abs,
    Tanh,
    Sigmoid,
    Relu,
    LeakyRelu(f64),
    Elu(f64),
    Selu,
    AddScalar(f64),
    MulScalar(f64),
    PowScalar(f64),
}

/// Element-wise functions of two broadcast operands.
///
/// Comparison variants yield `1.0` where the predicate holds and `0.0` elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Sum,
    Max,
    Min,
}

/// Result of a reduction.
///
/// `buffer` is laid out in the keep-dims shape. For `Max`/`Min`, `arg_indices[o]` is the
/// flat input index that produced output element `o` (first occurrence on ties).
#[derive(Debug, Clone, PartialEq)]
pub struct Reduced {
    pub buffer: Buffer,
    pub arg_indices: Option<Vec<usize>>,
}

/// Uniform primitive contract every execution backend fulfils.
///
/// Buffers are contiguous and row-major; callers validate shapes beforehand, so
/// errors returned here only concern precision mismatches between operands.
pub trait Backend: Debug + Send + Sync {
    fn device(&self) -> StorageDevice;

    fn unary(&self, op: UnaryOp, input: &Buffer) -> Buffer;

    /// `grad * op'(input)`, where `output` is the forward result `op(input)`.
    fn unary_backward(
        &self,
        op: UnaryOp,
        input: &Buffer,
        output: &Buffer,
        grad: &Buffer,
    ) -> Result<Buffer, TensorGradError>;

    fn binary(
        &self,
        op: BinaryOp,
        lhs: &Buffer,
        lhs_shape: &[usize],
        rhs: &Buffer,
        rhs_shape: &[usize],
        out_shape: &[usize],
    ) -> Result<Buffer, TensorGradError>;

    /// `(m, k) x (k, n)` matrix product.
    fn matmul(
        &self,
        lhs: &Buffer,
        rhs: &Buffer,
        m: usize,
        k: usize,
        n: usize,
    ) -> Result<Buffer, TensorGradError>;

    /// Reduces over `axes` (sorted, unique, non-empty input).
    fn reduce(&self, op: ReduceOp, input: &Buffer, shape: &[usize], axes: &[usize]) -> Reduced;

    fn permute(&self, input: &Buffer, shape: &[usize], axes: &[usize]) -> Buffer;

    /// Replicates `input` along broadcast dimensions to fill `target_shape`.
    fn expand(&self, input: &Buffer, shape: &[usize], target_shape: &[usize]) -> Buffer;
}

static CPU_BACKEND: CpuBackend = CpuBackend;
static ACCELERATED_BACKEND: AcceleratedBackend = AcceleratedBackend;

/// Resolves the backend executing kernels for tensors stored on `device`.
pub fn backend_for(device: StorageDevice) -> &'static dyn Backend {
    match device {
        StorageDevice::CPU => &CPU_BACKEND,
        StorageDevice::Accelerated => &ACCELERATED_BACKEND,
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use crate::backend::kernels::{self, Executor};
use crate::backend::{Backend, BinaryOp, ReduceOp, Reduced, UnaryOp};
use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::TensorGradError;

/// Evaluates kernels with plain sequential loops on the calling thread.
struct Sequential;

impl Executor for Sequential {
    fn tabulate<R, F>(len: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Send + Sync,
    {
        (0..len).map(f).collect()
    }
}

/// Host backend. Every tensor on [`StorageDevice::CPU`] runs its kernels here.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl Backend for CpuBackend {
    fn device(&self) -> StorageDevice {
        StorageDevice::CPU
    }

    fn unary(&self, op: UnaryOp, input: &Buffer) -> Buffer {
        kernels::unary::<Sequential>(op, input)
    }

    fn unary_backward(
        &self,
        op: UnaryOp,
        input: &Buffer,
        output: &Buffer,
        grad: &Buffer,
    ) -> Result<Buffer, TensorGradError> {
        kernels::unary_backward::<Sequential>(op, input, output, grad)
    }

    fn binary(
        &self,
        op: BinaryOp,
        lhs: &Buffer,
        lhs_shape: &[usize],
        rhs: &Buffer,
        rhs_shape: &[usize],
        out_shape: &[usize],
    ) -> Result<Buffer, TensorGradError> {
        kernels::binary::<Sequential>(op, lhs, lhs_shape, rhs, rhs_shape, out_shape)
    }

    fn matmul(
        &self,
        lhs: &Buffer,
        rhs: &Buffer,
        m: usize,
        k: usize,
        n: usize,
    ) -> Result<Buffer, TensorGradError> {
        kernels::matmul::<Sequential>(lhs, rhs, m, k, n)
    }

    fn reduce(&self, op: ReduceOp, input: &Buffer, shape: &[usize], axes: &[usize]) -> Reduced {
        kernels::reduce::<Sequential>(op, input, shape, axes)
    }

    fn permute(&self, input: &Buffer, shape: &[usize], axes: &[usize]) -> Buffer {
        kernels::permute::<Sequential>(input, shape, axes)
    }

    fn expand(&self, input: &Buffer, shape: &[usize], target_shape: &[usize]) -> Buffer {
        kernels::expand::<Sequential>(input, shape, target_shape)
    }
}

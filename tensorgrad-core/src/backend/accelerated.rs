use rayon::prelude::*;

use crate::backend::kernels::{self, Executor};
use crate::backend::{Backend, BinaryOp, ReduceOp, Reduced, UnaryOp};
use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::TensorGradError;

/// Spreads output elements over the rayon thread pool.
///
/// Each element is still produced by a single closure call, so the floating-point
/// evaluation order matches [`CpuBackend`](crate::backend::CpuBackend) exactly.
struct Parallel;

impl Executor for Parallel {
    fn tabulate<R, F>(len: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Send + Sync,
    {
        (0..len).into_par_iter().map(f).collect()
    }
}

/// Data-parallel backend for tensors on [`StorageDevice::Accelerated`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceleratedBackend;

impl Backend for AcceleratedBackend {
    fn device(&self) -> StorageDevice {
        StorageDevice::Accelerated
    }

    fn unary(&self, op: UnaryOp, input: &Buffer) -> Buffer {
        kernels::unary::<Parallel>(op, input)
    }

    fn unary_backward(
        &self,
        op: UnaryOp,
        input: &Buffer,
        output: &Buffer,
        grad: &Buffer,
    ) -> Result<Buffer, TensorGradError> {
        kernels::unary_backward::<Parallel>(op, input, output, grad)
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
        kernels::binary::<Parallel>(op, lhs, lhs_shape, rhs, rhs_shape, out_shape)
    }

    fn matmul(
        &self,
        lhs: &Buffer,
        rhs: &Buffer,
        m: usize,
        k: usize,
        n: usize,
    ) -> Result<Buffer, TensorGradError> {
        log::trace!("Accelerated matmul ({}, {}) x ({}, {})", m, k, k, n);
        kernels::matmul::<Parallel>(lhs, rhs, m, k, n)
    }

    fn reduce(&self, op: ReduceOp, input: &Buffer, shape: &[usize], axes: &[usize]) -> Reduced {
        kernels::reduce::<Parallel>(op, input, shape, axes)
    }

    fn permute(&self, input: &Buffer, shape: &[usize], axes: &[usize]) -> Buffer {
        kernels::permute::<Parallel>(input, shape, axes)
    }

    fn expand(&self, input: &Buffer, shape: &[usize], target_shape: &[usize]) -> Buffer {
        kernels::expand::<Parallel>(input, shape, target_shape)
    }
}

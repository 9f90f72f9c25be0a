// Kernels shared by every backend. A backend only decides how the per-element
// closures are scheduled (see `Executor`); the arithmetic itself lives here.

use crate::backend::{BinaryOp, ReduceOp, Reduced, UnaryOp};
use crate::buffer::{Buffer, Element};
use crate::error::TensorGradError;
use crate::tensor::utils::calculate_strides;

const SELU_ALPHA: f64 = 1.673_263_242_354_377_3;
const SELU_SCALE: f64 = 1.050_700_987_355_480_5;

/// Schedules the evaluation of `f(0..len)` and collects the results in index order.
pub(crate) trait Executor {
    fn tabulate<R, F>(len: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Send + Sync;
}

pub(crate) fn unary_value<T: Element>(op: UnaryOp, x: T) -> T {
    let zero = T::zero();
    let one = T::one();
    match op {
        UnaryOp::Neg => -x,
        UnaryOp::Exp => x.exp(),
        UnaryOp::Ln => x.ln(),
        UnaryOp::Sqrt => x.sqrt(),
        UnaryOp::Abs => x.abs(),
        UnaryOp::Tanh => x.tanh(),
        UnaryOp::Sigmoid => one / (one + (-x).exp()),
        UnaryOp::Relu => {
            if x > zero {
                x
            } else {
                zero
            }
        }
        UnaryOp::LeakyRelu(alpha) => {
            if x > zero {
                x
            } else {
                T::of(alpha) * x
            }
        }
        UnaryOp::Elu(alpha) => {
            if x > zero {
                x
            } else {
                T::of(alpha) * (x.exp() - one)
            }
        }
        UnaryOp::Selu => {
            let inner = if x > zero {
                x
            } else {
                T::of(SELU_ALPHA) * (x.exp() - one)
            };
            T::of(SELU_SCALE) * inner
        }
        UnaryOp::AddScalar(c) => x + T::of(c),
        UnaryOp::MulScalar(c) => x * T::of(c),
        UnaryOp::PowScalar(p) => x.powf(T::of(p)),
    }
}

/// Local derivative of `op` at `x`, given the forward value `y = op(x)`.
pub(crate) fn unary_derivative<T: Element>(op: UnaryOp, x: T, y: T) -> T {
    let zero = T::zero();
    let one = T::one();
    match op {
        UnaryOp::Neg => -one,
        UnaryOp::Exp => y,
        UnaryOp::Ln => one / x,
        UnaryOp::Sqrt => T::of(0.5) / y,
        UnaryOp::Abs => {
            if x > zero {
                one
            } else if x < zero {
                -one
            } else {
                zero
            }
        }
        UnaryOp::Tanh => one - y * y,
        UnaryOp::Sigmoid => y * (one - y),
        UnaryOp::Relu => {
            if x > zero {
                one
            } else {
                zero
            }
        }
        UnaryOp::LeakyRelu(alpha) => {
            if x > zero {
                one
            } else {
                T::of(alpha)
            }
        }
        UnaryOp::Elu(alpha) => {
            if x > zero {
                one
            } else {
                y + T::of(alpha)
            }
        }
        UnaryOp::Selu => {
            if x > zero {
                T::of(SELU_SCALE)
            } else {
                T::of(SELU_SCALE * SELU_ALPHA) * x.exp()
            }
        }
        UnaryOp::AddScalar(_) => one,
        UnaryOp::MulScalar(c) => T::of(c),
        UnaryOp::PowScalar(p) => T::of(p) * x.powf(T::of(p - 1.0)),
    }
}

pub(crate) fn binary_value<T: Element>(op: BinaryOp, a: T, b: T) -> T {
    let flag = |holds: bool| if holds { T::one() } else { T::zero() };
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Gt => flag(a > b),
        BinaryOp::Lt => flag(a < b),
        BinaryOp::Ge => flag(a >= b),
        BinaryOp::Le => flag(a <= b),
        BinaryOp::Eq => flag(a == b),
    }
}

/// Maps flat indices of a broadcast output back to flat indices of one operand.
///
/// Dimensions the operand lacks (leading) or holds with size 1 get stride 0.
#[derive(Debug, Clone)]
pub(crate) struct BroadcastIndexer {
    out_shape: Vec<usize>,
    src_strides: Vec<usize>,
}

impl BroadcastIndexer {
    pub(crate) fn new(src_shape: &[usize], out_shape: &[usize]) -> Self {
        let rank = out_shape.len();
        let offset = rank.saturating_sub(src_shape.len());
        let contiguous = calculate_strides(src_shape);
        let mut src_strides = vec![0; rank];
        for (i, &dim) in src_shape.iter().enumerate() {
            if dim != 1 && offset + i < rank {
                src_strides[offset + i] = contiguous[i];
            }
        }
        BroadcastIndexer {
            out_shape: out_shape.to_vec(),
            src_strides,
        }
    }

    pub(crate) fn source_index(&self, out_index: usize) -> usize {
        let mut remaining = out_index;
        let mut src = 0;
        for axis in (0..self.out_shape.len()).rev() {
            let dim = self.out_shape[axis];
            src += (remaining % dim) * self.src_strides[axis];
            remaining /= dim;
        }
        src
    }
}

/// Flat offsets of every combination of coordinates along `axes`, row-major.
fn enumerate_offsets(shape: &[usize], strides: &[usize], axes: &[usize]) -> Vec<usize> {
    let mut offsets = vec![0];
    for &axis in axes {
        let mut next = Vec::with_capacity(offsets.len() * shape[axis]);
        for &base in &offsets {
            for coord in 0..shape[axis] {
                next.push(base + coord * strides[axis]);
            }
        }
        offsets = next;
    }
    offsets
}

pub(crate) fn unary<X: Executor>(op: UnaryOp, input: &Buffer) -> Buffer {
    map_buffer!(input, data => X::tabulate(data.len(), |i| unary_value(op, data[i])))
}

pub(crate) fn unary_backward<X: Executor>(
    op: UnaryOp,
    input: &Buffer,
    output: &Buffer,
    grad: &Buffer,
) -> Result<Buffer, TensorGradError> {
    fn kernel<X: Executor, T: Element>(op: UnaryOp, x: &[T], y: &[T], g: &[T]) -> Vec<T> {
        X::tabulate(g.len(), |i| g[i] * unary_derivative(op, x[i], y[i]))
    }
    match (input, output, grad) {
        (Buffer::F32(x), Buffer::F32(y), Buffer::F32(g)) => Ok(Buffer::F32(kernel::<X, f32>(op, x, y, g))),
        (Buffer::F64(x), Buffer::F64(y), Buffer::F64(g)) => Ok(Buffer::F64(kernel::<X, f64>(op, x, y, g))),
        (x, _, g) => Err(TensorGradError::DataTypeMismatch {
            expected: x.dtype(),
            actual: g.dtype(),
            operation: format!("{:?} backward", op),
        }),
    }
}

pub(crate) fn binary<X: Executor>(
    op: BinaryOp,
    lhs: &Buffer,
    lhs_shape: &[usize],
    rhs: &Buffer,
    rhs_shape: &[usize],
    out_shape: &[usize],
) -> Result<Buffer, TensorGradError> {
    let numel: usize = out_shape.iter().product();
    let lhs_index = BroadcastIndexer::new(lhs_shape, out_shape);
    let rhs_index = BroadcastIndexer::new(rhs_shape, out_shape);
    zip_buffers!(lhs, rhs, format!("{:?}", op), (a, b) => X::tabulate(numel, |i| {
        binary_value(op, a[lhs_index.source_index(i)], b[rhs_index.source_index(i)])
    }))
}

pub(crate) fn matmul<X: Executor>(
    lhs: &Buffer,
    rhs: &Buffer,
    m: usize,
    k: usize,
    n: usize,
) -> Result<Buffer, TensorGradError> {
    fn kernel<X: Executor, T: Element>(a: &[T], b: &[T], m: usize, k: usize, n: usize) -> Vec<T> {
        X::tabulate(m * n, |index| {
            let (row, col) = (index / n, index % n);
            let mut acc = T::zero();
            for p in 0..k {
                acc = acc + a[row * k + p] * b[p * n + col];
            }
            acc
        })
    }
    zip_buffers!(lhs, rhs, "matmul", (a, b) => kernel::<X, _>(a.as_slice(), b.as_slice(), m, k, n))
}

pub(crate) fn reduce<X: Executor>(
    op: ReduceOp,
    input: &Buffer,
    shape: &[usize],
    axes: &[usize],
) -> Reduced {
    let strides = calculate_strides(shape);
    let kept: Vec<usize> = (0..shape.len()).filter(|axis| !axes.contains(axis)).collect();
    let bases = enumerate_offsets(shape, &strides, &kept);
    let offsets = enumerate_offsets(shape, &strides, axes);

    fn kernel<X: Executor, T: Element>(
        op: ReduceOp,
        data: &[T],
        bases: &[usize],
        offsets: &[usize],
    ) -> Vec<(T, usize)> {
        X::tabulate(bases.len(), |o| {
            let base = bases[o];
            match op {
                ReduceOp::Sum => {
                    let mut acc = T::zero();
                    for &offset in offsets {
                        acc = acc + data[base + offset];
                    }
                    (acc, base)
                }
                ReduceOp::Max | ReduceOp::Min => {
                    let mut arg = base + offsets[0];
                    let mut best = data[arg];
                    for &offset in &offsets[1..] {
                        let value = data[base + offset];
                        let better = match op {
                            ReduceOp::Max => value > best,
                            _ => value < best,
                        };
                        if better {
                            best = value;
                            arg = base + offset;
                        }
                    }
                    (best, arg)
                }
            }
        })
    }

    let (buffer, args) = match input {
        Buffer::F32(data) => {
            let (values, args): (Vec<f32>, Vec<usize>) =
                kernel::<X, f32>(op, data, &bases, &offsets).into_iter().unzip();
            (Buffer::F32(values), args)
        }
        Buffer::F64(data) => {
            let (values, args): (Vec<f64>, Vec<usize>) =
                kernel::<X, f64>(op, data, &bases, &offsets).into_iter().unzip();
            (Buffer::F64(values), args)
        }
    };
    Reduced {
        buffer,
        arg_indices: match op {
            ReduceOp::Sum => None,
            ReduceOp::Max | ReduceOp::Min => Some(args),
        },
    }
}

pub(crate) fn permute<X: Executor>(input: &Buffer, shape: &[usize], axes: &[usize]) -> Buffer {
    let src_strides = calculate_strides(shape);
    let out_shape: Vec<usize> = axes.iter().map(|&axis| shape[axis]).collect();
    let numel: usize = out_shape.iter().product();
    let source_index = |out_index: usize| {
        let mut remaining = out_index;
        let mut src = 0;
        for i in (0..out_shape.len()).rev() {
            src += (remaining % out_shape[i]) * src_strides[axes[i]];
            remaining /= out_shape[i];
        }
        src
    };
    map_buffer!(input, data => X::tabulate(numel, |i| data[source_index(i)]))
}

pub(crate) fn expand<X: Executor>(input: &Buffer, shape: &[usize], target_shape: &[usize]) -> Buffer {
    let indexer = BroadcastIndexer::new(shape, target_shape);
    let numel: usize = target_shape.iter().product();
    map_buffer!(input, data => X::tabulate(numel, |i| data[indexer.source_index(i)]))
}

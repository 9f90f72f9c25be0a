use std::fmt::Debug;

use num_traits::Float;

use crate::error::TensorGradError;
use crate::types::DType;

/// Contiguous, row-major element storage of a tensor.
///
/// `TensorData` keeps its buffer behind an `Arc`, so views that do not move data
/// (reshape, detach) share it, and in-place writes go through `Arc::make_mut`.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    /// Buffer holding f32 data.
    F32(Vec<f32>),
    /// Buffer holding f64 data.
    F64(Vec<f64>),
}

/// Element types a [`Buffer`] can hold.
///
/// Kernels are written once against this trait and instantiated for both precisions.
pub trait Element: Float + Debug + Send + Sync + 'static {
    const DTYPE: DType;

    /// Converts an `f64` constant to this precision.
    fn of(value: f64) -> Self;

    /// Widens the element to `f64`.
    fn as_f64(self) -> f64;

    fn into_buffer(data: Vec<Self>) -> Buffer;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn of(value: f64) -> Self {
        value as f32
    }

    fn as_f64(self) -> f64 {
        self as f64
    }

    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::F32(data)
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    fn of(value: f64) -> Self {
        value
    }

    fn as_f64(self) -> f64 {
        self
    }

    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::F64(data)
    }
}

/// Applies a generic expression to the typed vector inside a buffer and wraps the
/// resulting `Vec` back into a buffer of the same precision.
macro_rules! map_buffer {
    ($buffer:expr, $data:ident => $body:expr) => {
        match $buffer {
            $crate::buffer::Buffer::F32($data) => $crate::buffer::Buffer::F32($body),
            $crate::buffer::Buffer::F64($data) => $crate::buffer::Buffer::F64($body),
        }
    };
}

/// Two-buffer variant of `map_buffer!`; mixed precisions yield `DataTypeMismatch`.
macro_rules! zip_buffers {
    ($lhs:expr, $rhs:expr, $operation:expr, ($a:ident, $b:ident) => $body:expr) => {
        match ($lhs, $rhs) {
            ($crate::buffer::Buffer::F32($a), $crate::buffer::Buffer::F32($b)) => {
                Ok($crate::buffer::Buffer::F32($body))
            }
            ($crate::buffer::Buffer::F64($a), $crate::buffer::Buffer::F64($b)) => {
                Ok($crate::buffer::Buffer::F64($body))
            }
            (lhs, rhs) => Err($crate::error::TensorGradError::DataTypeMismatch {
                expected: lhs.dtype(),
                actual: rhs.dtype(),
                operation: $operation.to_string(),
            }),
        }
    };
}

impl Buffer {
    pub fn dtype(&self) -> DType {
        match self {
            Buffer::F32(_) => DType::F32,
            Buffer::F64(_) => DType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Buffer::F32(data) => data.len(),
            Buffer::F64(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a buffer of the requested precision from `f64` values.
    pub fn from_f64_vec(data: Vec<f64>, dtype: DType) -> Buffer {
        match dtype {
            DType::F32 => Buffer::F32(data.into_iter().map(|v| v as f32).collect()),
            DType::F64 => Buffer::F64(data),
        }
    }

    pub fn full(dtype: DType, len: usize, value: f64) -> Buffer {
        match dtype {
            DType::F32 => Buffer::F32(vec![value as f32; len]),
            DType::F64 => Buffer::F64(vec![value; len]),
        }
    }

    pub fn zeros(dtype: DType, len: usize) -> Buffer {
        Buffer::full(dtype, len, 0.0)
    }

    /// Copies the elements out, widened to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Buffer::F32(data) => data.iter().map(|&v| v as f64).collect(),
            Buffer::F64(data) => data.clone(),
        }
    }

    /// Converts the buffer to another precision (a plain clone if it already matches).
    pub fn cast(&self, dtype: DType) -> Buffer {
        if self.dtype() == dtype {
            return self.clone();
        }
        Buffer::from_f64_vec(self.to_f64_vec(), dtype)
    }

    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            Buffer::F32(data) => data.get(index).map(|&v| v as f64),
            Buffer::F64(data) => data.get(index).copied(),
        }
    }

    /// Attempts to borrow the elements as `f32`.
    pub fn try_get_f32(&self) -> Result<&[f32], TensorGradError> {
        match self {
            Buffer::F32(data) => Ok(data),
            other => Err(TensorGradError::DataTypeMismatch {
                expected: DType::F32,
                actual: other.dtype(),
                operation: "try_get_f32".to_string(),
            }),
        }
    }

    /// Attempts to borrow the elements as `f64`.
    pub fn try_get_f64(&self) -> Result<&[f64], TensorGradError> {
        match self {
            Buffer::F64(data) => Ok(data),
            other => Err(TensorGradError::DataTypeMismatch {
                expected: DType::F64,
                actual: other.dtype(),
                operation: "try_get_f64".to_string(),
            }),
        }
    }

    /// Overwrites one element. Used by the finite-difference oracle to perturb inputs.
    pub(crate) fn set_f64(&mut self, index: usize, value: f64) -> Result<(), TensorGradError> {
        let len = self.len();
        let slot_missing = || TensorGradError::IndexOutOfBounds {
            index: vec![index],
            shape: vec![len],
        };
        match self {
            Buffer::F32(data) => *data.get_mut(index).ok_or_else(slot_missing)? = value as f32,
            Buffer::F64(data) => *data.get_mut(index).ok_or_else(slot_missing)? = value,
        }
        Ok(())
    }

    /// Builds a zero buffer of `len` elements and adds `values[o]` at `indices[o]`.
    ///
    /// Repeated indices accumulate.
    pub(crate) fn scatter_add_flat(
        &self,
        len: usize,
        indices: &[usize],
    ) -> Result<Buffer, TensorGradError> {
        if indices.len() != self.len() {
            return Err(TensorGradError::InternalError(format!(
                "scatter_add_flat: {} indices for {} values",
                indices.len(),
                self.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(TensorGradError::IndexOutOfBounds {
                index: vec![bad],
                shape: vec![len],
            });
        }
        Ok(map_buffer!(self, values => scatter_add_kernel(values, len, indices)))
    }

    /// Copies out the elements at `indices`, in order. Indices may repeat.
    pub(crate) fn gather_flat(&self, indices: &[usize]) -> Result<Buffer, TensorGradError> {
        let len = self.len();
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(TensorGradError::IndexOutOfBounds {
                index: vec![bad],
                shape: vec![len],
            });
        }
        Ok(map_buffer!(self, data => indices.iter().map(|&i| data[i]).collect()))
    }

    /// Element-wise choice between two equally long buffers: `on_true[i]` where
    /// `mask[i]` is non-zero, `on_false[i]` elsewhere.
    pub(crate) fn select(mask: &Buffer, on_true: &Buffer, on_false: &Buffer) -> Result<Buffer, TensorGradError> {
        let mask = mask.to_f64_vec();
        if mask.len() != on_true.len() || mask.len() != on_false.len() {
            return Err(TensorGradError::InternalError(format!(
                "select: mask of {} elements for operands of {} and {}",
                mask.len(),
                on_true.len(),
                on_false.len()
            )));
        }
        zip_buffers!(on_true, on_false, "where", (t, f) => {
            mask.iter()
                .enumerate()
                .map(|(i, &m)| if m != 0.0 { t[i] } else { f[i] })
                .collect()
        })
    }

    /// Joins buffers end to end. All of them must share one precision.
    pub(crate) fn concat_flat(buffers: &[&Buffer]) -> Result<Buffer, TensorGradError> {
        let first = buffers.first().ok_or(TensorGradError::EmptyTensorList)?;
        let dtype = first.dtype();
        if let Some(other) = buffers.iter().find(|b| b.dtype() != dtype) {
            return Err(TensorGradError::DataTypeMismatch {
                expected: dtype,
                actual: other.dtype(),
                operation: "concat".to_string(),
            });
        }
        let total = buffers.iter().map(|b| b.len()).sum();
        Ok(match dtype {
            DType::F32 => {
                let mut out = Vec::with_capacity(total);
                for buffer in buffers {
                    out.extend_from_slice(buffer.try_get_f32()?);
                }
                Buffer::F32(out)
            }
            DType::F64 => {
                let mut out = Vec::with_capacity(total);
                for buffer in buffers {
                    out.extend_from_slice(buffer.try_get_f64()?);
                }
                Buffer::F64(out)
            }
        })
    }
}

fn scatter_add_kernel<T: Element>(values: &[T], len: usize, indices: &[usize]) -> Vec<T> {
    let mut out = vec![T::zero(); len];
    for (&value, &index) in values.iter().zip(indices) {
        out[index] = out[index] + value;
    }
    out
}

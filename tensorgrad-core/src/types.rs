use std::fmt;

/// Defines the floating-point precisions a tensor can be stored in.
///
/// The precision of a tensor is fixed when its buffer is allocated; operations
/// require both operands to share it and produce results of the same precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DType {
    /// 32-bit floating-point type.
    #[default]
    F32,
    /// 64-bit floating-point type. Required for numerical gradient checks.
    F64,
}

impl DType {
    /// Size in bytes of one element.
    pub fn size_of(&self) -> usize {
        match self {
            DType::F32 => std::mem::size_of::<f32>(),
            DType::F64 => std::mem::size_of::<f64>(),
        }
    }

    /// Whether finite-difference estimates are meaningful at this precision.
    pub fn is_double_precision(&self) -> bool {
        matches!(self, DType::F64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F32 => write!(f, "float32"),
            DType::F64 => write!(f, "float64"),
        }
    }
}

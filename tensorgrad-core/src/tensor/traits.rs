use std::fmt::{self, Debug};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use crate::error::TensorGradError;
use crate::ops::arithmetic::{add_op, add_scalar_op, div_op, mul_op, mul_scalar_op, neg_op, sub_op};
use crate::tensor::Tensor;

impl Debug for Tensor {
    /// Shows metadata and at most the first eight elements.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let td = self.read_data();
        let preview: Vec<f64> = (0..td.numel().min(8))
            .filter_map(|i| td.buffer.get_f64(i))
            .collect();
        write!(
            f,
            "Tensor(shape={:?}, dtype={}, device={:?}, requires_grad={}, grad_fn={}, data={:?}{})",
            td.shape,
            td.dtype,
            td.device,
            td.requires_grad,
            td.grad_fn.as_ref().map_or("None", |op| op.name()),
            preview,
            if td.numel() > 8 { "..." } else { "" }
        )
    }
}

impl PartialEq for Tensor {
    /// Two tensors are equal when they have the same shape, precision and elements.
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.data, &other.data) {
            return true;
        }
        let (shape, dtype, buffer) = {
            let guard = self.read_data();
            (guard.shape.clone(), guard.dtype, Arc::clone(&guard.buffer))
        };
        let guard = other.read_data();
        shape == guard.shape && dtype == guard.dtype && *buffer == *guard.buffer
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:path) => {
        impl<'a, 'b> $trait<&'b Tensor> for &'a Tensor {
            type Output = Result<Tensor, TensorGradError>;

            fn $method(self, rhs: &'b Tensor) -> Self::Output {
                $op(self, rhs)
            }
        }

        impl $trait<Tensor> for Tensor {
            type Output = Result<Tensor, TensorGradError>;

            fn $method(self, rhs: Tensor) -> Self::Output {
                $op(&self, &rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add, add_op);
impl_binary_operator!(Sub, sub, sub_op);
impl_binary_operator!(Mul, mul, mul_op);
impl_binary_operator!(Div, div, div_op);

impl<'a> Add<f64> for &'a Tensor {
    type Output = Result<Tensor, TensorGradError>;

    fn add(self, rhs: f64) -> Self::Output {
        add_scalar_op(self, rhs)
    }
}

impl<'a> Sub<f64> for &'a Tensor {
    type Output = Result<Tensor, TensorGradError>;

    fn sub(self, rhs: f64) -> Self::Output {
        add_scalar_op(self, -rhs)
    }
}

impl<'a> Mul<f64> for &'a Tensor {
    type Output = Result<Tensor, TensorGradError>;

    fn mul(self, rhs: f64) -> Self::Output {
        mul_scalar_op(self, rhs)
    }
}

impl<'a> Div<f64> for &'a Tensor {
    type Output = Result<Tensor, TensorGradError>;

    fn div(self, rhs: f64) -> Self::Output {
        mul_scalar_op(self, 1.0 / rhs)
    }
}

impl<'a> Neg for &'a Tensor {
    type Output = Result<Tensor, TensorGradError>;

    fn neg(self) -> Self::Output {
        neg_op(self)
    }
}

impl Neg for Tensor {
    type Output = Result<Tensor, TensorGradError>;

    fn neg(self) -> Self::Output {
        neg_op(&self)
    }
}

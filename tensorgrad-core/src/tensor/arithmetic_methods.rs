use rand::Rng;

use crate::error::TensorGradError;
use crate::ops::activation::{
    dropout_op, elu_op, leaky_relu_op, relu_op, selu_op, softmax_op, spatial_dropout_op,
};
use crate::ops::arithmetic::{
    add_op, add_scalar_op, div_op, mul_op, mul_scalar_op, neg_op, pow_scalar_op, sub_op,
};
use crate::ops::comparison::{eq_op, ge_op, gt_op, le_op, lt_op, where_op};
use crate::ops::linalg::matmul_op;
use crate::ops::math_elem::{abs_op, exp_op, ln_op, sigmoid_op, sqrt_op, tanh_op};
use crate::tensor::Tensor;

/// Method forms of the element-wise and matrix operations. Each delegates to the
/// matching `ops` function, which handles broadcasting and autograd.
impl Tensor {
    pub fn add(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        add_op(self, other)
    }

    pub fn sub(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        sub_op(self, other)
    }

    pub fn mul(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        mul_op(self, other)
    }

    pub fn div(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        div_op(self, other)
    }

    pub fn neg(&self) -> Result<Tensor, TensorGradError> {
        neg_op(self)
    }

    pub fn add_scalar(&self, value: f64) -> Result<Tensor, TensorGradError> {
        add_scalar_op(self, value)
    }

    pub fn mul_scalar(&self, value: f64) -> Result<Tensor, TensorGradError> {
        mul_scalar_op(self, value)
    }

    pub fn pow_scalar(&self, exponent: f64) -> Result<Tensor, TensorGradError> {
        pow_scalar_op(self, exponent)
    }

    /// 2-D matrix product.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        matmul_op(self, other)
    }

    pub fn exp(&self) -> Result<Tensor, TensorGradError> {
        exp_op(self)
    }

    pub fn ln(&self) -> Result<Tensor, TensorGradError> {
        ln_op(self)
    }

    pub fn sqrt(&self) -> Result<Tensor, TensorGradError> {
        sqrt_op(self)
    }

    pub fn abs(&self) -> Result<Tensor, TensorGradError> {
        abs_op(self)
    }

    pub fn tanh(&self) -> Result<Tensor, TensorGradError> {
        tanh_op(self)
    }

    pub fn sigmoid(&self) -> Result<Tensor, TensorGradError> {
        sigmoid_op(self)
    }

    pub fn relu(&self) -> Result<Tensor, TensorGradError> {
        relu_op(self)
    }

    pub fn leaky_relu(&self, alpha: f64) -> Result<Tensor, TensorGradError> {
        leaky_relu_op(self, alpha)
    }

    pub fn elu(&self, alpha: f64) -> Result<Tensor, TensorGradError> {
        elu_op(self, alpha)
    }

    pub fn selu(&self) -> Result<Tensor, TensorGradError> {
        selu_op(self)
    }

    pub fn softmax(&self, axis: usize) -> Result<Tensor, TensorGradError> {
        softmax_op(self, axis)
    }

    /// See [`dropout_op`].
    pub fn dropout<R: Rng + ?Sized>(&self, p: f64, rng: &mut R) -> Result<Tensor, TensorGradError> {
        dropout_op(self, p, rng)
    }

    /// See [`spatial_dropout_op`].
    pub fn spatial_dropout<R: Rng + ?Sized>(&self, p: f64, rng: &mut R) -> Result<Tensor, TensorGradError> {
        spatial_dropout_op(self, p, rng)
    }

    pub fn gt(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        gt_op(self, other)
    }

    pub fn lt(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        lt_op(self, other)
    }

    pub fn ge(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        ge_op(self, other)
    }

    pub fn le(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        le_op(self, other)
    }

    pub fn eq_elem(&self, other: &Tensor) -> Result<Tensor, TensorGradError> {
        eq_op(self, other)
    }

    /// Uses `self` as the condition: `on_true` where non-zero, `on_false` elsewhere.
    pub fn select(&self, on_true: &Tensor, on_false: &Tensor) -> Result<Tensor, TensorGradError> {
        where_op(self, on_true, on_false)
    }
}

//! # Activation Functions
//!
//! Element-wise activations share the unary record of [`math_elem`](crate::ops::math_elem).
//! [`softmax_op`] is composed from primitives and [`dropout_op`] and
//! [`spatial_dropout_op`] multiply by a constant random mask.

pub mod dropout;
pub mod relu;
pub mod softmax;

pub use dropout::{dropout_op, spatial_dropout_op};
pub use relu::{elu_op, leaky_relu_op, relu_op, selu_op};
pub use softmax::softmax_op;

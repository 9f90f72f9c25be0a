//! Linear algebra: matrix product, axis permutations and 2-D convolution.

pub mod conv;
pub mod matmul;
pub mod transpose;

pub use conv::{conv2d_op, conv_transpose2d_op};
pub use matmul::matmul_op;
pub use transpose::{permute_op, transpose_op};

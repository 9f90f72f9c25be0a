//! Reductions: `sum`, `mean`, `max`, `min`, and the 2-D pooling built on them.
//!
//! `axes = None` reduces every dimension. With `keep_dims`, reduced dimensions stay
//! in the output with size 1.

pub mod max;
pub mod mean;
pub mod pool;
pub mod sum;
pub(crate) mod utils;

pub use max::{max_op, min_op};
pub use mean::mean_op;
pub use pool::{avg_pool2d_op, max_pool2d_op};
pub use sum::sum_op;

//! Shape-changing operations.
//!
//! Tensors are always contiguous: `reshape` shares the buffer, every other view
//! operation copies the selected elements into a new buffer.

pub mod concat;
pub mod expand;
pub mod gather;
pub mod reshape;
pub mod window;

pub use concat::concat_op;
pub use expand::expand_op;
pub use gather::{index_select_op, narrow_op};
pub use reshape::reshape_op;
pub use window::{dilate_spatial_op, pad_spatial_op, unfold_op};

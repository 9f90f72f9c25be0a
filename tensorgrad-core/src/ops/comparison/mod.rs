//! Element-wise comparisons and conditional selection.
//!
//! Comparisons return masks holding `1.0` where the predicate holds and `0.0`
//! elsewhere, in the operands' precision. Masks never require grad; they feed
//! [`where_op`] or arithmetic as constants.

pub mod compare;
pub mod where_op;

pub use compare::{eq_op, ge_op, gt_op, le_op, lt_op};
pub use where_op::where_op;

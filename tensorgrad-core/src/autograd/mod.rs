//! Reverse-mode automatic differentiation.
//!
//! Every tracked operation attaches a [`BackwardOp`] record to its output. Calling
//! `Tensor::backward` builds a [`ComputationGraph`] over those records and walks it
//! in reverse topological order.

pub mod backward_op;
pub mod grad_check;
pub mod grad_mode;
pub mod graph;

pub use backward_op::{BackwardOp, NodeId, SavedTensor};
pub use grad_mode::{is_grad_enabled, no_grad, set_grad_enabled, NoGradGuard};
pub use graph::{graph_size, topological_sort, ComputationGraph, GraphState};

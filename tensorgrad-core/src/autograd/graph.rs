use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::autograd::backward_op::NodeId;
use crate::autograd::grad_mode::NoGradGuard;
use crate::error::TensorGradError;
use crate::ops::arithmetic::add_op;
use crate::tensor::Tensor;

/// Returns every node reachable from `root` through `grad_fn` links, inputs before
/// the operations consuming them (DFS post-order). `root` is always last.
///
/// Iterative, so arbitrarily deep graphs (long unrolled loops) do not overflow the stack.
pub fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut order = Vec::new();
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if !visited.insert(node.node_id()) {
            continue;
        }
        let grad_fn = node.grad_fn();
        stack.push((node, true));
        if let Some(op) = grad_fn {
            for input in op.inputs().into_iter().rev() {
                if !visited.contains(&input.node_id()) {
                    stack.push((input, false));
                }
            }
        }
    }
    order
}

/// Number of nodes (operation outputs and leaves) reachable from `root`.
pub fn graph_size(root: &Tensor) -> usize {
    topological_sort(root).len()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    Idle,
    Traversing,
    Done,
}

impl fmt::Display for GraphState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphState::Idle => write!(f, "Idle"),
            GraphState::Traversing => write!(f, "Traversing"),
            GraphState::Done => write!(f, "Done"),
        }
    }
}

/// One reverse-mode pass over the graph rooted at a tensor.
///
/// The executor is single use: it moves from `Idle` through `Traversing` to `Done`.
/// If the traversal fails it returns to `Idle` and no `grad` slot has been touched.
#[derive(Debug)]
pub struct ComputationGraph {
    root: Tensor,
    state: GraphState,
}

impl ComputationGraph {
    pub fn new(root: &Tensor) -> Self {
        ComputationGraph {
            root: root.clone(),
            state: GraphState::Idle,
        }
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    /// Propagates `seed` (dL/droot) to every node of the graph and accumulates the
    /// result into the `grad` slot of each node that requires grad.
    pub fn backward(&mut self, seed: Tensor) -> Result<(), TensorGradError> {
        if self.state != GraphState::Idle {
            return Err(TensorGradError::InvalidGraphState {
                state: self.state.to_string(),
                expected: GraphState::Idle.to_string(),
            });
        }
        self.state = GraphState::Traversing;
        log::debug!("Backward pass: {} -> {}", GraphState::Idle, self.state);

        let result = {
            let _guard = NoGradGuard::new();
            self.traverse(seed).and_then(publish)
        };

        self.state = match result {
            Ok(()) => GraphState::Done,
            Err(_) => GraphState::Idle,
        };
        log::debug!("Backward pass: {} -> {}", GraphState::Traversing, self.state);
        result
    }

    /// Computes the new value of every touched `grad` slot without writing any of them.
    fn traverse(&self, seed: Tensor) -> Result<Vec<(Tensor, Tensor)>, TensorGradError> {
        let order = topological_sort(&self.root);
        log::debug!("Topological sort visited {} nodes", order.len());

        let mut pending: HashMap<NodeId, Tensor> = HashMap::new();
        pending.insert(self.root.node_id(), seed);
        let mut updates = Vec::new();

        for node in order.iter().rev() {
            let grad = match pending.remove(&node.node_id()) {
                Some(grad) => grad,
                None => continue,
            };
            let (requires_grad, grad_fn, previous) = {
                let guard = node.read_data();
                (guard.requires_grad, guard.grad_fn.clone(), guard.grad.clone())
            };
            if requires_grad {
                let accumulated = match previous {
                    Some(previous) => add_op(&previous, &grad)?,
                    None => grad.clone(),
                };
                updates.push((node.clone(), accumulated));
            }

            let op = match grad_fn {
                Some(op) => op,
                None => continue,
            };
            log::trace!("Backward through {} ({:?})", op.name(), node.node_id());
            let input_grads = op.backward(&grad)?;
            let inputs = op.inputs();
            if input_grads.len() != inputs.len() {
                return Err(TensorGradError::InternalError(format!(
                    "{} returned {} gradients for {} inputs",
                    op.name(),
                    input_grads.len(),
                    inputs.len()
                )));
            }

            for (input, input_grad) in inputs.iter().zip(input_grads) {
                if !input.requires_grad() {
                    continue;
                }
                let expected = input.shape();
                if input_grad.shape() != expected {
                    return Err(TensorGradError::InternalError(format!(
                        "{} produced a gradient of shape {:?} for an input of shape {:?}",
                        op.name(),
                        input_grad.shape(),
                        expected
                    )));
                }
                match pending.entry(input.node_id()) {
                    Entry::Occupied(mut entry) => {
                        let sum = add_op(entry.get(), &input_grad)?;
                        entry.insert(sum);
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(input_grad);
                    }
                }
            }
        }
        Ok(updates)
    }
}

fn publish(updates: Vec<(Tensor, Tensor)>) -> Result<(), TensorGradError> {
    for (node, grad) in updates {
        node.write_data().grad = Some(grad.detach());
    }
    Ok(())
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;

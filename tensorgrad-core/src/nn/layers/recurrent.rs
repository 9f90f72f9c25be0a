//! Hidden/cell state carried by the recurrent layers between time steps.

use crate::config::Config;
use crate::error::TensorGradError;
use crate::tensor::{zeros_with_config, Tensor};

#[derive(Debug, Default)]
pub(crate) struct RecurrentState {
    hidden: Option<Tensor>,
    cell: Option<Tensor>,
}

impl RecurrentState {
    pub(crate) fn hidden(&self) -> Option<&Tensor> {
        self.hidden.as_ref()
    }

    pub(crate) fn cell(&self) -> Option<&Tensor> {
        self.cell.as_ref()
    }

    /// The `(hidden, cell)` pair the next step starts from: the carried state, or
    /// zeros shaped `(batch, hidden_size)` in the input's precision and device.
    pub(crate) fn current(
        &self,
        input: &Tensor,
        hidden_size: usize,
        operation: &str,
    ) -> Result<(Tensor, Tensor), TensorGradError> {
        let batch = input.shape()[0];
        match (&self.hidden, &self.cell) {
            (Some(h), Some(c)) => {
                let expected = vec![batch, hidden_size];
                if h.shape() != expected {
                    return Err(TensorGradError::ShapeMismatch {
                        expected: h.shape(),
                        actual: expected,
                        operation: format!("{} (carried state batch)", operation),
                    });
                }
                Ok((h.clone(), c.clone()))
            }
            _ => {
                let config = Config::new(input.dtype(), input.device());
                Ok((
                    zeros_with_config(&[batch, hidden_size], &config)?,
                    zeros_with_config(&[batch, hidden_size], &config)?,
                ))
            }
        }
    }

    pub(crate) fn store(&mut self, hidden: Tensor, cell: Tensor) {
        self.hidden = Some(hidden);
        self.cell = Some(cell);
    }

    /// Swaps the carried state for detached copies. Values continue; history does not.
    pub(crate) fn detach(&mut self) {
        self.hidden = self.hidden.take().map(|h| h.detach());
        self.cell = self.cell.take().map(|c| c.detach());
    }

    pub(crate) fn clear(&mut self) {
        self.hidden = None;
        self.cell = None;
    }
}

/// Checks a `(batch, input_size)` step input.
pub(crate) fn check_step_input(input: &Tensor, input_size: usize, operation: &str) -> Result<(), TensorGradError> {
    let shape = input.shape();
    if shape.len() != 2 || shape[1] != input_size {
        return Err(TensorGradError::ShapeMismatch {
            expected: vec![shape.first().copied().unwrap_or(1), input_size],
            actual: shape,
            operation: operation.to_string(),
        });
    }
    Ok(())
}

//! A single-layer LSTM cell that carries its hidden and cell state across calls.
//!
//! Each `forward` advances one time step, so unrolling a sequence grows the graph
//! by one cell per call. [`Lstm::truncate`] ends the unrolled window: the next step
//! starts from a zero state and shares no history with the steps before it, while
//! any loss already built from earlier outputs keeps its full graph.

use crate::config::Config;
use crate::error::TensorGradError;
use crate::nn::init::{Constant, Initializer};
use crate::nn::layers::recurrent::{check_step_input, RecurrentState};
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;

#[derive(Debug)]
pub struct Lstm {
    input_size: usize,
    hidden_size: usize,
    /// Input projection, `(input_size, 4 * hidden_size)`.
    w: Parameter,
    /// Recurrent projection, `(hidden_size, 4 * hidden_size)`.
    u: Parameter,
    /// `(1, 4 * hidden_size)`.
    b: Parameter,
    state: RecurrentState,
}

impl Lstm {
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        init: &dyn Initializer,
        config: &Config,
    ) -> Result<Self, TensorGradError> {
        let gates = 4 * hidden_size;
        let w = Parameter::new_named(init.initialize(&[input_size, gates], config.dtype, config.device)?, "w")?;
        let u = Parameter::new_named(init.initialize(&[hidden_size, gates], config.dtype, config.device)?, "u")?;
        let b = Parameter::new_named(Constant(0.0).initialize(&[1, gates], config.dtype, config.device)?, "b")?;
        Ok(Lstm {
            input_size,
            hidden_size,
            w,
            u,
            b,
            state: RecurrentState::default(),
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// The carried hidden state, `None` before the first step or after a truncation.
    pub fn hidden(&self) -> Option<&Tensor> {
        self.state.hidden()
    }

    pub fn cell(&self) -> Option<&Tensor> {
        self.state.cell()
    }

    /// Ends the current unrolled window.
    ///
    /// The carried state is dropped, so the next step starts from zeros. Tensors
    /// already returned by `forward` are left untouched and can still be
    /// backpropagated through every step of the window.
    pub fn truncate(&mut self) {
        self.state.clear();
        log::debug!("Truncated LSTM state");
    }

    /// Keeps the carried values but cuts them from the steps that produced them,
    /// for truncated backpropagation over a continuing sequence.
    pub fn detach_state(&mut self) {
        self.state.detach();
    }

    /// Drops the carried state; the next step starts from zeros.
    pub fn reset_state(&mut self) {
        self.state.clear();
    }
}

impl Module for Lstm {
    /// One time step on a `(batch, input_size)` input; returns the new hidden state.
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        check_step_input(input, self.input_size, "lstm")?;
        let (h, c) = self.state.current(input, self.hidden_size, "lstm")?;
        let gates = input.matmul(&self.w)?.add(&h.matmul(&self.u)?)?.add(&self.b)?;

        let n = self.hidden_size;
        let input_gate = gates.narrow(1, 0, n)?.sigmoid()?;
        let forget_gate = gates.narrow(1, n, n)?.sigmoid()?;
        let candidate = gates.narrow(1, 2 * n, n)?.tanh()?;
        let output_gate = gates.narrow(1, 3 * n, n)?.sigmoid()?;

        let next_c = forget_gate.mul(&c)?.add(&input_gate.mul(&candidate)?)?;
        let next_h = output_gate.mul(&next_c.tanh()?)?;

        self.state.store(next_h.clone(), next_c);
        Ok(next_h)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.w, &self.u, &self.b]
    }
}

#[cfg(test)]
#[path = "lstm_test.rs"]
mod tests;

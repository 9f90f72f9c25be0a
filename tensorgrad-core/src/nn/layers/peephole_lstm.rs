use crate::config::Config;
use crate::error::TensorGradError;
use crate::nn::init::{Constant, Initializer};
use crate::nn::layers::recurrent::{check_step_input, RecurrentState};
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;

/// LSTM cell whose gates also look at the cell state.
///
/// The input and forget gates see the previous cell state, the output gate sees
/// the new one, each through an element-wise peephole weight:
///
/// ```text
/// i = σ(z_i + p_i ⊙ c_prev)    f = σ(z_f + p_f ⊙ c_prev)    g = tanh(z_g)
/// c = f ⊙ c_prev + i ⊙ g       o = σ(z_o + p_o ⊙ c)          h = o ⊙ tanh(c)
/// ```
///
/// State handling (`truncate`, `detach_state`, `reset_state`) matches [`Lstm`](super::Lstm).
#[derive(Debug)]
pub struct PeepholeLstm {
    input_size: usize,
    hidden_size: usize,
    w: Parameter,
    u: Parameter,
    b: Parameter,
    /// Peephole weights `(1, 3 * hidden_size)`, ordered input, forget, output.
    p: Parameter,
    state: RecurrentState,
}

impl PeepholeLstm {
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        init: &dyn Initializer,
        config: &Config,
    ) -> Result<Self, TensorGradError> {
        let gates = 4 * hidden_size;
        let (dtype, device) = (config.dtype, config.device);
        Ok(PeepholeLstm {
            input_size,
            hidden_size,
            w: Parameter::new_named(init.initialize(&[input_size, gates], dtype, device)?, "w")?,
            u: Parameter::new_named(init.initialize(&[hidden_size, gates], dtype, device)?, "u")?,
            b: Parameter::new_named(Constant(0.0).initialize(&[1, gates], dtype, device)?, "b")?,
            p: Parameter::new_named(init.initialize(&[1, 3 * hidden_size], dtype, device)?, "p")?,
            state: RecurrentState::default(),
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn hidden(&self) -> Option<&Tensor> {
        self.state.hidden()
    }

    pub fn cell(&self) -> Option<&Tensor> {
        self.state.cell()
    }

    pub fn truncate(&mut self) {
        self.state.clear();
        log::debug!("Truncated peephole LSTM state");
    }

    pub fn detach_state(&mut self) {
        self.state.detach();
    }

    pub fn reset_state(&mut self) {
        self.state.clear();
    }
}

impl Module for PeepholeLstm {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        check_step_input(input, self.input_size, "peephole_lstm")?;
        let (h, c) = self.state.current(input, self.hidden_size, "peephole_lstm")?;
        let gates = input.matmul(&self.w)?.add(&h.matmul(&self.u)?)?.add(&self.b)?;

        let n = self.hidden_size;
        let peep_i = self.p.narrow(1, 0, n)?;
        let peep_f = self.p.narrow(1, n, n)?;
        let peep_o = self.p.narrow(1, 2 * n, n)?;

        let input_gate = gates.narrow(1, 0, n)?.add(&peep_i.mul(&c)?)?.sigmoid()?;
        let forget_gate = gates.narrow(1, n, n)?.add(&peep_f.mul(&c)?)?.sigmoid()?;
        let candidate = gates.narrow(1, 2 * n, n)?.tanh()?;
        let next_c = forget_gate.mul(&c)?.add(&input_gate.mul(&candidate)?)?;
        let output_gate = gates.narrow(1, 3 * n, n)?.add(&peep_o.mul(&next_c)?)?.sigmoid()?;
        let next_h = output_gate.mul(&next_c.tanh()?)?;

        self.state.store(next_h.clone(), next_c);
        Ok(next_h)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.w, &self.u, &self.b, &self.p]
    }
}

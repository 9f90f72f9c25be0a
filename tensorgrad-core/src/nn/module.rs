use crate::error::TensorGradError;
use crate::nn::Parameter;
use crate::tensor::Tensor;

/// The base trait for all neural network modules.
///
/// `forward` takes `&mut self` so stateful layers (recurrent cells) can carry
/// state between calls.
pub trait Module: std::fmt::Debug + Send + Sync {
    /// Performs a forward pass of the module.
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError>;

    /// All learnable parameters, including those of sub-modules.
    fn parameters(&self) -> Vec<&Parameter>;

    /// Parameters paired with their names. Unnamed parameters are reported by position.
    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        self.parameters()
            .into_iter()
            .enumerate()
            .map(|(i, p)| (p.name().map_or_else(|| i.to_string(), str::to_string), p))
            .collect()
    }

    /// Switches between training and inference behaviour. Layers that act the
    /// same in both modes ignore it.
    fn set_inference(&mut self, _inference: bool) {}

    /// Clears the gradient of every parameter.
    fn zero_grad(&self) {
        for parameter in self.parameters() {
            parameter.zero_grad();
        }
    }
}

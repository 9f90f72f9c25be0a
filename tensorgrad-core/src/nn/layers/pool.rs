use crate::error::TensorGradError;
use crate::nn::layers::conv::Window2d;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::ops::reduction::{avg_pool2d_op, max_pool2d_op};
use crate::tensor::Tensor;

/// Max pooling over the spatial axes. No parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxPool2d {
    window: Window2d,
}

impl MaxPool2d {
    pub fn new(window: Window2d) -> Self {
        MaxPool2d { window }
    }
}

impl Module for MaxPool2d {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        max_pool2d_op(input, self.window.kernel, self.window.stride, self.window.padding)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }
}

/// Average pooling over the spatial axes. Padded positions count as zeros.
#[derive(Debug, Clone, Copy, Default)]
pub struct AveragePool2d {
    window: Window2d,
}

impl AveragePool2d {
    pub fn new(window: Window2d) -> Self {
        AveragePool2d { window }
    }
}

impl Module for AveragePool2d {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        avg_pool2d_op(input, self.window.kernel, self.window.stride, self.window.padding)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }
}

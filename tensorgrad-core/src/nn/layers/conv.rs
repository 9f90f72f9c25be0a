use crate::config::Config;
use crate::error::TensorGradError;
use crate::nn::init::{Constant, Initializer};
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::ops::linalg::{conv2d_op, conv_transpose2d_op};
use crate::tensor::Tensor;

/// Window geometry shared by the convolution and pooling layers.
///
/// Defaults to a 3x3 window, unit stride and no padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window2d {
    pub kernel: (usize, usize),
    pub stride: (usize, usize),
    pub padding: (usize, usize),
}

impl Default for Window2d {
    fn default() -> Self {
        Window2d {
            kernel: (3, 3),
            stride: (1, 1),
            padding: (0, 0),
        }
    }
}

impl Window2d {
    pub fn square(kernel: usize) -> Self {
        Window2d {
            kernel: (kernel, kernel),
            ..Window2d::default()
        }
    }

    pub fn with_stride(mut self, stride: (usize, usize)) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_padding(mut self, padding: (usize, usize)) -> Self {
        self.padding = padding;
        self
    }
}

fn filter_bank(
    shape: [usize; 4],
    bias_channels: usize,
    init: &dyn Initializer,
    config: &Config,
) -> Result<(Parameter, Parameter), TensorGradError> {
    let weight = Parameter::new_named(init.initialize(&shape, config.dtype, config.device)?, "weight")?;
    let bias = Parameter::new_named(
        Constant(0.0).initialize(&[1, bias_channels, 1, 1], config.dtype, config.device)?,
        "bias",
    )?;
    Ok((weight, bias))
}

/// 2-D convolution over `(N, C, H, W)` inputs.
///
/// The filter has shape `(out_channels, in_channels, KH, KW)`; the bias
/// `(1, out_channels, 1, 1)` broadcasts over batch and space.
#[derive(Debug)]
pub struct Conv2d {
    weight: Parameter,
    bias: Parameter,
    window: Window2d,
}

impl Conv2d {
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        window: Window2d,
        init: &dyn Initializer,
        config: &Config,
    ) -> Result<Self, TensorGradError> {
        let (kh, kw) = window.kernel;
        let (weight, bias) = filter_bank([out_channels, in_channels, kh, kw], out_channels, init, config)?;
        log::debug!("Created Conv2d({} -> {}, {:?})", in_channels, out_channels, window);
        Ok(Conv2d { weight, bias, window })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> &Parameter {
        &self.bias
    }

    pub fn window(&self) -> Window2d {
        self.window
    }
}

impl Module for Conv2d {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        conv2d_op(input, &self.weight, self.window.stride, self.window.padding)?.add(&self.bias)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.weight, &self.bias]
    }
}

/// Transposed 2-D convolution, the gradient of [`Conv2d`] with respect to its input.
///
/// The filter has shape `(in_channels, out_channels, KH, KW)` and each output
/// extent is `(H - 1) * stride + KH - 2 * padding`.
#[derive(Debug)]
pub struct Deconv2d {
    weight: Parameter,
    bias: Parameter,
    window: Window2d,
}

impl Deconv2d {
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        window: Window2d,
        init: &dyn Initializer,
        config: &Config,
    ) -> Result<Self, TensorGradError> {
        let (kh, kw) = window.kernel;
        let (weight, bias) = filter_bank([in_channels, out_channels, kh, kw], out_channels, init, config)?;
        log::debug!("Created Deconv2d({} -> {}, {:?})", in_channels, out_channels, window);
        Ok(Deconv2d { weight, bias, window })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> &Parameter {
        &self.bias
    }
}

impl Module for Deconv2d {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, TensorGradError> {
        conv_transpose2d_op(input, &self.weight, self.window.stride, self.window.padding)?.add(&self.bias)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.weight, &self.bias]
    }
}

#[cfg(test)]
#[path = "conv_test.rs"]
mod tests;

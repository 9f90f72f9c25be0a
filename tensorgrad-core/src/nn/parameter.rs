use std::fmt;
use std::ops::Deref;

use crate::error::TensorGradError;
use crate::tensor::Tensor;

/// A learnable tensor owned by a [`Module`](crate::nn::Module).
///
/// The wrapped tensor is a leaf with `requires_grad == true`.
#[derive(Clone)]
pub struct Parameter {
    tensor: Tensor,
    name: Option<String>,
}

impl Parameter {
    /// Wraps `tensor`, marking it as requiring grad.
    ///
    /// # Errors
    /// `RequiresGradOnNonLeaf` if `tensor` is the output of a recorded operation.
    pub fn new(tensor: Tensor) -> Result<Self, TensorGradError> {
        tensor.requires_grad_(true)?;
        Ok(Parameter { tensor, name: None })
    }

    pub fn new_named(tensor: Tensor, name: impl Into<String>) -> Result<Self, TensorGradError> {
        let mut parameter = Parameter::new(tensor)?;
        parameter.name = Some(name.into());
        Ok(parameter)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// Consumes the Parameter and returns the underlying Tensor.
    pub fn into_inner(self) -> Tensor {
        self.tensor
    }
}

impl Deref for Parameter {
    type Target = Tensor;

    fn deref(&self) -> &Self::Target {
        &self.tensor
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter(name={:?}, {:?})", self.name, self.tensor)
    }
}

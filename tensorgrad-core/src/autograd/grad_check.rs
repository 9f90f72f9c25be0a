//! Finite-difference oracle for validating analytic gradients.

use std::sync::Arc;

use thiserror::Error;

use crate::autograd::grad_mode::NoGradGuard;
use crate::buffer::Buffer;
use crate::error::TensorGradError;
use crate::tensor::Tensor;
use crate::types::DType;

pub const DEFAULT_EPSILON: f64 = 1e-6;
pub const DEFAULT_ATOL: f64 = 1e-5;
pub const DEFAULT_RTOL: f64 = 1e-3;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    /// Finite differences are meaningless below double precision. Harnesses treat
    /// this as "skip", not as a failure.
    #[error("Gradient check needs float64 inputs; input {input_index} is {dtype}")]
    InsufficientPrecision { input_index: usize, dtype: DType },

    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical_grad} vs numerical {numerical_grad} (difference {difference}, {mismatched} element(s) out of tolerance)")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
        mismatched: usize,
    },

    #[error("Checked function must return a single-element tensor, got shape {shape:?}")]
    NonScalarOutput { shape: Vec<usize> },

    #[error("Input {input_index} requires grad but has no gradient after backward pass.")]
    MissingAnalyticalGrad { input_index: usize },

    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
    },

    #[error("Tensor error during gradient check: {0}")]
    TensorError(TensorGradError),
}

impl From<TensorGradError> for GradCheckError {
    fn from(err: TensorGradError) -> Self {
        GradCheckError::TensorError(err)
    }
}

impl GradCheckError {
    /// True when the check could not run meaningfully and should be reported as skipped.
    pub fn is_skip(&self) -> bool {
        matches!(self, GradCheckError::InsufficientPrecision { .. })
    }
}

fn require_double_precision(index: usize, tensor: &Tensor) -> Result<(), GradCheckError> {
    let dtype = tensor.dtype();
    if !dtype.is_double_precision() {
        return Err(GradCheckError::InsufficientPrecision {
            input_index: index,
            dtype,
        });
    }
    Ok(())
}

fn scalar_value(output: &Tensor) -> Result<f64, GradCheckError> {
    if output.numel() != 1 {
        return Err(GradCheckError::NonScalarOutput {
            shape: output.shape(),
        });
    }
    Ok(output.item()?)
}

/// Central-difference estimate of d func / d inputs[index].
///
/// `func` must return a single-element tensor. It is re-evaluated with grad mode
/// disabled on fresh leaves in which one element of `inputs[index]` is moved by ±epsilon.
/// The result is an F64 tensor shaped like `inputs[index]`.
pub fn numerical_grad<F>(
    func: F,
    inputs: &[Tensor],
    index: usize,
    epsilon: f64,
) -> Result<Tensor, GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, TensorGradError>,
{
    for (i, input) in inputs.iter().enumerate() {
        require_double_precision(i, input)?;
    }
    let target = inputs.get(index).ok_or_else(|| {
        TensorGradError::InvalidArgument(format!(
            "input index {} out of range for {} inputs",
            index,
            inputs.len()
        ))
    })?;
    let shape = target.shape();
    let device = target.device();
    let base = target.to_f64_vec();

    let _guard = NoGradGuard::new();
    let evaluate = |position: usize, value: f64| -> Result<f64, GradCheckError> {
        let mut data = base.clone();
        data[position] = value;
        let perturbed = Tensor::from_buffer(Buffer::F64(data), shape.clone(), device)?;
        let mut args = inputs.to_vec();
        args[index] = perturbed;
        scalar_value(&func(&args)?)
    };

    let mut grads = Vec::with_capacity(base.len());
    for (position, &x) in base.iter().enumerate() {
        let plus = evaluate(position, x + epsilon)?;
        let minus = evaluate(position, x - epsilon)?;
        let grad = (plus - minus) / (2.0 * epsilon);
        if !grad.is_finite() {
            return Err(GradCheckError::NumericalGradNaNOrInfinite {
                input_index: index,
                element_index: position,
            });
        }
        grads.push(grad);
    }
    Ok(Tensor::from_buffer(Buffer::F64(grads), shape, device)?)
}

/// Central-difference estimate of d func / d target for a tensor `func` reads implicitly,
/// such as a layer parameter.
///
/// The target's buffer is perturbed in place for each evaluation and restored before
/// returning, whether or not `func` fails.
pub fn numerical_grad_of<F>(target: &Tensor, mut func: F, epsilon: f64) -> Result<Tensor, GradCheckError>
where
    F: FnMut() -> Result<Tensor, TensorGradError>,
{
    require_double_precision(0, target)?;
    let original: Arc<Buffer> = target.buffer();
    let base = original.to_f64_vec();

    let _guard = NoGradGuard::new();
    let mut evaluate = |position: usize, value: f64| -> Result<f64, GradCheckError> {
        {
            let mut guard = target.write_data();
            let buffer = Arc::make_mut(&mut guard.buffer);
            buffer.set_f64(position, value)?;
        }
        let result = func().map_err(GradCheckError::from).and_then(|out| scalar_value(&out));
        Arc::make_mut(&mut target.write_data().buffer).set_f64(position, base[position])?;
        result
    };

    let mut estimate_all = || -> Result<Vec<f64>, GradCheckError> {
        let mut grads = Vec::with_capacity(base.len());
        for (position, &x) in base.iter().enumerate() {
            let plus = evaluate(position, x + epsilon)?;
            let minus = evaluate(position, x - epsilon)?;
            grads.push((plus - minus) / (2.0 * epsilon));
        }
        Ok(grads)
    };
    let outcome = estimate_all();
    target.write_data().buffer = original;
    let grads = outcome?;

    let (shape, device) = {
        let guard = target.read_data();
        (guard.shape.clone(), guard.device)
    };
    Ok(Tensor::from_buffer(Buffer::F64(grads), shape, device)?)
}

/// Compares one analytic gradient with its numerical estimate using
/// `|a - n| <= atol + rtol * |n|`.
pub fn compare_grads(
    input_index: usize,
    analytical: &Tensor,
    numerical: &Tensor,
    atol: f64,
    rtol: f64,
) -> Result<(), GradCheckError> {
    if analytical.shape() != numerical.shape() {
        return Err(TensorGradError::ShapeMismatch {
            expected: numerical.shape(),
            actual: analytical.shape(),
            operation: "compare_grads".to_string(),
        }
        .into());
    }
    let a = analytical.to_f64_vec();
    let n = numerical.to_f64_vec();
    let mut first = None;
    let mut mismatched = 0;
    for (element_index, (&a, &n)) in a.iter().zip(&n).enumerate() {
        let difference = (a - n).abs();
        if !(difference <= atol + rtol * n.abs()) {
            mismatched += 1;
            first.get_or_insert((element_index, a, n, difference));
        }
    }
    match first {
        None => Ok(()),
        Some((element_index, analytical_grad, numerical_grad, difference)) => {
            Err(GradCheckError::GradientMismatch {
                input_index,
                element_index,
                analytical_grad,
                numerical_grad,
                difference,
                mismatched,
            })
        }
    }
}

/// Checks analytical gradients against numerical gradients using finite differences.
///
/// `func` receives fresh leaf copies of `inputs` (same `requires_grad` flags) and must
/// return a single-element tensor. Every input with `requires_grad` is compared.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    epsilon: f64,
    atol: f64,
    rtol: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, TensorGradError>,
{
    for (i, input) in inputs.iter().enumerate() {
        require_double_precision(i, input)?;
    }

    let leaves: Vec<Tensor> = inputs
        .iter()
        .map(|input| {
            let leaf = input.detach();
            leaf.requires_grad_(input.requires_grad()).map(|_| leaf)
        })
        .collect::<Result<_, _>>()?;

    let output = func(&leaves)?;
    scalar_value(&output)?;
    output.backward()?;

    for (i, leaf) in leaves.iter().enumerate() {
        if !leaf.requires_grad() {
            continue;
        }
        let analytical = leaf
            .grad()
            .ok_or(GradCheckError::MissingAnalyticalGrad { input_index: i })?;
        let numerical = numerical_grad(&func, inputs, i, epsilon)?;
        compare_grads(i, &analytical, &numerical, atol, rtol)?;
        log::debug!("Gradient check passed for input {} ({} elements)", i, leaf.numel());
    }
    Ok(())
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;

use super::*;
use crate::autograd::{BackwardOp, SavedTensor};
use crate::ops::make_output;
use crate::tensor::{from_vec_f32, from_vec_f64};
use crate::utils::testing::{check_tensor_near, leaf_f64};

#[test]
fn test_numerical_grad_of_square() {
    let x = leaf_f64(vec![1.0, -2.0, 0.5], vec![3]);
    let func = |inputs: &[Tensor]| inputs[0].mul(&inputs[0])?.sum();
    let grad = numerical_grad(func, &[x], 0, DEFAULT_EPSILON).unwrap();
    check_tensor_near(&grad, &[3], &[2.0, -4.0, 1.0], 1e-6);
}

#[test]
fn test_numerical_grad_leaves_inputs_untouched() {
    let x = leaf_f64(vec![1.0, 2.0], vec![2]);
    let func = |inputs: &[Tensor]| inputs[0].exp()?.sum();
    numerical_grad(func, &[x.clone()], 0, DEFAULT_EPSILON).unwrap();
    assert_eq!(x.get_f64_data().unwrap(), vec![1.0, 2.0]);
    assert!(x.grad().is_none());
}

#[test]
fn test_low_precision_is_a_skip() {
    let x = from_vec_f32(vec![1.0], vec![1]).unwrap();
    let func = |inputs: &[Tensor]| inputs[0].sum();
    let err = check_grad(func, &[x], DEFAULT_EPSILON, DEFAULT_ATOL, DEFAULT_RTOL).unwrap_err();
    assert!(err.is_skip());
    assert!(matches!(err, GradCheckError::InsufficientPrecision { input_index: 0, .. }));
}

#[test]
fn test_non_scalar_output_rejected() {
    let x = leaf_f64(vec![1.0, 2.0], vec![2]);
    let func = |inputs: &[Tensor]| inputs[0].mul_scalar(2.0);
    let err = check_grad(func, &[x], DEFAULT_EPSILON, DEFAULT_ATOL, DEFAULT_RTOL).unwrap_err();
    assert!(matches!(err, GradCheckError::NonScalarOutput { .. }));
    assert!(!err.is_skip());
}

#[test]
fn test_untracked_inputs_are_not_compared() {
    let x = leaf_f64(vec![1.0, 2.0], vec![2]);
    let c = from_vec_f64(vec![3.0, 4.0], vec![2]).unwrap();
    let func = |inputs: &[Tensor]| inputs[0].mul(&inputs[1])?.sum();
    check_grad(func, &[x, c], DEFAULT_EPSILON, DEFAULT_ATOL, DEFAULT_RTOL).unwrap();
}

#[test]
fn test_compare_grads_tolerance() {
    let a = from_vec_f64(vec![1.0, 100.0], vec![2]).unwrap();
    let close = from_vec_f64(vec![1.000001, 100.05], vec![2]).unwrap();
    assert!(compare_grads(0, &a, &close, DEFAULT_ATOL, DEFAULT_RTOL).is_ok());
    let far = from_vec_f64(vec![1.1, 100.0], vec![2]).unwrap();
    match compare_grads(0, &a, &far, DEFAULT_ATOL, DEFAULT_RTOL) {
        Err(GradCheckError::GradientMismatch { element_index, mismatched, .. }) => {
            assert_eq!(element_index, 0);
            assert_eq!(mismatched, 1);
        }
        other => panic!("Expected GradientMismatch, got {:?}", other),
    }
}

/// Deliberately wrong derivative: claims d(2x)/dx = 3.
#[derive(Debug)]
struct WrongDoubleBackward {
    input: SavedTensor,
}

impl BackwardOp for WrongDoubleBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        Ok(vec![grad_output.mul_scalar(3.0)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        "wrong_double"
    }
}

fn wrong_double(x: &Tensor) -> Result<Tensor, TensorGradError> {
    let values: Vec<f64> = x.to_f64_vec().iter().map(|v| 2.0 * v).collect();
    let op: Arc<dyn BackwardOp> = Arc::new(WrongDoubleBackward {
        input: SavedTensor::new(x),
    });
    let grad_fn = if x.requires_grad() && crate::autograd::is_grad_enabled() {
        Some(op)
    } else {
        None
    };
    make_output(Buffer::F64(values), x.shape(), x.device(), grad_fn)
}

#[test]
fn test_wrong_derivative_is_caught() {
    let x = leaf_f64(vec![0.5, 1.5], vec![2]);
    let func = |inputs: &[Tensor]| wrong_double(&inputs[0])?.sum();
    let err = check_grad(func, &[x], DEFAULT_EPSILON, DEFAULT_ATOL, DEFAULT_RTOL).unwrap_err();
    match err {
        GradCheckError::GradientMismatch { analytical_grad, numerical_grad, mismatched, .. } => {
            assert!((analytical_grad - 3.0).abs() < 1e-12);
            assert!((numerical_grad - 2.0).abs() < 1e-6);
            assert_eq!(mismatched, 2);
        }
        other => panic!("Expected GradientMismatch, got {:?}", other),
    }
}

#[test]
fn test_numerical_grad_of_implicit_target() -> Result<(), GradCheckError> {
    let w = leaf_f64(vec![1.0, 2.0], vec![2]);
    let x = from_vec_f64(vec![3.0, -1.0], vec![2])?;
    let grad = numerical_grad_of(&w, || w.mul(&x)?.mul(&w)?.sum(), DEFAULT_EPSILON)?;
    check_tensor_near(&grad, &[2], &[6.0, -4.0], 1e-6);
    assert_eq!(w.get_f64_data()?, vec![1.0, 2.0]);
    Ok(())
}

#[test]
fn test_tensor_errors_convert() {
    let err: GradCheckError = TensorGradError::RequiresGradNotMet.into();
    assert_eq!(err, GradCheckError::TensorError(TensorGradError::RequiresGradNotMet));
}

use super::*;
use crate::autograd::grad_check::{check_grad, DEFAULT_ATOL, DEFAULT_EPSILON, DEFAULT_RTOL};
use crate::ops::reduction::sum_op;
use crate::tensor::from_vec_f32;
use crate::utils::testing::{check_tensor_near, leaf_f64};

fn grad_check_unary(f: fn(&Tensor) -> Result<Tensor, TensorGradError>, data: Vec<f64>) {
    let n = data.len();
    let x = leaf_f64(data, vec![n]);
    let func = move |inputs: &[Tensor]| sum_op(&f(&inputs[0])?, None, false);
    check_grad(func, &[x], DEFAULT_EPSILON, DEFAULT_ATOL, DEFAULT_RTOL).unwrap();
}

#[test]
fn test_exp_forward_f32() {
    let x = from_vec_f32(vec![0.0, 1.0], vec![2]).unwrap();
    let y = exp_op(&x).unwrap();
    check_tensor_near(&y, &[2], &[1.0, std::f64::consts::E], 1e-6);
}

#[test]
fn test_ln_of_non_positive_follows_float_semantics() {
    let x = from_vec_f32(vec![0.0, -1.0], vec![2]).unwrap();
    let y = ln_op(&x).unwrap().to_f64_vec();
    assert!(y[0].is_infinite() && y[0] < 0.0);
    assert!(y[1].is_nan());
}

#[test]
fn test_unary_record_saves_input_and_output() -> Result<(), TensorGradError> {
    let x = leaf_f64(vec![0.5, -0.5], vec![2]);
    let y = tanh_op(&x)?;
    assert_eq!(y.grad_fn().unwrap().name(), "tanh");
    assert_eq!(x.live_uses(), 1);
    sum_op(&y, None, false)?.backward()?;
    let expected: Vec<f64> = [0.5f64, -0.5].iter().map(|v| 1.0 - v.tanh().powi(2)).collect();
    check_tensor_near(&x.grad().unwrap(), &[2], &expected, 1e-12);
    Ok(())
}

#[test]
fn test_abs_gradient_at_zero_is_zero() -> Result<(), TensorGradError> {
    let x = leaf_f64(vec![-2.0, 0.0, 3.0], vec![3]);
    sum_op(&abs_op(&x)?, None, false)?.backward()?;
    check_tensor_near(&x.grad().unwrap(), &[3], &[-1.0, 0.0, 1.0], 1e-12);
    Ok(())
}

#[test]
fn test_exp_grad_check() {
    grad_check_unary(exp_op, vec![-1.0, 0.0, 0.5, 2.0]);
}

#[test]
fn test_ln_grad_check() {
    grad_check_unary(ln_op, vec![0.3, 1.0, 2.5]);
}

#[test]
fn test_sqrt_grad_check() {
    grad_check_unary(sqrt_op, vec![0.25, 1.0, 4.0]);
}

#[test]
fn test_tanh_grad_check() {
    grad_check_unary(tanh_op, vec![-1.5, 0.0, 0.8]);
}

#[test]
fn test_sigmoid_grad_check() {
    grad_check_unary(sigmoid_op, vec![-2.0, 0.1, 3.0]);
}

#[test]
fn test_abs_grad_check_away_from_zero() {
    grad_check_unary(abs_op, vec![-2.0, -0.3, 0.7]);
}

//! Assertion helpers shared by unit and integration tests.

use crate::autograd::grad_check::{compare_grads, DEFAULT_ATOL, DEFAULT_RTOL};
use crate::tensor::Tensor;

/// Checks that `actual` has `expected_shape` and elements within `tolerance` of
/// `expected_data`. Works for both precisions (values are compared as `f64`).
///
/// Panics with the first offending index otherwise.
pub fn check_tensor_near(actual: &Tensor, expected_shape: &[usize], expected_data: &[f64], tolerance: f64) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");
    let actual_data = actual.to_f64_vec();
    assert_eq!(actual_data.len(), expected_data.len(), "Data length mismatch");
    for (i, (a, e)) in actual_data.iter().zip(expected_data).enumerate() {
        if !approx::abs_diff_eq!(*a, *e, epsilon = tolerance) {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, tolerance={:?}",
                i, a, e, tolerance
            );
        }
    }
}

/// Asserts that `tensor` carries a gradient close to `expected` (default grad-check tolerances).
pub fn assert_grad_close(tensor: &Tensor, expected: &Tensor) {
    let grad = tensor.grad().expect("tensor has no gradient");
    if let Err(e) = compare_grads(0, &grad, expected, DEFAULT_ATOL, DEFAULT_RTOL) {
        panic!("{}", e);
    }
}

/// F64 leaf tensor that requires grad.
pub fn leaf_f64(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    let tensor = Tensor::new_f64(data, shape).expect("Failed to create test tensor");
    tensor
        .requires_grad_(true)
        .expect("Failed to mark test tensor as requiring grad");
    tensor
}

/// Installs `env_logger` for the test binary. Safe to call from every test.
#[cfg(test)]
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

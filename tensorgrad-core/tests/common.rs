use tensorgrad_core::autograd::grad_check::{check_grad, DEFAULT_ATOL, DEFAULT_EPSILON, DEFAULT_RTOL};
use tensorgrad_core::error::TensorGradError;
use tensorgrad_core::Tensor;

#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// F64 leaf that requires grad.
#[allow(dead_code)]
pub fn leaf(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    Tensor::new_f64(data, shape)
        .and_then(|t| t.with_requires_grad(true))
        .expect("Test tensor creation failed")
}

/// F64 constant that does not take part in differentiation.
#[allow(dead_code)]
pub fn constant(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    Tensor::new_f64(data, shape).expect("Test tensor creation failed")
}

/// Runs the gradient oracle with the default tolerances and panics on mismatch.
#[allow(dead_code)]
pub fn assert_grads_match<F>(name: &str, func: F, inputs: &[Tensor])
where
    F: Fn(&[Tensor]) -> Result<Tensor, TensorGradError>,
{
    if let Err(e) = check_grad(func, inputs, DEFAULT_EPSILON, DEFAULT_ATOL, DEFAULT_RTOL) {
        panic!("gradient check failed for {}: {}", name, e);
    }
}

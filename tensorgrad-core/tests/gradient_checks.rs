use tensorgrad_core::autograd::grad_check::{check_grad, GradCheckError, DEFAULT_ATOL, DEFAULT_EPSILON, DEFAULT_RTOL};
use tensorgrad_core::tensor::from_vec_f32;
use tensorgrad_core::Tensor;

mod common;
use common::{assert_grads_match, constant, init_logger, leaf};

fn matrix_a() -> Tensor {
    leaf(vec![0.5, -1.2, 0.3, 2.0, -0.7, 1.1], vec![2, 3])
}

fn matrix_b() -> Tensor {
    leaf(vec![1.5, 0.4, -0.9, 0.8, 1.3, -0.2], vec![2, 3])
}

fn positive() -> Tensor {
    leaf(vec![0.5, 1.2, 2.3, 0.9], vec![2, 2])
}


#[test]
fn binary_arithmetic_grads() {
    init_logger();
    assert_grads_match("add", |x| x[0].add(&x[1])?.mul(&x[1])?.sum(), &[matrix_a(), matrix_b()]);
    assert_grads_match("sub", |x| x[0].sub(&x[1])?.mul(&x[0])?.sum(), &[matrix_a(), matrix_b()]);
    assert_grads_match("mul", |x| x[0].mul(&x[1])?.sum(), &[matrix_a(), matrix_b()]);
    assert_grads_match("div", |x| x[0].div(&x[1])?.sum(), &[matrix_a(), leaf(vec![0.5, 1.2, 2.3], vec![3])]);
}

#[test]
fn broadcasting_grads() {
    let column = leaf(vec![0.3, -1.4], vec![2, 1]);
    let row = leaf(vec![0.7, 1.9, -0.6], vec![3]);
    assert_grads_match("mul (2,1) x (3,)", |x| x[0].mul(&x[1])?.exp()?.sum(), &[column.clone(), row.clone()]);
    assert_grads_match("div (2,3) / (2,1)", |x| x[0].div(&x[1])?.sum(), &[matrix_a(), leaf(vec![1.5, -2.5], vec![2, 1])]);
    assert_grads_match("broadcast_to", |x| x[0].broadcast_to(&[4, 3])?.tanh()?.sum(), &[row]);
}

#[test]
fn inplace_grads_on_intermediate_targets() {
    let square = || leaf(vec![0.4, -1.1, 0.8, 1.7], vec![2, 2]);
    assert_grads_match(
        "add_",
        |x| {
            let t = x[0].tanh()?;
            t.add_(&x[1])?;
            t.mul(&t)?.sum()
        },
        &[square(), positive()],
    );
    assert_grads_match(
        "sub_",
        |x| {
            let t = x[0].exp()?;
            t.sub_(&x[1])?;
            t.mul(&x[0])?.sum()
        },
        &[square(), positive()],
    );
    assert_grads_match(
        "mul_",
        |x| {
            let t = x[0].mul_scalar(2.0)?;
            t.mul_(&x[1])?;
            t.tanh()?.sum()
        },
        &[square(), positive()],
    );
    assert_grads_match(
        "div_",
        |x| {
            let t = x[0].add_scalar(1.0)?;
            t.div_(&x[1])?;
            t.pow_scalar(2.0)?.sum()
        },
        &[square(), positive()],
    );
    // Two in-place updates on the same target, the second reading an input again.
    assert_grads_match(
        "mul_ then add_",
        |x| {
            let t = x[0].sigmoid()?;
            t.mul_(&x[1])?;
            t.add_(&x[0])?;
            t.mul(&x[1])?.sum()
        },
        &[square(), positive()],
    );
}

#[test]
fn scalar_and_power_grads() {
    assert_grads_match("add_scalar", |x| x[0].add_scalar(3.0)?.pow_scalar(2.0)?.sum(), &[matrix_a()]);
    assert_grads_match("mul_scalar", |x| x[0].mul_scalar(-2.5)?.exp()?.sum(), &[matrix_a()]);
    assert_grads_match("pow_scalar", |x| x[0].pow_scalar(1.5)?.sum(), &[positive()]);
    assert_grads_match("neg", |x| x[0].neg()?.mul(&x[0])?.sum(), &[matrix_a()]);
}

#[test]
fn elementwise_math_grads() {
    assert_grads_match("exp", |x| x[0].exp()?.sum(), &[matrix_a()]);
    assert_grads_match("ln", |x| x[0].ln()?.sum(), &[positive()]);
    assert_grads_match("sqrt", |x| x[0].sqrt()?.sum(), &[positive()]);
    assert_grads_match("abs", |x| x[0].abs()?.sum(), &[matrix_a()]);
    assert_grads_match("tanh", |x| x[0].tanh()?.sum(), &[matrix_a()]);
    assert_grads_match("sigmoid", |x| x[0].sigmoid()?.sum(), &[matrix_a()]);
}

#[test]
fn activation_grads() {
    assert_grads_match("relu", |x| x[0].relu()?.mul(&x[0])?.sum(), &[matrix_a()]);
    assert_grads_match("leaky_relu", |x| x[0].leaky_relu(0.1)?.sum(), &[matrix_a()]);
    assert_grads_match("elu", |x| x[0].elu(1.0)?.sum(), &[matrix_a()]);
    assert_grads_match("selu", |x| x[0].selu()?.sum(), &[matrix_a()]);
    let weights = constant(vec![1.0, -2.0, 0.5, 3.0, 0.25, -1.0], vec![2, 3]);
    assert_grads_match("softmax", move |x| x[0].softmax(1)?.mul(&weights)?.sum(), &[matrix_a()]);
}

#[test]
fn linalg_grads() {
    let rhs = leaf(vec![0.2, -0.4, 1.0, 0.6, -1.5, 0.9], vec![3, 2]);
    assert_grads_match("matmul", |x| x[0].matmul(&x[1])?.tanh()?.sum(), &[matrix_a(), rhs]);
    assert_grads_match("transpose", |x| x[0].transpose(0, 1)?.matmul(&x[0])?.sum(), &[matrix_a()]);
    let cube = leaf((0..24).map(|v| (v as f64) * 0.1 - 1.0).collect(), vec![2, 3, 4]);
    let weights = constant((0..24).map(|v| (v % 5) as f64).collect(), vec![4, 2, 3]);
    assert_grads_match("permute", move |x| x[0].permute(&[2, 0, 1])?.mul(&weights)?.sum(), &[cube]);
}

#[test]
fn reduction_grads() {
    let weights = constant(vec![1.0, 2.0, 3.0], vec![3]);
    assert_grads_match("sum_axes", move |x| x[0].sum_axes(&[0], false)?.mul(&weights)?.sum(), &[matrix_a()]);
    assert_grads_match("mean", |x| x[0].mean(Some(&[1]), true)?.exp()?.sum(), &[matrix_a()]);
    // Distinct values keep the finite differences away from ties.
    assert_grads_match("max", |x| x[0].max(Some(&[1]), false)?.pow_scalar(2.0)?.sum(), &[matrix_a()]);
    assert_grads_match("min", |x| x[0].min(None, false)?.exp()?.sum(), &[matrix_a()]);
}

#[test]
fn view_grads() {
    let weights = constant(vec![1.0, -1.0, 2.0, 0.5, 3.0, -2.0], vec![3, 2]);
    assert_grads_match("reshape", move |x| x[0].reshape(vec![3, 2])?.mul(&weights)?.sum(), &[matrix_a()]);
    assert_grads_match(
        "concat",
        |x| Tensor::concat(&[x[0].clone(), x[1].clone()], 0)?.exp()?.sum(),
        &[matrix_a(), matrix_b()],
    );
    assert_grads_match("index_select", |x| x[0].index_select(1, &[2, 0, 2])?.exp()?.sum(), &[matrix_a()]);
    assert_grads_match("narrow", |x| x[0].narrow(1, 1, 2)?.exp()?.sum(), &[matrix_a()]);
}

#[test]
fn select_grads() {
    let condition = constant(vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0], vec![2, 3]);
    assert_grads_match(
        "select",
        move |x| condition.select(&x[0], &x[1])?.exp()?.sum(),
        &[matrix_a(), matrix_b()],
    );
}

#[test]
fn single_precision_is_skipped() {
    let x = from_vec_f32(vec![1.0, 2.0], vec![2]).unwrap().with_requires_grad(true).unwrap();
    let err = check_grad(|x| x[0].exp()?.sum(), &[x], DEFAULT_EPSILON, DEFAULT_ATOL, DEFAULT_RTOL)
        .unwrap_err();
    assert!(matches!(err, GradCheckError::InsufficientPrecision { .. }));
    assert!(err.is_skip());
}

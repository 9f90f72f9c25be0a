use super::*;
use crate::types::DType;
use approx::assert_relative_eq;

fn both() -> [&'static dyn Backend; 2] {
    [
        backend_for(StorageDevice::CPU),
        backend_for(StorageDevice::Accelerated),
    ]
}

#[test]
fn test_backend_for_device() {
    assert_eq!(backend_for(StorageDevice::CPU).device(), StorageDevice::CPU);
    assert_eq!(
        backend_for(StorageDevice::Accelerated).device(),
        StorageDevice::Accelerated
    );
}

#[test]
fn test_binary_broadcast_row() {
    let lhs = Buffer::F64(vec![1.0, 2.0, 3.0, 4.0]);
    let rhs = Buffer::F64(vec![10.0, 20.0]);
    for backend in both() {
        let out = backend
            .binary(BinaryOp::Add, &lhs, &[2, 2], &rhs, &[1, 2], &[2, 2])
            .unwrap();
        assert_eq!(out, Buffer::F64(vec![11.0, 22.0, 13.0, 24.0]));
    }
}

#[test]
fn test_binary_broadcast_column_and_rank() {
    // (2, 1) against (3,) broadcasts to (2, 3)
    let lhs = Buffer::F32(vec![1.0, 2.0]);
    let rhs = Buffer::F32(vec![10.0, 20.0, 30.0]);
    let out = CpuBackend
        .binary(BinaryOp::Mul, &lhs, &[2, 1], &rhs, &[3], &[2, 3])
        .unwrap();
    assert_eq!(out, Buffer::F32(vec![10.0, 20.0, 30.0, 20.0, 40.0, 60.0]));
}

#[test]
fn test_binary_mixed_precision_rejected() {
    let lhs = Buffer::F32(vec![1.0]);
    let rhs = Buffer::F64(vec![1.0]);
    let result = CpuBackend.binary(BinaryOp::Add, &lhs, &[1], &rhs, &[1], &[1]);
    assert!(matches!(
        result,
        Err(TensorGradError::DataTypeMismatch { expected: DType::F32, actual: DType::F64, .. })
    ));
}

#[test]
fn test_comparison_yields_mask() {
    let lhs = Buffer::F64(vec![0.2, 0.7, 0.5]);
    let rhs = Buffer::F64(vec![0.5]);
    let out = CpuBackend
        .binary(BinaryOp::Gt, &lhs, &[3], &rhs, &[1], &[3])
        .unwrap();
    assert_eq!(out, Buffer::F64(vec![0.0, 1.0, 0.0]));
}

#[test]
fn test_matmul_2x3_3x2() {
    let a = Buffer::F64(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let b = Buffer::F64(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
    for backend in both() {
        let out = backend.matmul(&a, &b, 2, 3, 2).unwrap();
        assert_eq!(out, Buffer::F64(vec![58.0, 64.0, 139.0, 154.0]));
    }
}

#[test]
fn test_reduce_sum_axes() {
    let input = Buffer::F64(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let rows = CpuBackend.reduce(ReduceOp::Sum, &input, &[2, 3], &[1]);
    assert_eq!(rows.buffer, Buffer::F64(vec![6.0, 15.0]));
    assert!(rows.arg_indices.is_none());

    let cols = CpuBackend.reduce(ReduceOp::Sum, &input, &[2, 3], &[0]);
    assert_eq!(cols.buffer, Buffer::F64(vec![5.0, 7.0, 9.0]));

    let all = CpuBackend.reduce(ReduceOp::Sum, &input, &[2, 3], &[0, 1]);
    assert_eq!(all.buffer, Buffer::F64(vec![21.0]));
}

#[test]
fn test_reduce_max_ties_pick_first() {
    let input = Buffer::F64(vec![3.0, 1.0, 3.0, 2.0, 5.0, 5.0]);
    for backend in both() {
        let reduced = backend.reduce(ReduceOp::Max, &input, &[2, 3], &[1]);
        assert_eq!(reduced.buffer, Buffer::F64(vec![3.0, 5.0]));
        assert_eq!(reduced.arg_indices, Some(vec![0, 4]));
    }
}

#[test]
fn test_reduce_min_over_leading_axis() {
    let input = Buffer::F64(vec![3.0, 1.0, 0.5, 2.0]);
    let reduced = CpuBackend.reduce(ReduceOp::Min, &input, &[2, 2], &[0]);
    assert_eq!(reduced.buffer, Buffer::F64(vec![0.5, 1.0]));
    assert_eq!(reduced.arg_indices, Some(vec![2, 1]));
}

#[test]
fn test_permute_transpose() {
    let input = Buffer::F32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let out = CpuBackend.permute(&input, &[2, 3], &[1, 0]);
    assert_eq!(out, Buffer::F32(vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]));
}

#[test]
fn test_permute_rank3() {
    // shape (2, 1, 2) -> axes (2, 0, 1) gives (2, 2, 1)
    let input = Buffer::F64(vec![1.0, 2.0, 3.0, 4.0]);
    let out = AcceleratedBackend.permute(&input, &[2, 1, 2], &[2, 0, 1]);
    assert_eq!(out, Buffer::F64(vec![1.0, 3.0, 2.0, 4.0]));
}

#[test]
fn test_expand_replicates() {
    let input = Buffer::F64(vec![1.0, 2.0]);
    let out = CpuBackend.expand(&input, &[2, 1], &[2, 3]);
    assert_eq!(out, Buffer::F64(vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]));
    let scalar = CpuBackend.expand(&Buffer::F64(vec![7.0]), &[], &[2]);
    assert_eq!(scalar, Buffer::F64(vec![7.0, 7.0]));
}

#[test]
fn test_unary_values() {
    let input = Buffer::F64(vec![-1.0, 0.0, 2.0]);
    let relu = CpuBackend.unary(UnaryOp::Relu, &input);
    assert_eq!(relu, Buffer::F64(vec![0.0, 0.0, 2.0]));
    let leaky = CpuBackend.unary(UnaryOp::LeakyRelu(0.1), &input);
    assert_eq!(leaky, Buffer::F64(vec![-0.1, 0.0, 2.0]));
    let sigmoid = CpuBackend.unary(UnaryOp::Sigmoid, &input);
    let values = sigmoid.try_get_f64().unwrap();
    assert_relative_eq!(values[1], 0.5);
    assert_relative_eq!(values[2], 1.0 / (1.0 + (-2.0f64).exp()));
}

#[test]
fn test_unary_backward_uses_forward_output() {
    let input = Buffer::F64(vec![0.0, 1.0]);
    let output = CpuBackend.unary(UnaryOp::Exp, &input);
    let grad = Buffer::F64(vec![1.0, 2.0]);
    let dx = CpuBackend
        .unary_backward(UnaryOp::Exp, &input, &output, &grad)
        .unwrap();
    let dx = dx.try_get_f64().unwrap();
    assert_relative_eq!(dx[0], 1.0);
    assert_relative_eq!(dx[1], 2.0 * 1.0f64.exp());
}

#[test]
fn test_abs_and_relu_derivative_zero_at_origin() {
    let input = Buffer::F64(vec![0.0]);
    let grad = Buffer::F64(vec![1.0]);
    for op in [UnaryOp::Abs, UnaryOp::Relu] {
        let output = CpuBackend.unary(op, &input);
        let dx = CpuBackend.unary_backward(op, &input, &output, &grad).unwrap();
        assert_eq!(dx, Buffer::F64(vec![0.0]));
    }
}

#[test]
fn test_backends_bitwise_identical() {
    let n = 257;
    let data: Vec<f64> = (0..n * 3).map(|i| ((i as f64) * 0.37).sin()).collect();
    let weights: Vec<f64> = (0..3 * 5).map(|i| ((i as f64) * 1.3).cos()).collect();
    let lhs = Buffer::F64(data);
    let rhs = Buffer::F64(weights);

    let cpu = CpuBackend;
    let acc = AcceleratedBackend;
    assert_eq!(
        cpu.matmul(&lhs, &rhs, n, 3, 5).unwrap(),
        acc.matmul(&lhs, &rhs, n, 3, 5).unwrap()
    );
    assert_eq!(
        cpu.unary(UnaryOp::Tanh, &lhs),
        acc.unary(UnaryOp::Tanh, &lhs)
    );
    assert_eq!(
        cpu.reduce(ReduceOp::Sum, &lhs, &[n, 3], &[0]),
        acc.reduce(ReduceOp::Sum, &lhs, &[n, 3], &[0])
    );
    assert_eq!(
        cpu.reduce(ReduceOp::Max, &lhs, &[n, 3], &[1]),
        acc.reduce(ReduceOp::Max, &lhs, &[n, 3], &[1])
    );
}

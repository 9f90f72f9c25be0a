use tensorgrad_core::error::TensorGradError;
use tensorgrad_core::utils::testing::check_tensor_near;
use tensorgrad_core::{no_grad, Tensor};

mod common;
use common::{constant, init_logger, leaf};

type InplaceFn = fn(&Tensor, &Tensor) -> Result<(), TensorGradError>;
type BinaryFn = fn(&Tensor, &Tensor) -> Result<Tensor, TensorGradError>;

#[test]
fn fan_out_accumulates() {
    init_logger();
    let x = leaf(vec![1.0, -2.0, 3.0], vec![3]);
    x.add(&x).unwrap().sum().unwrap().backward().unwrap();
    check_tensor_near(&x.grad().unwrap(), &[3], &[2.0, 2.0, 2.0], 1e-12);
}

#[test]
fn broadcast_gradient_is_reduced_to_operand_shape() {
    let a = leaf(vec![1.0, 2.0], vec![2, 1]);
    let b = leaf(vec![3.0, 4.0, 5.0, 6.0], vec![2, 2]);
    a.mul(&b).unwrap().sum().unwrap().backward().unwrap();
    check_tensor_near(&a.grad().unwrap(), &[2, 1], &[7.0, 11.0], 1e-12);
    check_tensor_near(&b.grad().unwrap(), &[2, 2], &[1.0, 1.0, 2.0, 2.0], 1e-12);
}

#[test]
fn reductions_redistribute_gradient() {
    let x = leaf(vec![3.0, 1.0, 3.0, 0.0, 2.0, 2.0], vec![2, 3]);
    x.sum().unwrap().backward().unwrap();
    check_tensor_near(&x.grad().unwrap(), &[2, 3], &[1.0; 6], 1e-12);

    // Ties go to the first occurrence in row-major order.
    let y = leaf(vec![3.0, 1.0, 3.0, 0.0, 2.0, 2.0], vec![2, 3]);
    y.max(Some(&[1]), false).unwrap().sum().unwrap().backward().unwrap();
    check_tensor_near(&y.grad().unwrap(), &[2, 3], &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0], 1e-12);

    let z = leaf(vec![3.0, 1.0, 3.0, 1.0], vec![4]);
    z.min(None, false).unwrap().backward().unwrap();
    check_tensor_near(&z.grad().unwrap(), &[4], &[0.0, 1.0, 0.0, 0.0], 1e-12);
}

#[test]
fn inplace_rejects_shape_growth() {
    let ops: [(&str, InplaceFn); 4] = [
        ("add_", Tensor::add_),
        ("sub_", Tensor::sub_),
        ("mul_", Tensor::mul_),
        ("div_", Tensor::div_),
    ];
    for (name, op) in ops {
        let target = constant(vec![1.0, 2.0], vec![2, 1]);
        let other = constant(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let result = op(&target, &other);
        assert!(
            matches!(result, Err(TensorGradError::ShapeMismatch { .. })),
            "{} returned {:?}",
            name,
            result
        );
        // Nothing was written.
        assert_eq!(target.to_f64_vec(), vec![1.0, 2.0]);

        let unrelated = constant(vec![1.0, 2.0, 3.0], vec![3]);
        assert!(op(&target, &unrelated).is_err(), "{} accepted (2,1) with (3,)", name);
    }
}

#[test]
fn binary_ops_reject_incompatible_shapes() {
    let ops: [(&str, BinaryFn); 4] = [
        ("add", Tensor::add),
        ("sub", Tensor::sub),
        ("mul", Tensor::mul),
        ("div", Tensor::div),
    ];
    let a = leaf(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let b = leaf(vec![1.0, 2.0, 3.0], vec![3]);
    for (name, op) in ops {
        let result = op(&a, &b);
        assert!(
            matches!(result, Err(TensorGradError::BroadcastError { .. })),
            "{} returned {:?}",
            name,
            result
        );
    }
    // Failed calls record nothing.
    assert_eq!(a.live_uses(), 0);
    assert_eq!(b.live_uses(), 0);
}

#[test]
fn repeated_evaluation_gives_identical_gradients() {
    let x = leaf(vec![0.5, -1.5, 2.0, 0.25], vec![2, 2]);
    let w = leaf(vec![1.0, -1.0, 0.5, 2.0], vec![2, 2]);
    let run = || -> Vec<Vec<f64>> {
        x.zero_grad();
        w.zero_grad();
        let y = x.matmul(&w).unwrap().tanh().unwrap().mean(None, false).unwrap();
        y.backward().unwrap();
        vec![x.grad().unwrap().to_f64_vec(), w.grad().unwrap().to_f64_vec()]
    };
    let first = run();
    let second = run();
    assert_eq!(first, second);
}

#[test]
fn repeated_backward_accumulates() {
    let x = leaf(vec![1.0, 2.0], vec![2]);
    let y = x.mul_scalar(3.0).unwrap().sum().unwrap();
    y.backward().unwrap();
    y.backward().unwrap();
    check_tensor_near(&x.grad().unwrap(), &[2], &[6.0, 6.0], 1e-12);
}

#[test]
fn backward_requires_single_element() {
    let x = leaf(vec![1.0, 2.0], vec![2]);
    let y = x.exp().unwrap();
    assert!(matches!(
        y.backward(),
        Err(TensorGradError::BackwardNonScalar { .. })
    ));
    assert!(x.grad().is_none());
}

#[test]
fn no_grad_records_nothing() {
    let x = leaf(vec![1.0, 2.0], vec![2]);
    let y = {
        let _guard = no_grad();
        x.exp().unwrap()
    };
    assert!(!y.requires_grad());
    assert!(y.grad_fn().is_none());
    assert_eq!(x.live_uses(), 0);
}

#[test]
fn inplace_on_saved_tensor_is_rejected() {
    let x = leaf(vec![1.0, 2.0], vec![2]);
    let h = x.mul_scalar(2.0).unwrap();
    let y = h.exp().unwrap();
    let bump = constant(vec![1.0, 1.0], vec![2]);
    assert!(matches!(
        h.add_(&bump),
        Err(TensorGradError::InplaceModification { .. })
    ));
    drop(y);
    // Once the consumer is gone the buffer may be updated.
    h.add_(&bump).unwrap();
    h.sum().unwrap().backward().unwrap();
    check_tensor_near(&x.grad().unwrap(), &[2], &[2.0, 2.0], 1e-12);
}

#[test]
fn detach_stops_gradient() {
    let x = leaf(vec![1.0, 2.0], vec![2]);
    let d = x.mul_scalar(2.0).unwrap().detach();
    assert!(!d.requires_grad());
    let z = x.add(&d).unwrap().sum().unwrap();
    z.backward().unwrap();
    check_tensor_near(&x.grad().unwrap(), &[2], &[1.0, 1.0], 1e-12);
}

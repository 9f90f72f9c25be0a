use super::*;
use crate::autograd::grad_check::{check_grad, DEFAULT_ATOL, DEFAULT_EPSILON, DEFAULT_RTOL};
use crate::tensor::from_vec_f64;
use crate::utils::testing::{check_tensor_near, leaf_f64};

fn square() -> Tensor {
    from_vec_f64(vec![1.0, 2.0, 3.0, 4.0], vec![1, 1, 2, 2]).unwrap()
}

#[test]
fn test_pad_rows_and_columns() {
    let rows = pad_spatial_op(&square(), (1, 0), 0.0).unwrap();
    check_tensor_near(&rows, &[1, 1, 4, 2], &[0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 0.0, 0.0], 0.0);
    let cols = pad_spatial_op(&square(), (0, 1), -1.0).unwrap();
    check_tensor_near(
        &cols,
        &[1, 1, 2, 4],
        &[-1.0, 1.0, 2.0, -1.0, -1.0, 3.0, 4.0, -1.0],
        0.0,
    );
}

#[test]
fn test_dilate_inserts_zeros() {
    let d = dilate_spatial_op(&square(), (2, 2)).unwrap();
    check_tensor_near(
        &d,
        &[1, 1, 3, 3],
        &[1.0, 0.0, 2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 4.0],
        0.0,
    );
    let same = dilate_spatial_op(&square(), (1, 1)).unwrap();
    assert_eq!(same.to_f64_vec(), square().to_f64_vec());
}

#[test]
fn test_unfold_windows() {
    let x = from_vec_f64((1..=9).map(f64::from).collect(), vec![1, 1, 3, 3]).unwrap();
    let p = unfold_op(&x, (2, 2), (1, 1)).unwrap();
    check_tensor_near(
        &p,
        &[1, 2, 2, 1, 2, 2],
        &[
            1.0, 2.0, 4.0, 5.0, 2.0, 3.0, 5.0, 6.0, 4.0, 5.0, 7.0, 8.0, 5.0, 6.0, 8.0, 9.0,
        ],
        0.0,
    );
    let strided = unfold_op(&x, (1, 1), (2, 2)).unwrap();
    check_tensor_near(&strided, &[1, 2, 2, 1, 1, 1], &[1.0, 3.0, 7.0, 9.0], 0.0);
}

#[test]
fn test_unfold_backward_counts_overlaps() -> Result<(), TensorGradError> {
    let x = leaf_f64(vec![0.0; 9], vec![1, 1, 3, 3]);
    unfold_op(&x, (2, 2), (1, 1))?.sum()?.backward()?;
    check_tensor_near(
        &x.grad().unwrap(),
        &[1, 1, 3, 3],
        &[1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0],
        1e-12,
    );
    Ok(())
}

#[test]
fn test_window_errors() {
    assert!(matches!(
        unfold_op(&square(), (3, 1), (1, 1)),
        Err(TensorGradError::InvalidArgument(_))
    ));
    assert!(matches!(
        unfold_op(&square(), (1, 1), (0, 1)),
        Err(TensorGradError::InvalidArgument(_))
    ));
    let flat = from_vec_f64(vec![1.0, 2.0], vec![1, 2]).unwrap();
    assert!(matches!(
        pad_spatial_op(&flat, (1, 1), 0.0),
        Err(TensorGradError::UnsupportedOperation(_))
    ));
}

#[test]
fn test_window_grad_check() {
    let x = leaf_f64((0..18).map(|v| (v as f64) * 0.2 - 1.5).collect(), vec![1, 2, 3, 3]);
    let func = |inputs: &[Tensor]| {
        let padded = pad_spatial_op(&dilate_spatial_op(&inputs[0], (2, 1))?, (1, 1), 0.0)?;
        unfold_op(&padded, (2, 3), (2, 1))?.tanh()?.sum()
    };
    check_grad(func, &[x], DEFAULT_EPSILON, DEFAULT_ATOL, DEFAULT_RTOL).unwrap();
}

use super::*;
use crate::device::StorageDevice;
use crate::types::DType;

#[test]
fn test_zeros_and_ones_default() {
    let z = zeros(&[2, 3]).unwrap();
    assert_eq!(z.shape(), vec![2, 3]);
    assert_eq!(z.dtype(), DType::F32);
    assert_eq!(z.device(), StorageDevice::CPU);
    assert!(z.get_f32_data().unwrap().iter().all(|&v| v == 0.0));
    assert!(!z.requires_grad());

    let o = ones(&[4]).unwrap();
    assert_eq!(o.to_f64_vec(), vec![1.0; 4]);
}

#[test]
fn test_scalar_is_zero_dimensional() {
    let s = scalar(3.5).unwrap();
    assert_eq!(s.shape(), Vec::<usize>::new());
    assert_eq!(s.numel(), 1);
    assert_eq!(s.item().unwrap(), 3.5);
}

#[test]
fn test_with_config_explicit() {
    let config = Config::new(DType::F64, StorageDevice::Accelerated);
    let t = full_with_config(&[2], 7.0, &config).unwrap();
    assert_eq!(t.dtype(), DType::F64);
    assert_eq!(t.device(), StorageDevice::Accelerated);
    assert_eq!(t.get_f64_data().unwrap(), vec![7.0, 7.0]);

    let v = from_vec_with_config(vec![1.0, 2.0], vec![2, 1], &config).unwrap();
    assert_eq!(v.shape(), vec![2, 1]);
    assert_eq!(v.dtype(), DType::F64);
}

#[test]
fn test_like_inherits_dtype_and_device() {
    let config = Config::new(DType::F64, StorageDevice::Accelerated);
    let base = zeros_with_config(&[3, 1], &config).unwrap();
    let o = ones_like(&base).unwrap();
    assert_eq!(o.shape(), vec![3, 1]);
    assert_eq!(o.dtype(), DType::F64);
    assert_eq!(o.device(), StorageDevice::Accelerated);
}

#[test]
fn test_from_vec_length_mismatch() {
    let result = from_vec_f64(vec![1.0, 2.0, 3.0], vec![2, 2]);
    assert!(matches!(
        result,
        Err(TensorGradError::TensorCreationError { data_len: 3, .. })
    ));
}

#[test]
fn test_rand_uniform_seeded_is_reproducible() {
    let a = rand_uniform(&[10], -1.0, 1.0, Some(42)).unwrap();
    let b = rand_uniform(&[10], -1.0, 1.0, Some(42)).unwrap();
    assert_eq!(a.to_f64_vec(), b.to_f64_vec());
    assert!(a.to_f64_vec().iter().all(|&v| (-1.0..1.0).contains(&v)));
}

#[test]
fn test_randn_shape_and_bad_std() {
    let t = randn(&[3, 4], 0.0, 1.0, Some(7)).unwrap();
    assert_eq!(t.shape(), vec![3, 4]);
    assert!(matches!(
        randn(&[2], 0.0, -1.0, Some(7)),
        Err(TensorGradError::InvalidArgument(_))
    ));
}

#[test]
fn test_rand_uniform_empty_range() {
    assert!(rand_uniform(&[2], 1.0, 1.0, None).is_err());
}

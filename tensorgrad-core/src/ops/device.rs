//! Moving tensors between execution backends.

use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::device::StorageDevice;
use crate::error::TensorGradError;
use crate::ops::{make_shared_output, should_track, Operand};
use crate::tensor::Tensor;

/// The gradient is moved back to the device the input lives on.
#[derive(Debug)]
struct ToDeviceBackward {
    input: SavedTensor,
    source: StorageDevice,
}

impl BackwardOp for ToDeviceBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, TensorGradError> {
        Ok(vec![to_device_op(grad_output, self.source)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.tensor().clone()]
    }

    fn name(&self) -> &'static str {
        "to_device"
    }
}

/// Returns `input` stored on `device`. Both backends keep host-addressable
/// buffers, so the data itself is shared; only the executing backend changes.
///
/// Moving to the current device returns the same tensor handle.
pub fn to_device_op(input: &Tensor, device: StorageDevice) -> Result<Tensor, TensorGradError> {
    let operand = Operand::of(input);
    if operand.device == device {
        return Ok(input.clone());
    }
    log::debug!("Moving tensor of shape {:?} from {:?} to {:?}", operand.shape, operand.device, device);
    let grad_fn: Option<Arc<dyn BackwardOp>> = if should_track(&[input]) {
        Some(Arc::new(ToDeviceBackward {
            input: SavedTensor::new(input),
            source: operand.device,
        }))
    } else {
        None
    };
    Ok(make_shared_output(operand.buffer, operand.shape, device, grad_fn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::arithmetic::mul_op;
    use crate::ops::reduction::sum_op;
    use crate::utils::testing::{check_tensor_near, leaf_f64};

    #[test]
    fn test_to_device_round_trip_gradient() -> Result<(), TensorGradError> {
        let x = leaf_f64(vec![1.0, 2.0, 3.0], vec![3]);
        let moved = to_device_op(&x, StorageDevice::Accelerated)?;
        assert_eq!(moved.device(), StorageDevice::Accelerated);
        sum_op(&mul_op(&moved, &moved)?, None, false)?.backward()?;
        let grad = x.grad().unwrap();
        assert_eq!(grad.device(), StorageDevice::CPU);
        check_tensor_near(&grad, &[3], &[2.0, 4.0, 6.0], 1e-12);
        Ok(())
    }

    #[test]
    fn test_to_same_device_is_same_handle() {
        let x = leaf_f64(vec![1.0], vec![1]);
        let y = to_device_op(&x, StorageDevice::CPU).unwrap();
        assert!(y.ptr_eq(&x));
    }

    #[test]
    fn test_mixed_devices_rejected() {
        let x = leaf_f64(vec![1.0], vec![1]);
        let y = to_device_op(&x, StorageDevice::Accelerated).unwrap();
        assert!(matches!(
            mul_op(&x, &y),
            Err(TensorGradError::DeviceMismatch { .. })
        ));
    }
}

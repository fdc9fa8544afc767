use candle_core::Device;
use tracing::info;

/// Picks the device the forward pass runs on.
///
/// With the `cuda` or `metal` feature enabled the first GPU is used when one
/// is present, unless `force_cpu` is set.  Falls back to the CPU otherwise.
pub fn get_device(force_cpu: bool) -> Device {
    if !force_cpu {
        #[cfg(feature = "cuda")]
        {
            if let Ok(device) = Device::new_cuda(0) {
                info!("Using CUDA device for inference");
                return device;
            }
        }

        #[cfg(feature = "metal")]
        {
            if let Ok(device) = Device::new_metal(0) {
                info!("Using Metal device for inference");
                return device;
            }
        }
    }

    info!("Using CPU for inference");
    Device::Cpu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_cpu_is_honoured() {
        assert!(matches!(get_device(true), Device::Cpu));
    }
}

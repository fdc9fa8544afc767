//! Reading pretrained style weights and building the network from them.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use tracing::debug;

use crate::error::{Error, Result};
use crate::network::TransformerNet;

/// Local file header signature that opens every zip archive.
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// True if the file at `path` starts with the zip signature.  Checkpoints
/// written by `torch.save` since PyTorch 1.6 are zip archives; older ones are
/// a bare pickle stream.
pub fn is_zip_checkpoint(path: &Path) -> Result<bool> {
    let mut magic = Vec::with_capacity(ZIP_MAGIC.len());
    File::open(path)?.take(ZIP_MAGIC.len() as u64).read_to_end(&mut magic)?;
    Ok(magic == ZIP_MAGIC)
}

/// Reads every tensor from a `.pth`/`.pt` PyTorch checkpoint or a
/// `.safetensors` file onto `device`.
///
/// Only zip-format PyTorch checkpoints can be read; legacy ones fail with
/// `Error::LegacyCheckpoint`.
pub fn read_weights(path: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let load_err = |source: candle_core::Error| Error::ModelLoad { path: path.to_path_buf(), source };

    match ext {
        "pth" | "pt" => {
            if !is_zip_checkpoint(path)? {
                return Err(Error::LegacyCheckpoint { path: path.to_path_buf() });
            }
            let tensors = candle_core::pickle::read_all(path).map_err(load_err)?;
            tensors
                .into_iter()
                .map(|(name, t)| t.to_device(device).map(|t| (name, t)).map_err(load_err))
                .collect()
        }
        "safetensors" => candle_core::safetensors::load(path, device).map_err(load_err),
        _ => Err(Error::UnsupportedWeights { path: path.to_path_buf() }),
    }
}

/// True for `in<N>.running_mean` / `in<N>.running_var` keys.
///
/// Older PyTorch versions saved running statistics for instance-norm layers;
/// the network does not use them.
pub fn is_running_stat(key: &str) -> bool {
    let prefix = match key
        .strip_suffix(".running_mean")
        .or_else(|| key.strip_suffix(".running_var"))
    {
        Some(p) => p,
        None => return false,
    };
    let without_digits = prefix.trim_end_matches(|c: char| c.is_ascii_digit());
    without_digits.len() < prefix.len() && without_digits.ends_with("in")
}

/// Drops instance-norm running statistics from a state dict.
pub fn strip_running_stats(mut tensors: HashMap<String, Tensor>) -> HashMap<String, Tensor> {
    let before = tensors.len();
    tensors.retain(|key, _| !is_running_stat(key));
    if tensors.len() != before {
        debug!("stripped {} running-stat entries", before - tensors.len());
    }
    tensors
}

/// Loads the weight file at `path` and builds a `TransformerNet` from it.
pub fn load_style_model(path: &Path, device: &Device) -> Result<TransformerNet> {
    let tensors = strip_running_stats(read_weights(path, device)?);
    debug!("{} tensors read from {}", tensors.len(), path.display());

    let vb = VarBuilder::from_tensors(tensors, DType::F32, device);
    TransformerNet::new(vb).map_err(|source| Error::ModelLoad { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn running_stat_keys_match() {
        assert!(is_running_stat("in1.running_mean"));
        assert!(is_running_stat("res3.in2.running_var"));
        assert!(is_running_stat("in12.running_var"));
    }

    #[test]
    fn other_keys_are_kept() {
        assert!(!is_running_stat("in1.weight"));
        assert!(!is_running_stat("conv1.conv2d.weight"));
        assert!(!is_running_stat("in.running_mean"));
        assert!(!is_running_stat("bn1.running_mean"));
        assert!(!is_running_stat("in1.running_mean.extra"));
    }

    #[test]
    fn strip_leaves_parameters() {
        let dev = Device::Cpu;
        let t = Tensor::zeros(2, DType::F32, &dev).unwrap();
        let map = HashMap::from([
            ("in1.weight".to_string(), t.clone()),
            ("in1.running_mean".to_string(), t.clone()),
            ("res1.in2.running_var".to_string(), t),
        ]);
        let kept = strip_running_stats(map);
        assert_eq!(kept.len(), 1);
        assert!(kept.contains_key("in1.weight"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candy.onnx");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            read_weights(&path, &Device::Cpu),
            Err(Error::UnsupportedWeights { .. })
        ));
    }

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    #[test]
    fn legacy_checkpoint_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("udnie.pth");
        // Pre-1.6 torch.save output starts with the pickled magic number.
        std::fs::write(&path, b"\x80\x02\x8a\x0al\xfc\x9cF\xf9 j\xa8P\x19.").unwrap();
        let err = read_weights(&path, &Device::Cpu).unwrap_err();
        assert!(matches!(err, Error::LegacyCheckpoint { .. }));
        assert!(err.to_string().contains(".safetensors"));
    }

    #[test]
    fn short_checkpoint_is_not_zip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.pt");
        std::fs::write(&path, b"PK").unwrap();
        assert!(!is_zip_checkpoint(&path).unwrap());
        assert!(matches!(read_weights(&path, &Device::Cpu), Err(Error::LegacyCheckpoint { .. })));
    }

    #[test]
    fn zip_checkpoint_is_read_and_stripped() {
        let path = fixture("instance_norm.pth");
        assert!(is_zip_checkpoint(&path).unwrap());

        let tensors = read_weights(&path, &Device::Cpu).unwrap();
        assert_eq!(tensors.len(), 4);
        let weight: Vec<f32> = tensors["in1.weight"].to_vec1().unwrap();
        assert_eq!(weight, vec![1.0, 2.0]);
        let bias: Vec<f32> = tensors["in1.bias"].to_vec1().unwrap();
        assert_eq!(bias, vec![0.5, -0.5]);

        let mut kept: Vec<String> = strip_running_stats(tensors).into_keys().collect();
        kept.sort();
        assert_eq!(kept, vec!["in1.bias", "in1.weight"]);
    }

    #[test]
    fn incomplete_weights_fail_to_build() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.safetensors");
        let dev = Device::Cpu;
        let tensors = HashMap::from([(
            "conv1.conv2d.weight".to_string(),
            Tensor::zeros((32, 3, 9, 9), DType::F32, &dev).unwrap(),
        )]);
        candle_core::safetensors::save(&tensors, &path).unwrap();
        assert!(matches!(load_style_model(&path, &dev), Err(Error::ModelLoad { .. })));
    }
}

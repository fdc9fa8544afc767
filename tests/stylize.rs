use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use image::{GenericImageView, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

use ferrite_style::codec::{decode_base64, encode_base64, strip_data_uri, to_data_uri};
use ferrite_style::{Error, StyleLibrary, StylizeConfig, Stylizer, TransformerNet};

/// Writes a randomly initialised network to `<dir>/<name>.safetensors`,
/// optionally with stale instance-norm running statistics mixed in.
fn write_style(dir: &Path, name: &str, with_running_stats: bool) {
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    TransformerNet::new(vb).unwrap();

    let mut tensors: HashMap<String, Tensor> = varmap
        .data()
        .lock()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), v.as_tensor().clone()))
        .collect();
    if with_running_stats {
        let zeros = Tensor::zeros(32, DType::F32, &Device::Cpu).unwrap();
        tensors.insert("in1.running_mean".into(), zeros.clone());
        tensors.insert("in1.running_var".into(), zeros);
    }
    candle_core::safetensors::save(&tensors, dir.join(format!("{name}.safetensors"))).unwrap();
}

fn stylizer(dir: &Path) -> Stylizer {
    // Small network resolution keeps the forward pass quick.
    let config = StylizeConfig { image_size: 16, ..StylizeConfig::default() };
    Stylizer::new(StyleLibrary::new(dir), Device::Cpu, config).unwrap()
}

fn png_base64(width: u32, height: u32) -> String {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 10) as u8, (y * 20) as u8, 128]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    encode_base64(buf.get_ref())
}

#[test]
fn output_matches_input_dimensions() {
    let dir = TempDir::new().unwrap();
    write_style(dir.path(), "mosaic", false);

    let out = stylizer(dir.path()).stylize_image(&png_base64(20, 12), "mosaic").unwrap();
    let jpeg = decode_base64(&out).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    let img = image::load_from_memory(&jpeg).unwrap();
    assert_eq!(img.dimensions(), (20, 12));
}

#[test]
fn accepts_data_uri_and_running_stats() {
    let dir = TempDir::new().unwrap();
    write_style(dir.path(), "candy", true);

    let uri = to_data_uri("image/png", &png_base64(9, 14));
    let out = stylizer(dir.path()).stylize_image(&uri, "candy").unwrap();
    let img = image::load_from_memory(&decode_base64(strip_data_uri(&out)).unwrap()).unwrap();
    assert_eq!(img.dimensions(), (9, 14));
}

#[test]
fn unknown_style_fails() {
    let dir = TempDir::new().unwrap();
    write_style(dir.path(), "mosaic", false);

    let err = stylizer(dir.path()).stylize_image(&png_base64(8, 8), "udnie").unwrap_err();
    assert!(matches!(err, Error::UnknownStyle { .. }));
}

#[test]
fn undecodable_image_fails_before_loading_weights() {
    let dir = TempDir::new().unwrap();
    // No weight files at all: the image error must surface first.
    let err = stylizer(dir.path())
        .stylize_image(&encode_base64(b"plain text, not pixels"), "mosaic")
        .unwrap_err();
    assert!(matches!(err, Error::ImageDecode { .. }));
    assert!(err.is_client_error());
}

#[test]
fn elongated_image_is_refused_before_loading_weights() {
    let dir = TempDir::new().unwrap();
    let err = stylizer(dir.path()).stylize_image(&png_base64(1, 200), "mosaic").unwrap_err();
    assert!(matches!(err, Error::ExtremeAspectRatio { width: 1, height: 200, .. }));
    assert!(err.is_client_error());
}

#[test]
fn invalid_base64_fails() {
    let dir = TempDir::new().unwrap();
    let err = stylizer(dir.path()).stylize_image("data:image/png;base64,@@@", "mosaic").unwrap_err();
    assert!(matches!(err, Error::InvalidBase64(_)));
}

#[test]
fn library_lists_written_styles() {
    let dir = TempDir::new().unwrap();
    write_style(dir.path(), "rain_princess", false);
    write_style(dir.path(), "candy", false);
    assert_eq!(stylizer(dir.path()).library().list().unwrap(), vec!["candy", "rain_princess"]);
}

use candle_core::{Device, Module};
use image::{DynamicImage, GenericImageView, RgbImage};
use tracing::info;

use crate::codec::{self, check_aspect_ratio, decode_image, encode_jpeg, image_to_tensor,
                   resize_shorter_side, restore_size, tensor_to_image};
use crate::error::Result;
use crate::model::{load_style_model, StyleLibrary};
use crate::network::TransformerNet;
use crate::pipeline::stylize_config::StylizeConfig;

/// Runs the stylization sequence for one request at a time.
///
/// Weights are loaded from the library on every call; nothing is cached
/// between requests.
pub struct Stylizer {
    library: StyleLibrary,
    device: Device,
    config: StylizeConfig,
}

impl Stylizer {
    pub fn new(library: StyleLibrary, device: Device, config: StylizeConfig) -> Result<Stylizer> {
        config.validate()?;
        Ok(Stylizer { library, device, config })
    }

    pub fn library(&self) -> &StyleLibrary {
        &self.library
    }

    pub fn config(&self) -> &StylizeConfig {
        &self.config
    }

    /// Resizes `content`, runs the network and converts the output back to an
    /// image.  The result is at network resolution, not the caller's.
    pub fn stylize(&self, content: &DynamicImage, model: &TransformerNet) -> Result<RgbImage> {
        let resized = resize_shorter_side(content, self.config.image_size)?;
        let input = image_to_tensor(&resized, &self.device)?;
        let output = model.forward(&input)?;
        tensor_to_image(&output)
    }

    /// Stylizes encoded image bytes with the named style and returns JPEG
    /// bytes with the same pixel dimensions as the decoded input.
    pub fn stylize_bytes(&self, bytes: &[u8], style: &str) -> Result<Vec<u8>> {
        info!("Start to load image");
        let content = decode_image(bytes)?;
        let (width, height) = content.dimensions();
        check_aspect_ratio(width, height)?;

        let path = self.library.resolve(style)?;
        info!("Image is loaded, image size {}x{}, start loading model: {}", width, height, path.display());
        let model = load_style_model(&path, &self.device)?;

        info!("Model is loaded, start stylization with style {}", style);
        let stylized = self.stylize(&content, &model)?;
        info!("Stylization is completed");

        let restored = restore_size(stylized, width, height);
        encode_jpeg(&restored, self.config.jpeg_quality)
    }

    /// Base64 in, base64 JPEG out.  `content` may be bare base64 or a data URI.
    pub fn stylize_image(&self, content: &str, style: &str) -> Result<String> {
        let bytes = codec::decode_base64(codec::strip_data_uri(content))?;
        let jpeg = self.stylize_bytes(&bytes, style)?;
        Ok(codec::encode_base64(&jpeg))
    }
}

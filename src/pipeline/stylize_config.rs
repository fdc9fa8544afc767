use serde::Serialize;

use crate::codec::raster::DEFAULT_JPEG_QUALITY;
use crate::error::{Error, Result};

/// Largest accepted `image_size`.
pub const MAX_IMAGE_SIZE: u32 = 4096;

/// Configuration for a `Stylizer`.
///
/// # Fields
/// - `image_size`:   the shorter side of the image is scaled to this many
///                 pixels before the forward pass, 1..=MAX_IMAGE_SIZE
/// - `jpeg_quality`: quality of the returned JPEG, 1..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StylizeConfig {
    pub image_size: u32,
    pub jpeg_quality: u8,
}

impl Default for StylizeConfig {
    fn default() -> Self {
        StylizeConfig { image_size: 512, jpeg_quality: DEFAULT_JPEG_QUALITY }
    }
}

impl StylizeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_IMAGE_SIZE).contains(&self.image_size) {
            return Err(Error::InvalidConfig { name: "image_size", value: self.image_size.to_string() });
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::InvalidConfig { name: "jpeg_quality", value: self.jpeg_quality.to_string() });
        }
        Ok(())
    }
}

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader, RgbImage};
use tracing::debug;

use crate::error::{Error, Result};

/// Quality used by common encoders when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Decodes image bytes (PNG/JPEG/BMP/GIF/WebP), converts to RGB8 and applies
/// the EXIF orientation tag if the container carries one.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|source| Error::ImageDecode { source })?;

    // A corrupt EXIF block should not make an otherwise valid image unusable.
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let img = DynamicImage::from_decoder(decoder).map_err(|source| Error::ImageDecode { source })?;
    if img.width() == 0 || img.height() == 0 {
        return Err(Error::EmptyImage);
    }
    debug!("decoded {}x{} image, orientation {:?}", img.width(), img.height(), orientation);

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    Ok(correct_orientation(rgb, orientation))
}

/// Undoes camera rotation.  Only the pure rotations (EXIF 3, 6 and 8) are
/// handled; mirrored orientations are left as stored.
pub fn correct_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Rotate180 => img.rotate180(),
        Orientation::Rotate90  => img.rotate90(),
        Orientation::Rotate270 => img.rotate270(),
        _                      => img,
    }
}

/// Longest accepted ratio between the longer and the shorter image side.
/// Bounds the network input at `image_size * MAX_ASPECT_RATIO` pixels along
/// its longer side.
pub const MAX_ASPECT_RATIO: u32 = 8;

/// Fails with `ExtremeAspectRatio` when one side of a `width` x `height`
/// image is more than `MAX_ASPECT_RATIO` times the other.
pub fn check_aspect_ratio(width: u32, height: u32) -> Result<()> {
    let (short, long) = if width <= height { (width, height) } else { (height, width) };
    if long as u64 > short as u64 * MAX_ASPECT_RATIO as u64 {
        return Err(Error::ExtremeAspectRatio { width, height, max_ratio: MAX_ASPECT_RATIO });
    }
    Ok(())
}

/// Scales `img` so that its shorter side equals `size`, preserving the aspect
/// ratio.  The longer side is rounded down.
pub fn resize_shorter_side(img: &DynamicImage, size: u32) -> Result<DynamicImage> {
    let (width, height) = img.dimensions();
    check_aspect_ratio(width, height)?;
    let (new_w, new_h) = shorter_side_dims(width, height, size);
    if (new_w, new_h) == (width, height) {
        return Ok(img.clone());
    }
    Ok(img.resize_exact(new_w, new_h, FilterType::Triangle))
}

fn shorter_side_dims(width: u32, height: u32, size: u32) -> (u32, u32) {
    let scale = |long: u32, short: u32| {
        let scaled = size as u64 * long as u64 / short.max(1) as u64;
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    };
    if width <= height {
        (size, scale(height, width))
    } else {
        (scale(width, height), size)
    }
}

/// Resizes the network output back to the caller's original dimensions.
pub fn restore_size(img: RgbImage, width: u32, height: u32) -> RgbImage {
    if img.dimensions() == (width, height) {
        return img;
    }
    image::imageops::resize(&img, width, height, FilterType::CatmullRom)
}

/// Encodes an RGB image as baseline JPEG.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    img.write_with_encoder(encoder)
        .map_err(|source| Error::ImageEncode { source })?;
    Ok(bytes)
}

//! Conversion between RGB images and the normalized NCHW tensors the style
//! networks were trained on.
//!
//! Pixels are scaled to [0, 1] and then standardized per channel with the
//! ImageNet statistics, matching the preprocessing used during training.

use candle_core::{Device, Tensor};
use image::{DynamicImage, Rgb, RgbImage};

use crate::error::Result;

pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Converts an image into a `(1, 3, H, W)` f32 tensor on `device`.
pub fn image_to_tensor(img: &DynamicImage, device: &Device) -> Result<Tensor> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let plane = width as usize * height as usize;

    // Channel-major layout: all R, then all G, then all B.
    let mut data = vec![0f32; 3 * plane];
    for (i, pixel) in rgb.pixels().enumerate() {
        for c in 0..3 {
            let v = f32::from(pixel.0[c]) / 255.0;
            data[c * plane + i] = (v - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        }
    }

    Ok(Tensor::from_vec(data, (1, 3, height as usize, width as usize), device)?)
}

/// Converts a `(1, 3, H, W)` or `(3, H, W)` tensor back into an RGB image.
///
/// Values are de-standardized, scaled to [0, 255], clamped and truncated.
pub fn tensor_to_image(tensor: &Tensor) -> Result<RgbImage> {
    let tensor = if tensor.rank() == 4 { tensor.squeeze(0)? } else { tensor.clone() };
    let (_, height, width) = tensor.dims3()?;
    let data = tensor
        .to_device(&Device::Cpu)?
        .to_dtype(candle_core::DType::F32)?
        .flatten_all()?
        .to_vec1::<f32>()?;

    let plane = height * width;
    let mut img = RgbImage::new(width as u32, height as u32);
    for (i, pixel) in img.pixels_mut().enumerate() {
        *pixel = Rgb([
            denormalize(data[i], 0),
            denormalize(data[plane + i], 1),
            denormalize(data[2 * plane + i], 2),
        ]);
    }
    Ok(img)
}

#[inline]
fn denormalize(value: f32, channel: usize) -> u8 {
    let scaled = (value * IMAGENET_STD[channel] + IMAGENET_MEAN[channel]) * 255.0;
    scaled.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tensor_has_nchw_shape() {
        let img = DynamicImage::new_rgb8(6, 4);
        let t = image_to_tensor(&img, &Device::Cpu).unwrap();
        assert_eq!(t.dims(), &[1, 3, 4, 6]);
    }

    #[test]
    fn black_pixels_map_to_negative_mean_over_std() {
        let img = DynamicImage::new_rgb8(2, 2);
        let t = image_to_tensor(&img, &Device::Cpu).unwrap();
        let values = t.flatten_all().unwrap().to_vec1::<f32>().unwrap();
        for c in 0..3 {
            let expected = -IMAGENET_MEAN[c] / IMAGENET_STD[c];
            assert!((values[c * 4] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn image_survives_round_trip() {
        let mut src = RgbImage::new(3, 2);
        src.put_pixel(0, 0, Rgb([0, 128, 255]));
        src.put_pixel(2, 1, Rgb([17, 200, 90]));
        let t = image_to_tensor(&DynamicImage::ImageRgb8(src.clone()), &Device::Cpu).unwrap();
        let back = tensor_to_image(&t).unwrap();
        assert_eq!(back.dimensions(), (3, 2));
        for (a, b) in src.pixels().zip(back.pixels()) {
            for c in 0..3 {
                // Truncation may lose one step.
                assert!((a.0[c] as i16 - b.0[c] as i16).abs() <= 1);
            }
        }
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(denormalize(100.0, 0), 255);
        assert_eq!(denormalize(-100.0, 2), 0);
    }
}

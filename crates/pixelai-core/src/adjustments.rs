//! Per-pixel tone and color adjustments.
//!
//! - Contrast scales every sample directly (no offset, no midpoint)
//! - Brightness scales the HSV value channel
//! - Saturation scales the HSV saturation channel
//!
//! A factor of `1.0` is the identity for all three. Every result is rounded
//! and clamped to `[0, 255]`.

use crate::color::{from_hsv, to_hsv};
use crate::raster::{saturate_u8, RasterImage};

/// Apply contrast adjustment.
///
/// Formula: `output = clamp(round(factor * input), 0, 255)`, per sample.
///
/// # Example
/// ```
/// use pixelai_core::{adjustments::adjust_contrast, RasterImage};
///
/// let img = RasterImage::from_pixel(1, 1, [200, 200, 200]).unwrap();
/// let out = adjust_contrast(img, 2.0);
/// assert_eq!(out.pixel(0, 0), [255, 255, 255]);
/// ```
pub fn adjust_contrast(mut image: RasterImage, factor: f64) -> RasterImage {
    if factor == 1.0 {
        return image;
    }
    for sample in image.as_bytes_mut() {
        *sample = saturate_u8(factor * f64::from(*sample));
    }
    image
}

/// Apply brightness adjustment by scaling the HSV value channel.
///
/// Hue and saturation are left untouched; the value channel saturates at 255.
pub fn adjust_brightness(image: RasterImage, factor: f64) -> RasterImage {
    let mut hsv = to_hsv(&image);
    hsv.scale_value(factor);
    from_hsv(&hsv)
}

/// Apply saturation adjustment by scaling the HSV saturation channel.
///
/// - Factor below 1 = desaturate toward grayscale
/// - Factor above 1 = increase color intensity
pub fn adjust_saturation(image: RasterImage, factor: f64) -> RasterImage {
    let mut hsv = to_hsv(&image);
    hsv.scale_saturation(factor);
    from_hsv(&hsv)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

//! PNG encoding for pipeline output.
//!
//! PNG is used because it is lossless: every sample written is read back
//! unchanged, so the output carries exactly the pixels the last operation
//! produced.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

use crate::raster::RasterImage;

/// Errors that can occur during PNG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel buffer could not be viewed as an RGB image
    #[error("Invalid pixel data for {width}x{height} image")]
    InvalidPixelData { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode a BGR [`RasterImage`] to PNG bytes (8-bit RGB, single frame).
///
/// # Errors
///
/// Only fails if the buffer cannot be represented, which the
/// [`RasterImage`] invariants rule out, or if the encoder itself errors.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width(), image.height());
    let rgb = image
        .to_rgb_image()
        .ok_or(EncodeError::InvalidPixelData { width, height })?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    let bytes = buffer.into_inner();
    debug!(width, height, len = bytes.len(), "encoded png");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_encode_png_signature() {
        let img = RasterImage::from_pixel(4, 4, [128, 128, 128]).unwrap();
        let bytes = encode_png(&img).unwrap();

        assert_eq!(&bytes[0..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_writes_rgb_order() {
        // Pure blue in BGR order
        let img = RasterImage::from_pixel(1, 1, [255, 0, 0]).unwrap();
        let bytes = encode_png(&img).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().into_rgb8();
        assert_eq!(decoded.into_raw(), vec![0, 0, 255]);
    }

    #[test]
    fn test_encode_png_non_square() {
        let wide = RasterImage::from_pixel(200, 5, [1, 2, 3]).unwrap();
        let tall = RasterImage::from_pixel(5, 200, [1, 2, 3]).unwrap();

        assert!(encode_png(&wide).is_ok());
        assert!(encode_png(&tall).is_ok());
    }

    #[test]
    fn test_encode_png_gradient_round_trip() {
        let (width, height) = (64u32, 32u32);
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 4) as u8);
                data.push((y * 8) as u8);
                data.push(((x + y) * 2) as u8);
            }
        }
        let img = RasterImage::new(width, height, data).unwrap();

        let bytes = encode_png(&img).unwrap();
        assert_eq!(decode(&bytes).unwrap(), img);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

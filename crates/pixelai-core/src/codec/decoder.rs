//! Content-sniffing image decoding.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use thiserror::Error;
use tracing::debug;

use crate::raster::{RasterError, RasterImage};

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not in a recognized image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// Decoding succeeded but produced no pixels.
    #[error("Decoded image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Decode an encoded image into a 3-channel BGR [`RasterImage`].
///
/// The format is detected from the content, never from a file name or a
/// declared content type. Grayscale, alpha and 16-bit inputs are converted
/// to 8-bit color; alpha is dropped.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized,
/// `DecodeError::CorruptedFile` if the data is truncated or malformed, and
/// `DecodeError::EmptyImage` if the result would have zero width or height.
pub fn decode(bytes: &[u8]) -> Result<RasterImage, DecodeError> {
    let (reader, format) = sniff(bytes)?;

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let rgb = img.into_rgb8();
    let (width, height) = rgb.dimensions();
    debug!(?format, width, height, "decoded image");

    RasterImage::from_rgb_image(rgb).map_err(|e| match e {
        RasterError::InvalidDimensions { width, height } => {
            DecodeError::EmptyImage { width, height }
        }
        other => DecodeError::CorruptedFile(other.to_string()),
    })
}

/// Read `(width, height)` from the image header without decoding any pixels.
///
/// # Errors
///
/// Same as [`decode`], except that damage past the header goes unnoticed.
pub fn dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let (reader, _) = sniff(bytes)?;
    reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

fn sniff(bytes: &[u8]) -> Result<(ImageReader<Cursor<&[u8]>>, ImageFormat), DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    match reader.format() {
        Some(format) => Ok((reader, format)),
        None => Err(DecodeError::InvalidFormat),
    }
}

//! The in-memory pixel buffer threaded through the pipeline.
//!
//! Samples are stored interleaved, row-major, with the fixed channel order
//! blue, green, red ("BGR"). The decoder swaps channels on the way in and
//! the encoder swaps them back on the way out, so every operation in between
//! sees the same layout.

use thiserror::Error;

/// Number of interleaved channels in a [`RasterImage`].
pub const CHANNELS: usize = 3;

/// Channel offsets within a BGR pixel.
pub const BLUE: usize = 0;
pub const GREEN: usize = 1;
pub const RED: usize = 2;

/// Errors raised when constructing a [`RasterImage`] from raw parts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Buffer length doesn't match `width * height * 3`
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// A 3-channel, 8-bit image in BGR order.
///
/// The invariants (`width > 0`, `height > 0`, `data.len() == width * height * 3`)
/// are checked by every public constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterImage {
    /// Create an image from interleaved BGR samples.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidDimensions { width, height });
        }
        let expected = (width as usize) * (height as usize) * CHANNELS;
        if data.len() != expected {
            return Err(RasterError::InvalidPixelData {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create an image where every pixel has the same BGR value.
    pub fn from_pixel(width: u32, height: u32, bgr: [u8; 3]) -> Result<Self, RasterError> {
        let count = (width as usize) * (height as usize);
        let data = bgr.iter().copied().cycle().take(count * CHANNELS).collect();
        Self::new(width, height, data)
    }

    /// Create an image from interleaved RGB samples, swapping to BGR order.
    pub fn from_rgb(width: u32, height: u32, mut data: Vec<u8>) -> Result<Self, RasterError> {
        swap_red_blue(&mut data);
        Self::new(width, height, data)
    }

    /// Create an image from an `image::RgbImage`, swapping to BGR order.
    pub fn from_rgb_image(img: image::RgbImage) -> Result<Self, RasterError> {
        let (width, height) = img.dimensions();
        Self::from_rgb(width, height, img.into_raw())
    }

    /// Copy the samples out in RGB order.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        swap_red_blue(&mut data);
        data
    }

    /// Convert to an `image::RgbImage`, swapping back to RGB order.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.to_rgb_bytes())
    }

    /// Build an image of the same size from a buffer produced by an operation.
    ///
    /// Operations only ever produce buffers with the source's shape, so the
    /// length is checked in debug builds only.
    pub(crate) fn with_data(&self, data: Vec<u8>) -> Self {
        Self::from_parts(self.width, self.height, data)
    }

    pub(crate) fn from_parts(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert!(width > 0 && height > 0, "Empty raster");
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Interleaved BGR samples.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the image and return its BGR samples.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// BGR value of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = self.index(x as usize, y as usize);
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Sample at `(x, y)` on channel `c`, with coordinates clamped to the
    /// nearest edge pixel (border replication).
    #[inline]
    pub fn sample_replicated(&self, x: isize, y: isize, c: usize) -> u8 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.data[self.index(x, y) + c]
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        (y * self.width as usize + x) * CHANNELS
    }
}

/// Swap the first and third sample of every pixel (RGB <-> BGR).
fn swap_red_blue(data: &mut [u8]) {
    for chunk in data.chunks_exact_mut(CHANNELS) {
        chunk.swap(0, 2);
    }
}

/// Round and saturate a floating-point sample to the 8-bit range.
#[inline]
pub(crate) fn saturate_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let img = RasterImage::new(100, 50, vec![0u8; 100 * 50 * 3]).unwrap();

        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.pixel_count(), 5000);
        assert_eq!(img.as_bytes().len(), 15000);
    }

    #[test]
    fn test_raster_zero_dimensions() {
        let result = RasterImage::new(0, 10, vec![]);
        assert_eq!(
            result,
            Err(RasterError::InvalidDimensions {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn test_raster_wrong_length() {
        let result = RasterImage::new(2, 2, vec![0u8; 11]);
        assert_eq!(
            result,
            Err(RasterError::InvalidPixelData {
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn test_from_pixel_fills_every_pixel() {
        let img = RasterImage::from_pixel(3, 2, [10, 20, 30]).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(img.pixel(x, y), [10, 20, 30]);
            }
        }
    }

    #[test]
    fn test_rgb_conversion_swaps_channels() {
        let rgb = image::RgbImage::from_raw(1, 1, vec![255, 128, 0]).unwrap();
        let img = RasterImage::from_rgb_image(rgb).unwrap();

        // Stored as B, G, R
        assert_eq!(img.pixel(0, 0), [0, 128, 255]);

        let back = img.to_rgb_image().unwrap();
        assert_eq!(back.into_raw(), vec![255, 128, 0]);
        assert_eq!(img.to_rgb_bytes(), vec![255, 128, 0]);
        // The BGR buffer itself is untouched
        assert_eq!(img.as_bytes(), &[0, 128, 255]);
    }

    #[test]
    fn test_sample_replicated_clamps_to_edges() {
        let data = vec![
            1, 1, 1, 2, 2, 2, //
            3, 3, 3, 4, 4, 4,
        ];
        let img = RasterImage::new(2, 2, data).unwrap();

        assert_eq!(img.sample_replicated(-5, -5, 0), 1);
        assert_eq!(img.sample_replicated(10, 0, 1), 2);
        assert_eq!(img.sample_replicated(-1, 7, 2), 3);
        assert_eq!(img.sample_replicated(1, 1, 0), 4);
    }

    #[test]
    fn test_saturate_u8() {
        assert_eq!(saturate_u8(-3.0), 0);
        assert_eq!(saturate_u8(400.0), 255);
        assert_eq!(saturate_u8(149.5), 150);
        assert_eq!(saturate_u8(f64::NAN), 0);
        assert_eq!(saturate_u8(f64::INFINITY), 255);
        assert_eq!(saturate_u8(f64::NEG_INFINITY), 0);
    }
}

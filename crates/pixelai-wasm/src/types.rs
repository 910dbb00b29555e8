//! WASM-compatible wrapper types for image data.
//!
//! JavaScript works in RGB order while the pipeline keeps pixels in BGR, so
//! the wrapper converts at its edges and never exposes the BGR buffer.

use pixelai_core::RasterImage;
use wasm_bindgen::prelude::*;

/// A decoded image held in WASM memory.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`. For previews that apply several
/// operation lists to the same source, keep the image in WASM memory and only
/// extract pixels when needed.
#[wasm_bindgen]
pub struct JsRasterImage {
    inner: RasterImage,
}

#[wasm_bindgen]
impl JsRasterImage {
    /// Create a JsRasterImage from dimensions and RGB pixel data.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the buffer length is not
    /// `width * height * 3`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsRasterImage, JsValue> {
        Self::from_rgb(width, height, pixels).map_err(|e| JsValue::from_str(&e))
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Get the number of bytes in the pixel buffer (width * height * 3)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.as_bytes().len()
    }

    /// Returns RGB pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.to_rgb_bytes()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {}
}

impl JsRasterImage {
    pub(crate) fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, String> {
        RasterImage::from_rgb(width, height, pixels)
            .map(Self::from_raster)
            .map_err(|e| e.to_string())
    }

    pub(crate) fn from_raster(inner: RasterImage) -> Self {
        Self { inner }
    }

    pub(crate) fn raster(&self) -> &RasterImage {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_raster_image_creation() {
        let img = JsRasterImage::from_rgb(100, 50, vec![0u8; 100 * 50 * 3]).unwrap();
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 15000);
    }

    #[test]
    fn test_pixels_are_rgb() {
        let pixels = vec![255u8, 128, 64, 32, 16, 8]; // 2 RGB pixels
        let img = JsRasterImage::from_rgb(2, 1, pixels.clone()).unwrap();

        assert_eq!(img.pixels(), pixels);
        // Stored internally as BGR
        assert_eq!(img.raster().pixel(0, 0), [64, 128, 255]);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = JsRasterImage::from_rgb(2, 2, vec![0u8; 5]).err().unwrap();
        assert!(err.contains("expected 12 bytes"));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(JsRasterImage::from_rgb(0, 0, vec![]).is_err());
    }
}

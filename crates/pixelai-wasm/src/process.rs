//! Pipeline WASM bindings.
//!
//! # Functions
//!
//! - [`process_image`] - Decode, apply an operation list, encode as PNG
//! - [`process_image_with_limits`] - Same, bounded by caller-supplied limits
//! - [`decode_image`] - Decode image bytes into a [`JsRasterImage`]
//! - [`apply_operations`] - Apply an operation list to an in-memory image
//! - [`encode_png`] - Encode an in-memory image as PNG
//!
//! Operation lists are plain JavaScript arrays of `{name, parameters}`
//! objects (`{function, params}` is accepted too).
//!
//! # Example
//!
//! ```typescript
//! import { process_image } from '@pixelai/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const png = process_image(bytes, [
//!   { name: 'adjust_contrast', parameters: { factor: 1.5 } },
//!   { name: 'sharpen', parameters: { factor: 1.0 } },
//! ]);
//! const blob = new Blob([png], { type: 'image/png' });
//! ```

use crate::types::JsRasterImage;
use pixelai_core::{OperationRequest, Pipeline, PipelineLimits};
use wasm_bindgen::prelude::*;

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_operations(operations: JsValue) -> Result<Vec<OperationRequest>, JsValue> {
    serde_wasm_bindgen::from_value(operations).map_err(to_js_error)
}

/// Decode an image, apply `operations` in order, and return PNG bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not an image, or if a recognized
/// operation has missing or non-numeric parameters. Unrecognized operation
/// names are skipped.
#[wasm_bindgen]
pub fn process_image(bytes: &[u8], operations: JsValue) -> Result<Vec<u8>, JsValue> {
    let requests = parse_operations(operations)?;
    Pipeline::new()
        .process(bytes, &requests)
        .map_err(to_js_error)
}

/// Like [`process_image`], but rejects inputs beyond `limits`.
///
/// `limits` is an object with optional `max_input_bytes`, `max_pixels`,
/// `max_kernel_size` and `max_denoise_strength` fields.
#[wasm_bindgen]
pub fn process_image_with_limits(
    bytes: &[u8],
    operations: JsValue,
    limits: JsValue,
) -> Result<Vec<u8>, JsValue> {
    let requests = parse_operations(operations)?;
    let limits: PipelineLimits = serde_wasm_bindgen::from_value(limits).map_err(to_js_error)?;
    Pipeline::with_limits(limits)
        .process(bytes, &requests)
        .map_err(to_js_error)
}

/// Decode image bytes (format detected from content).
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRasterImage, JsValue> {
    pixelai_core::decode(bytes)
        .map(JsRasterImage::from_raster)
        .map_err(to_js_error)
}

/// Apply `operations` to an image, returning a new image.
///
/// The source image is left untouched, so a preview can re-run different
/// operation lists against the same decoded source.
#[wasm_bindgen]
pub fn apply_operations(image: &JsRasterImage, operations: JsValue) -> Result<JsRasterImage, JsValue> {
    let requests = parse_operations(operations)?;
    apply_requests(image, &requests).map_err(|e| JsValue::from_str(&e))
}

/// Encode an image as PNG bytes.
#[wasm_bindgen]
pub fn encode_png(image: &JsRasterImage) -> Result<Vec<u8>, JsValue> {
    pixelai_core::encode_png(image.raster()).map_err(to_js_error)
}

fn apply_requests(image: &JsRasterImage, requests: &[OperationRequest]) -> Result<JsRasterImage, String> {
    let pipeline = Pipeline::new();
    let operations = pipeline.resolve(requests).map_err(|e| e.to_string())?;
    pipeline
        .run(image.raster().clone(), &operations)
        .map(JsRasterImage::from_raster)
        .map_err(|e| e.to_string())
}

//! PixelAI WASM - WebAssembly bindings for the PixelAI image pipeline
//!
//! This crate exposes the pixelai-core pipeline to JavaScript/TypeScript
//! callers.
//!
//! # Module Structure
//!
//! - `process` - Pipeline bindings (process, decode, apply, encode)
//! - `types` - WASM-compatible wrapper type for image data
//!
//! # Usage
//!
//! ```typescript
//! import init, { process_image, supported_operations } from '@pixelai/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! console.log(supported_operations());
//! const png = process_image(bytes, [{ name: 'denoise', parameters: { strength: 10 } }]);
//! ```

use wasm_bindgen::prelude::*;

mod process;
mod types;

// Re-export public types
pub use process::{
    apply_operations, decode_image, encode_png, process_image, process_image_with_limits,
};
pub use types::JsRasterImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Names of every recognized operation, as a JavaScript array of strings.
#[wasm_bindgen]
pub fn supported_operations() -> js_sys::Array {
    pixelai_core::supported_operations()
        .map(JsValue::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}

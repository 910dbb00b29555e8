//! Image codec for the pipeline boundary.
//!
//! This module provides functionality for:
//! - Decoding encoded images (format sniffed from the bytes) into a [`RasterImage`]
//! - Encoding a [`RasterImage`] into PNG, the pipeline's fixed lossless output format
//!
//! Both directions are synchronous and hold no state between calls.
//!
//! [`RasterImage`]: crate::RasterImage

mod decoder;
mod encoder;

pub use decoder::{decode, dimensions, DecodeError};
pub use encoder::{encode_png, EncodeError};

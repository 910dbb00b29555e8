//! PixelAI Core - ordered image adjustment pipeline
//!
//! Decodes an image, folds an ordered list of named operations over it, and
//! re-encodes the result as PNG.
//!
//! # Module Structure
//!
//! - `codec` - Content-sniffed decoding, lossless PNG encoding
//! - `raster` - The BGR pixel buffer threaded through the pipeline
//! - `color` - BGR <-> HSV conversion
//! - `kernel` - Sharpen and motion kernels, 2D correlation
//! - `adjustments` - Contrast, brightness, saturation
//! - `filters` - Sharpen, motion blur
//! - `denoise` - Non-local-means denoising
//! - `operation` - Operation records and their typed resolution
//! - `pipeline` - The decode -> fold -> encode driver
//!
//! # Operations
//!
//! | name | parameters |
//! |---|---|
//! | `adjust_contrast` | `factor` |
//! | `adjust_brightness` | `factor` |
//! | `adjust_saturation` | `factor` |
//! | `sharpen` | `factor` |
//! | `denoise` | `strength` |
//! | `remove_motion_blur` | `size`, `angle` |
//!
//! Any other name is skipped without error.

pub mod adjustments;
pub mod codec;
pub mod color;
pub mod denoise;
pub mod filters;
pub mod kernel;
pub mod operation;
pub mod pipeline;
pub mod raster;

pub use codec::{decode, encode_png, DecodeError, EncodeError};
pub use kernel::{Kernel, KernelError};
pub use operation::{Operation, OperationError, OperationKind, OperationRequest};
pub use pipeline::{process_image, Pipeline, PipelineError, PipelineLimits};
pub use raster::{RasterError, RasterImage};

/// Wire names of every recognized operation, in table order.
pub fn supported_operations() -> impl Iterator<Item = &'static str> {
    OperationKind::ALL.into_iter().map(OperationKind::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_operations() {
        let names: Vec<_> = supported_operations().collect();
        assert_eq!(
            names,
            vec![
                "adjust_contrast",
                "adjust_brightness",
                "adjust_saturation",
                "sharpen",
                "denoise",
                "remove_motion_blur",
            ]
        );
    }
}

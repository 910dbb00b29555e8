//! The decode -> fold -> encode pipeline.
//!
//! # Flow
//!
//! 1. Resolve every [`OperationRequest`] into an [`Operation`] (parameter
//!    errors abort here, before any pixel work)
//! 2. Decode the input bytes
//! 3. Fold the operations over the image, in order
//! 4. Encode the result as PNG
//!
//! The pipeline is all-or-nothing: any error discards the partially
//! processed image. It holds no state between invocations, so separate
//! calls may run concurrently on different threads.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::codec::{decode, dimensions, encode_png, DecodeError, EncodeError};
use crate::operation::{Operation, OperationError, OperationRequest};
use crate::raster::RasterImage;

/// Errors that abort a pipeline invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input bytes are not a decodable image.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A recognized operation has missing or unusable parameters.
    #[error("Invalid operation parameters at step {index}: {source}")]
    InvalidOperationParameters {
        index: usize,
        #[source]
        source: OperationError,
    },

    /// The final image could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The input or a parameter exceeds a configured limit.
    #[error("{what} of {actual} exceeds the limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        actual: f64,
        limit: f64,
    },
}

/// Caller-side bounds on the work a single invocation may do.
///
/// Every field is optional; `None` means unbounded. The default is fully
/// unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineLimits {
    /// Maximum encoded input size in bytes
    pub max_input_bytes: Option<usize>,
    /// Maximum decoded pixel count (width * height)
    pub max_pixels: Option<usize>,
    /// Maximum `remove_motion_blur` kernel size
    pub max_kernel_size: Option<usize>,
    /// Maximum `denoise` strength
    pub max_denoise_strength: Option<f64>,
}

impl PipelineLimits {
    /// No limits at all.
    pub fn unbounded() -> Self {
        Self::default()
    }

    fn check_input_bytes(&self, len: usize) -> Result<(), PipelineError> {
        check("input bytes", len as f64, self.max_input_bytes.map(|m| m as f64))
    }

    /// Check the header dimensions so oversized images are rejected before
    /// any pixel buffer is allocated.
    fn check_pixels(&self, bytes: &[u8]) -> Result<(), PipelineError> {
        let Some(limit) = self.max_pixels else {
            return Ok(());
        };
        let (width, height) = dimensions(bytes)?;
        let count = (width as u64) * (height as u64);
        check("pixel count", count as f64, Some(limit as f64))
    }

    fn check_operation(&self, op: &Operation) -> Result<(), PipelineError> {
        match op {
            Operation::MotionBlur(p) => check(
                "motion kernel size",
                p.size as f64,
                self.max_kernel_size.map(|m| m as f64),
            ),
            Operation::Denoise(p) => check(
                "denoise strength",
                p.strength,
                self.max_denoise_strength,
            ),
            _ => Ok(()),
        }
    }
}

fn check(what: &'static str, actual: f64, limit: Option<f64>) -> Result<(), PipelineError> {
    match limit {
        Some(limit) if actual > limit => Err(PipelineError::LimitExceeded {
            what,
            actual,
            limit,
        }),
        _ => Ok(()),
    }
}

/// A configured image pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    limits: PipelineLimits,
}

impl Pipeline {
    /// Create a pipeline with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline that enforces `limits`.
    pub fn with_limits(limits: PipelineLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &PipelineLimits {
        &self.limits
    }

    /// Resolve every request, failing on the first unusable one.
    pub fn resolve(&self, requests: &[OperationRequest]) -> Result<Vec<Operation>, PipelineError> {
        requests
            .iter()
            .enumerate()
            .map(|(index, request)| -> Result<Operation, PipelineError> {
                let op = Operation::resolve(request)
                    .map_err(|source| PipelineError::InvalidOperationParameters { index, source })?;
                self.limits.check_operation(&op)?;
                Ok(op)
            })
            .collect()
    }

    /// Fold resolved operations over an image, in order.
    pub fn run(
        &self,
        image: RasterImage,
        operations: &[Operation],
    ) -> Result<RasterImage, PipelineError> {
        operations
            .iter()
            .enumerate()
            .try_fold(image, |image, (index, op)| {
                debug!(index, operation = op.name(), "applying operation");
                image
                    .apply(op)
                    .map_err(|source| PipelineError::InvalidOperationParameters { index, source })
            })
    }

    /// Decode `bytes`, apply `requests` in order, and encode the result as PNG.
    ///
    /// # Errors
    ///
    /// - `PipelineError::InvalidOperationParameters` if a recognized
    ///   operation's parameters are missing or unusable
    /// - `PipelineError::Decode` if the bytes are not an image
    /// - `PipelineError::LimitExceeded` if a configured limit is hit
    /// - `PipelineError::Encode` if the output cannot be written
    #[instrument(skip_all, fields(input_size = bytes.len(), operations = requests.len()))]
    pub fn process(
        &self,
        bytes: &[u8],
        requests: &[OperationRequest],
    ) -> Result<Vec<u8>, PipelineError> {
        self.limits.check_input_bytes(bytes.len())?;
        let operations = self.resolve(requests)?;

        self.limits.check_pixels(bytes)?;
        let image = decode(bytes)?;

        let image = self.run(image, &operations)?;
        let encoded = encode_png(&image)?;

        debug!(
            width = image.width(),
            height = image.height(),
            output_size = encoded.len(),
            "pipeline complete"
        );
        Ok(encoded)
    }
}

/// Run the pipeline with no limits.
///
/// # Example
/// ```ignore
/// use pixelai_core::{process_image, OperationRequest};
///
/// let png = std::fs::read("photo.png").unwrap();
/// let ops = vec![OperationRequest::new("adjust_contrast").with_param("factor", 1.5)];
/// let out = process_image(&png, &ops).unwrap();
/// ```
pub fn process_image(bytes: &[u8], requests: &[OperationRequest]) -> Result<Vec<u8>, PipelineError> {
    Pipeline::new().process(bytes, requests)
}

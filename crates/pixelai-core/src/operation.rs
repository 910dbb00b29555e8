//! Operation records and their resolution into typed operations.
//!
//! Callers hand the pipeline loosely-typed [`OperationRequest`]s
//! (`{name, parameters}`). Each request is resolved exactly once into an
//! [`Operation`]: the name selects a variant, and that variant's parameters
//! are read and validated at the same point. After resolution no operation
//! body ever looks up a parameter by key.
//!
//! Names outside the fixed vocabulary resolve to [`Operation::Unknown`],
//! which applies as a no-op.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::adjustments::{adjust_brightness, adjust_contrast, adjust_saturation};
use crate::denoise::denoise;
use crate::filters::{motion_blur, sharpen};
use crate::kernel::KernelError;
use crate::raster::RasterImage;

/// Errors for a recognized operation whose parameters cannot be used.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperationError {
    /// A required parameter key is absent.
    #[error("{operation}: missing required parameter '{parameter}'")]
    MissingParameter {
        operation: &'static str,
        parameter: &'static str,
    },

    /// A required parameter is present but not a number.
    #[error("{operation}: parameter '{parameter}' must be a number")]
    NonNumericParameter {
        operation: &'static str,
        parameter: &'static str,
    },

    /// A numeric parameter is outside the values the operation accepts.
    #[error("{operation}: parameter '{parameter}' = {value} {reason}")]
    ParameterOutOfRange {
        operation: &'static str,
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The motion kernel for these parameters has no weight to normalize.
    #[error("remove_motion_blur: kernel for size {size} at {angle} degrees is degenerate")]
    DegenerateKernel { size: usize, angle: f64 },
}

/// One entry of the pipeline program, as supplied by the caller.
///
/// The legacy upload form used `function` / `params` as keys; both spellings
/// deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    #[serde(alias = "function")]
    pub name: String,
    #[serde(alias = "params", default)]
    pub parameters: Map<String, Value>,
}

impl OperationRequest {
    /// Create a request with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Map::new(),
        }
    }

    /// Add a parameter (builder style).
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// The fixed operation vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Contrast,
    Brightness,
    Saturation,
    Sharpen,
    Denoise,
    MotionBlur,
}

impl OperationKind {
    /// Every recognized operation.
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Contrast,
        OperationKind::Brightness,
        OperationKind::Saturation,
        OperationKind::Sharpen,
        OperationKind::Denoise,
        OperationKind::MotionBlur,
    ];

    /// Look up a wire name. Returns `None` for unrecognized names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "adjust_contrast" => Some(OperationKind::Contrast),
            "adjust_brightness" => Some(OperationKind::Brightness),
            "adjust_saturation" => Some(OperationKind::Saturation),
            "sharpen" => Some(OperationKind::Sharpen),
            "denoise" => Some(OperationKind::Denoise),
            "remove_motion_blur" => Some(OperationKind::MotionBlur),
            _ => None,
        }
    }

    /// The wire name.
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Contrast => "adjust_contrast",
            OperationKind::Brightness => "adjust_brightness",
            OperationKind::Saturation => "adjust_saturation",
            OperationKind::Sharpen => "sharpen",
            OperationKind::Denoise => "denoise",
            OperationKind::MotionBlur => "remove_motion_blur",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastParams {
    pub factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessParams {
    pub factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationParams {
    pub factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharpenParams {
    pub factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenoiseParams {
    pub strength: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionBlurParams {
    /// Kernel side length, at least 1
    pub size: usize,
    /// Blur direction in degrees, counter-clockwise
    pub angle: f64,
}

/// A resolved operation with validated parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Contrast(ContrastParams),
    Brightness(BrightnessParams),
    Saturation(SaturationParams),
    Sharpen(SharpenParams),
    Denoise(DenoiseParams),
    MotionBlur(MotionBlurParams),
    /// An unrecognized name; applying it does nothing.
    Unknown(String),
}

impl Operation {
    /// Resolve a request into a typed operation.
    ///
    /// # Errors
    ///
    /// Returns an `OperationError` if the name is recognized but a required
    /// parameter is missing, not numeric, or out of range. Unrecognized
    /// names are never an error.
    pub fn resolve(request: &OperationRequest) -> Result<Self, OperationError> {
        let Some(kind) = OperationKind::from_name(&request.name) else {
            return Ok(Operation::Unknown(request.name.clone()));
        };

        let params = Params {
            operation: kind.name(),
            values: &request.parameters,
        };

        let op = match kind {
            OperationKind::Contrast => Operation::Contrast(ContrastParams {
                factor: params.number("factor")?,
            }),
            OperationKind::Brightness => Operation::Brightness(BrightnessParams {
                factor: params.number("factor")?,
            }),
            OperationKind::Saturation => Operation::Saturation(SaturationParams {
                factor: params.number("factor")?,
            }),
            OperationKind::Sharpen => Operation::Sharpen(SharpenParams {
                factor: params.number("factor")?,
            }),
            OperationKind::Denoise => Operation::Denoise(DenoiseParams {
                strength: params.number("strength")?,
            }),
            OperationKind::MotionBlur => Operation::MotionBlur(MotionBlurParams {
                size: params.size("size")?,
                angle: params.number("angle")?,
            }),
        };
        Ok(op)
    }

    /// The recognized kind, or `None` for [`Operation::Unknown`].
    pub fn kind(&self) -> Option<OperationKind> {
        match self {
            Operation::Contrast(_) => Some(OperationKind::Contrast),
            Operation::Brightness(_) => Some(OperationKind::Brightness),
            Operation::Saturation(_) => Some(OperationKind::Saturation),
            Operation::Sharpen(_) => Some(OperationKind::Sharpen),
            Operation::Denoise(_) => Some(OperationKind::Denoise),
            Operation::MotionBlur(_) => Some(OperationKind::MotionBlur),
            Operation::Unknown(_) => None,
        }
    }

    /// Name as it appeared in the request.
    pub fn name(&self) -> &str {
        match self {
            Operation::Unknown(name) => name,
            other => other.kind().map(OperationKind::name).unwrap_or_default(),
        }
    }
}

impl RasterImage {
    /// Apply one operation, consuming this image and returning the result.
    ///
    /// # Errors
    ///
    /// Only `remove_motion_blur` can fail here, when its kernel degenerates
    /// or is too large to allocate.
    pub fn apply(self, op: &Operation) -> Result<RasterImage, OperationError> {
        let out = match op {
            Operation::Contrast(p) => adjust_contrast(self, p.factor),
            Operation::Brightness(p) => adjust_brightness(self, p.factor),
            Operation::Saturation(p) => adjust_saturation(self, p.factor),
            Operation::Sharpen(p) => sharpen(self, p.factor),
            Operation::Denoise(p) => denoise(self, p.strength),
            Operation::MotionBlur(p) => {
                motion_blur(self, p.size, p.angle).map_err(|e| match e {
                    KernelError::InvalidSize(_) => OperationError::ParameterOutOfRange {
                        operation: OperationKind::MotionBlur.name(),
                        parameter: "size",
                        value: p.size as f64,
                        reason: "must be at least 1",
                    },
                    KernelError::TooLarge(_) => OperationError::ParameterOutOfRange {
                        operation: OperationKind::MotionBlur.name(),
                        parameter: "size",
                        value: p.size as f64,
                        reason: "is too large for a kernel",
                    },
                    KernelError::ZeroSum => OperationError::DegenerateKernel {
                        size: p.size,
                        angle: p.angle,
                    },
                })?
            }
            Operation::Unknown(name) => {
                debug!(operation = %name, "skipping unrecognized operation");
                self
            }
        };
        Ok(out)
    }
}

/// Typed accessors over one request's parameter map.
struct Params<'a> {
    operation: &'static str,
    values: &'a Map<String, Value>,
}

impl Params<'_> {
    fn number(&self, key: &'static str) -> Result<f64, OperationError> {
        let value = self
            .values
            .get(key)
            .ok_or(OperationError::MissingParameter {
                operation: self.operation,
                parameter: key,
            })?;
        value.as_f64().ok_or(OperationError::NonNumericParameter {
            operation: self.operation,
            parameter: key,
        })
    }

    /// A whole number of at least 1.
    fn size(&self, key: &'static str) -> Result<usize, OperationError> {
        let value = self.number(key)?;
        if value.fract() != 0.0 {
            return Err(self.out_of_range(key, value, "must be a whole number"));
        }
        if value < 1.0 {
            return Err(self.out_of_range(key, value, "must be at least 1"));
        }
        if value > u32::MAX as f64 {
            return Err(self.out_of_range(key, value, "is too large"));
        }
        Ok(value as usize)
    }

    fn out_of_range(&self, key: &'static str, value: f64, reason: &'static str) -> OperationError {
        OperationError::ParameterOutOfRange {
            operation: self.operation,
            parameter: key,
            value,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> OperationRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_resolve_every_name() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_resolve_contrast() {
        let op = Operation::resolve(&OperationRequest::new("adjust_contrast").with_param("factor", 1.5))
            .unwrap();
        assert_eq!(op, Operation::Contrast(ContrastParams { factor: 1.5 }));
    }

    #[test]
    fn test_resolve_motion_blur() {
        let op = Operation::resolve(&request(json!({
            "name": "remove_motion_blur",
            "parameters": {"size": 15, "angle": 45.0}
        })))
        .unwrap();
        assert_eq!(
            op,
            Operation::MotionBlur(MotionBlurParams {
                size: 15,
                angle: 45.0
            })
        );
    }

    #[test]
    fn test_resolve_accepts_legacy_keys() {
        let op = Operation::resolve(&request(json!({
            "function": "denoise",
            "params": {"strength": 10}
        })))
        .unwrap();
        assert_eq!(op, Operation::Denoise(DenoiseParams { strength: 10.0 }));
    }

    #[test]
    fn test_unknown_name_is_not_an_error() {
        let op = Operation::resolve(&request(json!({"name": "nonexistent"}))).unwrap();
        assert_eq!(op, Operation::Unknown("nonexistent".to_string()));
        assert_eq!(op.kind(), None);
        assert_eq!(op.name(), "nonexistent");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let op = Operation::resolve(&OperationRequest::new("Sharpen").with_param("factor", 1.0))
            .unwrap();
        assert!(matches!(op, Operation::Unknown(_)));
    }

    #[test]
    fn test_missing_parameter() {
        let err = Operation::resolve(&OperationRequest::new("adjust_contrast")).unwrap_err();
        assert_eq!(
            err,
            OperationError::MissingParameter {
                operation: "adjust_contrast",
                parameter: "factor"
            }
        );
        assert_eq!(
            err.to_string(),
            "adjust_contrast: missing required parameter 'factor'"
        );
    }

    #[test]
    fn test_motion_blur_missing_angle() {
        let err = Operation::resolve(
            &OperationRequest::new("remove_motion_blur").with_param("size", 5),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            OperationError::MissingParameter {
                parameter: "angle",
                ..
            }
        ));
    }

    #[test]
    fn test_non_numeric_parameter() {
        let err = Operation::resolve(&request(json!({
            "name": "sharpen",
            "parameters": {"factor": "high"}
        })))
        .unwrap_err();
        assert!(matches!(
            err,
            OperationError::NonNumericParameter {
                parameter: "factor",
                ..
            }
        ));
    }

    #[test]
    fn test_extra_parameters_ignored() {
        let op = Operation::resolve(
            &OperationRequest::new("sharpen")
                .with_param("factor", 0.5)
                .with_param("radius", 3),
        )
        .unwrap();
        assert_eq!(op, Operation::Sharpen(SharpenParams { factor: 0.5 }));
    }

    #[test]
    fn test_fractional_size_rejected() {
        let err = Operation::resolve(
            &OperationRequest::new("remove_motion_blur")
                .with_param("size", 2.5)
                .with_param("angle", 0.0),
        )
        .unwrap_err();
        assert!(matches!(err, OperationError::ParameterOutOfRange { .. }));
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = Operation::resolve(
            &OperationRequest::new("remove_motion_blur")
                .with_param("size", 0)
                .with_param("angle", 0.0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            OperationError::ParameterOutOfRange {
                parameter: "size",
                ..
            }
        ));
    }

    #[test]
    fn test_huge_factor_accepted() {
        let op = Operation::resolve(
            &OperationRequest::new("adjust_contrast").with_param("factor", 1.0e300),
        )
        .unwrap();
        assert_eq!(op, Operation::Contrast(ContrastParams { factor: 1.0e300 }));

        let img = RasterImage::from_pixel(1, 1, [0, 1, 200]).unwrap();
        assert_eq!(img.apply(&op).unwrap().pixel(0, 0), [0, 255, 255]);
    }

    #[test]
    fn test_apply_unknown_is_noop() {
        let img = RasterImage::from_pixel(2, 2, [1, 2, 3]).unwrap();
        let out = img.clone().apply(&Operation::Unknown("blur".into())).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_apply_contrast() {
        let img = RasterImage::from_pixel(2, 2, [100, 100, 100]).unwrap();
        let out = img
            .apply(&Operation::Contrast(ContrastParams { factor: 1.5 }))
            .unwrap();
        assert_eq!(out.pixel(1, 1), [150, 150, 150]);
    }

    #[test]
    fn test_apply_oversized_motion_kernel() {
        let op = Operation::resolve(
            &OperationRequest::new("remove_motion_blur")
                .with_param("size", u32::MAX)
                .with_param("angle", 0.0),
        )
        .unwrap();
        let img = RasterImage::from_pixel(2, 2, [100, 100, 100]).unwrap();
        let err = img.apply(&op).unwrap_err();
        assert!(matches!(
            err,
            OperationError::ParameterOutOfRange {
                parameter: "size",
                reason: "is too large for a kernel",
                ..
            }
        ));
    }

    #[test]
    fn test_apply_degenerate_motion_kernel() {
        let img = RasterImage::from_pixel(2, 2, [100, 100, 100]).unwrap();
        let err = img
            .apply(&Operation::MotionBlur(MotionBlurParams {
                size: 1,
                angle: 90.0,
            }))
            .unwrap_err();
        assert!(matches!(err, OperationError::DegenerateKernel { size: 1, .. }));
    }
}

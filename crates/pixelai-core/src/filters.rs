//! Convolution-based filters: sharpening and directional (motion) blur.

use crate::kernel::{filter_2d, Kernel, KernelError};
use crate::raster::{saturate_u8, RasterImage};

/// Sharpen by blending the original with its edge-enhanced version.
///
/// Formula: `output = (1 - factor) * original + factor * sharpened`, per sample,
/// evaluated as `original + factor * (sharpened - original)` so that samples
/// the kernel leaves unchanged stay unchanged at any factor.
///
/// A factor of `0` or below returns the input untouched without convolving.
/// The factor is not clamped: values above 1 extrapolate past the sharpened
/// image and rely on per-sample saturation.
pub fn sharpen(image: RasterImage, factor: f64) -> RasterImage {
    if factor <= 0.0 {
        return image;
    }

    let sharpened = filter_2d(&image, &Kernel::sharpen());
    let data = image
        .as_bytes()
        .iter()
        .zip(sharpened.as_bytes())
        .map(|(&orig, &sharp)| {
            let orig = f64::from(orig);
            saturate_u8(orig + factor * (f64::from(sharp) - orig))
        })
        .collect();

    image.with_data(data)
}

/// Smear the image along `angle_degrees` with a normalized `size`-long line kernel.
///
/// This is a forward blur (plain correlation), not a deconvolution: it adds
/// motion blur rather than removing it.
///
/// # Errors
///
/// Returns a `KernelError` if the kernel cannot be built (zero size, or the
/// rotated line leaves no weight inside the window).
pub fn motion_blur(
    image: RasterImage,
    size: usize,
    angle_degrees: f64,
) -> Result<RasterImage, KernelError> {
    let kernel = Kernel::motion(size, angle_degrees)?;
    Ok(filter_2d(&image, &kernel))
}

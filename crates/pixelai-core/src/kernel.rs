//! Square convolution kernels and 2D correlation.
//!
//! # Motion Kernel
//!
//! The motion kernel starts as a single horizontal line of ones through the
//! middle row, is rotated about `(size / 2, size / 2)` with bilinear sampling
//! (samples falling outside the kernel read as zero), and is finally
//! normalized so its weights sum to 1.
//!
//! For rotation by angle θ about `(c, c)`, each destination weight samples
//! the source at:
//! ```text
//! src_x =  cos(θ) * (x - c) - sin(θ) * (y - c) + c
//! src_y =  sin(θ) * (x - c) + cos(θ) * (y - c) + c
//! ```
//!
//! # Correlation
//!
//! [`filter_2d`] correlates (it does not flip the kernel) with the anchor at
//! `size / 2`, replicating edge pixels past the border, and saturates each
//! result to 8 bits.

use thiserror::Error;

use crate::raster::{saturate_u8, RasterImage, CHANNELS};

/// Errors raised while building a kernel.
#[derive(Debug, Error, PartialEq)]
pub enum KernelError {
    /// Kernel size must be at least 1
    #[error("Kernel size must be at least 1, got {0}")]
    InvalidSize(usize),

    /// The weight grid for this size cannot be allocated
    #[error("Kernel size {0} is too large to allocate")]
    TooLarge(usize),

    /// All weights vanished (e.g. the rotated line left the kernel window)
    #[error("Kernel weights sum to zero and cannot be normalized")]
    ZeroSum,
}

/// A square matrix of floating-point weights, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Create a kernel from row-major weights.
    pub fn new(size: usize, weights: Vec<f32>) -> Result<Self, KernelError> {
        if size == 0 || size.checked_mul(size) != Some(weights.len()) {
            return Err(KernelError::InvalidSize(size));
        }
        Ok(Self { size, weights })
    }

    /// The 3x3 unit-gain edge-enhancement kernel.
    ///
    /// ```text
    ///  0 -1  0
    /// -1  5 -1
    ///  0 -1  0
    /// ```
    pub fn sharpen() -> Self {
        Self {
            size: 3,
            weights: vec![
                0.0, -1.0, 0.0, //
                -1.0, 5.0, -1.0, //
                0.0, -1.0, 0.0,
            ],
        }
    }

    /// A normalized line kernel of `size x size`, rotated by `angle_degrees`.
    ///
    /// # Errors
    ///
    /// Returns `KernelError::InvalidSize` for `size == 0`,
    /// `KernelError::TooLarge` when `size * size` weights cannot be allocated,
    /// and `KernelError::ZeroSum` when rotation leaves no weight inside the window.
    pub fn motion(size: usize, angle_degrees: f64) -> Result<Self, KernelError> {
        if size == 0 {
            return Err(KernelError::InvalidSize(size));
        }

        let mut line = zeroed(size)?;
        let mid = (size - 1) / 2;
        line[mid * size..(mid + 1) * size].fill(1.0);

        let mut kernel = Self {
            size,
            weights: rotate(&line, size, angle_degrees)?,
        };
        kernel.normalize()?;
        Ok(kernel)
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Weight at column `x`, row `y`.
    pub fn weight(&self, x: usize, y: usize) -> f32 {
        self.weights[y * self.size + x]
    }

    /// Row-major weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Scale the weights so they sum to 1.
    fn normalize(&mut self) -> Result<(), KernelError> {
        let sum = self.sum();
        if sum.abs() <= f32::EPSILON {
            return Err(KernelError::ZeroSum);
        }
        self.weights.iter_mut().for_each(|w| *w /= sum);
        Ok(())
    }

    /// Non-zero taps as `(dx, dy, weight)` offsets from the anchor.
    fn taps(&self) -> Vec<(isize, isize, f32)> {
        let anchor = (self.size / 2) as isize;
        let mut taps = Vec::new();
        for ky in 0..self.size {
            for kx in 0..self.size {
                let w = self.weight(kx, ky);
                if w != 0.0 {
                    taps.push((kx as isize - anchor, ky as isize - anchor, w));
                }
            }
        }
        taps
    }
}

/// A `size x size` grid of zeros, allocated fallibly.
fn zeroed(size: usize) -> Result<Vec<f32>, KernelError> {
    let len = size.checked_mul(size).ok_or(KernelError::TooLarge(size))?;
    let mut weights = Vec::new();
    weights
        .try_reserve_exact(len)
        .map_err(|_| KernelError::TooLarge(size))?;
    weights.resize(len, 0.0);
    Ok(weights)
}

/// Rotate a square weight grid about `(size / 2, size / 2)`.
fn rotate(src: &[f32], size: usize, angle_degrees: f64) -> Result<Vec<f32>, KernelError> {
    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();
    let center = size as f64 / 2.0;

    let mut output = zeroed(size)?;
    for dst_y in 0..size {
        for dst_x in 0..size {
            let dx = dst_x as f64 - center;
            let dy = dst_y as f64 - center;

            let src_x = cos * dx - sin * dy + center;
            let src_y = sin * dx + cos * dy + center;

            output[dst_y * size + dst_x] = sample_bilinear(src, size, src_x, src_y);
        }
    }
    Ok(output)
}

/// Sample a weight grid with bilinear interpolation, reading zero outside.
fn sample_bilinear(src: &[f32], size: usize, x: f64, y: f64) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();

    // Fractional distances
    let fx = x - x0;
    let fy = y - y0;

    let get = |px: f64, py: f64| -> f64 {
        if px < 0.0 || py < 0.0 || px >= size as f64 || py >= size as f64 {
            return 0.0;
        }
        src[py as usize * size + px as usize] as f64
    };

    let v = get(x0, y0) * (1.0 - fx) * (1.0 - fy)
        + get(x0 + 1.0, y0) * fx * (1.0 - fy)
        + get(x0, y0 + 1.0) * (1.0 - fx) * fy
        + get(x0 + 1.0, y0 + 1.0) * fx * fy;

    v as f32
}

/// Correlate every channel of `image` with `kernel`.
///
/// Pixels past the border replicate the nearest edge pixel. Each output
/// sample is rounded and saturated to `[0, 255]`.
pub fn filter_2d(image: &RasterImage, kernel: &Kernel) -> RasterImage {
    let taps = kernel.taps();
    let (width, height) = (image.width() as isize, image.height() as isize);
    let mut output = Vec::with_capacity(image.as_bytes().len());

    for y in 0..height {
        for x in 0..width {
            for c in 0..CHANNELS {
                let sum: f32 = taps
                    .iter()
                    .map(|&(dx, dy, w)| image.sample_replicated(x + dx, y + dy, c) as f32 * w)
                    .sum();
                output.push(saturate_u8(f64::from(sum)));
            }
        }
    }

    image.with_data(output)
}

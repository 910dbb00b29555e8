//! Non-local-means denoising over all three channels jointly.
//!
//! # Algorithm
//!
//! Every output pixel is a weighted average of the pixels in a 21x21 search
//! window around it. The weight of a candidate `q` for target `p` depends on
//! how similar the 7x7 patches around them are:
//!
//! ```text
//! d²(p, q) = mean over patch offsets o and channels c of (I(p+o, c) - I(q+o, c))²
//! w(p, q)  = exp(-d²(p, q) / h²)
//! ```
//!
//! where `h` is the filter strength. Larger `h` flattens the weights toward a
//! plain box average, so smoothing never decreases as strength grows.
//!
//! Patch distances are computed one search offset at a time: the squared
//! difference between the image and its shifted copy is summed into an
//! integral image, and each 7x7 patch distance is then a four-corner lookup.
//! Pixels past the border replicate the nearest edge pixel.

use crate::raster::{saturate_u8, RasterImage, CHANNELS};

/// Side length of the similarity patch.
pub const TEMPLATE_WINDOW: usize = 7;

/// Side length of the window searched for similar patches.
pub const SEARCH_WINDOW: usize = 21;

/// Denoise with the given filter strength.
///
/// A strength of `0` or below returns the input untouched.
pub fn denoise(image: RasterImage, strength: f64) -> RasterImage {
    if strength <= 0.0 {
        return image;
    }
    denoise_with_windows(&image, strength, TEMPLATE_WINDOW, SEARCH_WINDOW)
}

fn denoise_with_windows(
    image: &RasterImage,
    strength: f64,
    template_window: usize,
    search_window: usize,
) -> RasterImage {
    let r = template_window / 2;
    let big_r = search_window / 2;
    let pad = r + big_r;

    let (w, h) = (image.width() as usize, image.height() as usize);
    let padded = Padded::new(image, pad);

    // Patch-center grid: image pixels plus a template radius on each side
    let gw = w + 2 * r;
    let gh = h + 2 * r;
    let stride = gw + 1;
    let mut integral = vec![0.0f64; stride * (gh + 1)];

    let norm = (template_window * template_window * CHANNELS) as f64;
    let h2 = strength * strength;

    let mut acc = vec![0.0f64; w * h * CHANNELS];
    let mut weight_sum = vec![0.0f64; w * h];

    for dy in -(big_r as isize)..=(big_r as isize) {
        for dx in -(big_r as isize)..=(big_r as isize) {
            // Integral image of squared differences between the image and
            // its copy shifted by (dx, dy)
            for gy in 0..gh {
                let mut row_sum = 0.0f64;
                for gx in 0..gw {
                    // Grid (gx, gy) sits at image point (gx - r, gy - r)
                    let px = (gx + big_r) as isize;
                    let py = (gy + big_r) as isize;
                    let a = padded.pixel(px, py);
                    let b = padded.pixel(px + dx, py + dy);
                    let d: f64 = a
                        .iter()
                        .zip(b)
                        .map(|(&x, &y)| {
                            let diff = x as f64 - y as f64;
                            diff * diff
                        })
                        .sum();
                    row_sum += d;
                    integral[(gy + 1) * stride + gx + 1] = integral[gy * stride + gx + 1] + row_sum;
                }
            }

            for y in 0..h {
                for x in 0..w {
                    // Patch around image (x, y) spans grid [x, x + 2r] x [y, y + 2r]
                    let x1 = x + 2 * r + 1;
                    let y1 = y + 2 * r + 1;
                    let dist = integral[y1 * stride + x1] - integral[y * stride + x1]
                        - integral[y1 * stride + x]
                        + integral[y * stride + x];

                    let weight = (-(dist / norm) / h2).exp();
                    let q = padded.pixel((x + pad) as isize + dx, (y + pad) as isize + dy);

                    let idx = y * w + x;
                    weight_sum[idx] += weight;
                    for c in 0..CHANNELS {
                        acc[idx * CHANNELS + c] += weight * q[c] as f64;
                    }
                }
            }
        }
    }

    let data = acc
        .chunks_exact(CHANNELS)
        .zip(weight_sum.iter())
        .flat_map(|(sums, &total)| sums.iter().map(move |s| saturate_u8(s / total)))
        .collect();

    image.with_data(data)
}

/// An edge-replicated copy of an image with `pad` extra pixels on each side.
struct Padded {
    width: usize,
    data: Vec<u8>,
}

impl Padded {
    fn new(image: &RasterImage, pad: usize) -> Self {
        let width = image.width() as usize + 2 * pad;
        let height = image.height() as usize + 2 * pad;
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                for c in 0..CHANNELS {
                    let sx = x as isize - pad as isize;
                    let sy = y as isize - pad as isize;
                    data.push(image.sample_replicated(sx, sy, c));
                }
            }
        }
        Self { width, data }
    }

    #[inline]
    fn pixel(&self, x: isize, y: isize) -> &[u8] {
        let idx = (y as usize * self.width + x as usize) * CHANNELS;
        &self.data[idx..idx + CHANNELS]
    }
}

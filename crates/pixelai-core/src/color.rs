//! BGR <-> HSV conversion.
//!
//! Hue is kept in floating point (degrees, `[0, 360)`) while saturation and
//! value are quantized to 8 bits, both scaled to `[0, 255]`. With hue kept
//! exact, a conversion round-trip reproduces every sample within ±1.
//!
//! Scaling a plane rounds and clamps the result back into 8 bits, so pushing
//! a value past 255 (or below 0) is not undone by scaling back.

use crate::raster::{saturate_u8, RasterImage, BLUE, CHANNELS, GREEN, RED};

/// An image split into hue, saturation and value planes.
#[derive(Debug, Clone, PartialEq)]
pub struct HsvPlanes {
    width: u32,
    height: u32,
    /// Hue in degrees, `[0, 360)`
    pub hue: Vec<f32>,
    /// Saturation, `[0, 255]`
    pub saturation: Vec<u8>,
    /// Value, `[0, 255]`
    pub value: Vec<u8>,
}

impl HsvPlanes {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Multiply the saturation plane by `factor`, saturating to `[0, 255]`.
    pub fn scale_saturation(&mut self, factor: f64) {
        scale_plane(&mut self.saturation, factor);
    }

    /// Multiply the value plane by `factor`, saturating to `[0, 255]`.
    pub fn scale_value(&mut self, factor: f64) {
        scale_plane(&mut self.value, factor);
    }
}

fn scale_plane(plane: &mut [u8], factor: f64) {
    for v in plane.iter_mut() {
        *v = saturate_u8(f64::from(*v) * factor);
    }
}

/// Split a BGR image into HSV planes.
pub fn to_hsv(image: &RasterImage) -> HsvPlanes {
    let count = image.pixel_count();
    let mut hue = Vec::with_capacity(count);
    let mut saturation = Vec::with_capacity(count);
    let mut value = Vec::with_capacity(count);

    for px in image.as_bytes().chunks_exact(CHANNELS) {
        let b = px[BLUE] as f32;
        let g = px[GREEN] as f32;
        let r = px[RED] as f32;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        // Ensure h is in the range [0, 360)
        let h = if h < 0.0 { h + 360.0 } else { h };
        let h = if h >= 360.0 { h - 360.0 } else { h };

        let s = if max == 0.0 { 0.0 } else { delta / max * 255.0 };

        hue.push(h);
        saturation.push(saturate_u8(f64::from(s)));
        value.push(max as u8);
    }

    HsvPlanes {
        width: image.width(),
        height: image.height(),
        hue,
        saturation,
        value,
    }
}

/// Recombine HSV planes into a BGR image, rounding and clamping each sample.
pub fn from_hsv(planes: &HsvPlanes) -> RasterImage {
    let mut data = Vec::with_capacity(planes.value.len() * CHANNELS);

    for ((&h, &s), &v) in planes
        .hue
        .iter()
        .zip(planes.saturation.iter())
        .zip(planes.value.iter())
    {
        let v = v as f32;
        let chroma = v * (s as f32 / 255.0);
        let min = v - chroma;

        let sector = h / 60.0;
        let f = sector - sector.floor();
        let rising = min + chroma * f;
        let falling = min + chroma * (1.0 - f);

        let (r, g, b) = match (sector.floor() as i32).rem_euclid(6) {
            0 => (v, rising, min),
            1 => (falling, v, min),
            2 => (min, v, rising),
            3 => (min, falling, v),
            4 => (rising, min, v),
            _ => (v, min, falling),
        };

        data.push(saturate_u8(f64::from(b)));
        data.push(saturate_u8(f64::from(g)));
        data.push(saturate_u8(f64::from(r)));
    }

    RasterImage::from_parts(planes.width, planes.height, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(bgr: [u8; 3]) -> RasterImage {
        RasterImage::from_pixel(1, 1, bgr).unwrap()
    }

    #[test]
    fn test_primary_colors() {
        // Red
        let hsv = to_hsv(&single([0, 0, 255]));
        assert_eq!(hsv.hue[0], 0.0);
        assert_eq!(hsv.saturation[0], 255);
        assert_eq!(hsv.value[0], 255);

        // Green
        let hsv = to_hsv(&single([0, 255, 0]));
        assert_eq!(hsv.hue[0], 120.0);

        // Blue
        let hsv = to_hsv(&single([255, 0, 0]));
        assert_eq!(hsv.hue[0], 240.0);
    }

    #[test]
    fn test_negative_hue_wraps() {
        // Magenta-ish red: max is red, blue > green
        let hsv = to_hsv(&single([100, 0, 255]));
        assert!(hsv.hue[0] > 300.0 && hsv.hue[0] < 360.0);
    }

    #[test]
    fn test_gray_has_no_saturation() {
        let hsv = to_hsv(&single([90, 90, 90]));
        assert_eq!(hsv.saturation[0], 0);
        assert_eq!(hsv.value[0], 90);
    }

    #[test]
    fn test_black() {
        let hsv = to_hsv(&single([0, 0, 0]));
        assert_eq!(hsv.saturation[0], 0);
        assert_eq!(hsv.value[0], 0);
        assert_eq!(from_hsv(&hsv).pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_round_trip_exact_for_primaries() {
        for bgr in [[0, 0, 255], [0, 255, 0], [255, 0, 0], [255, 255, 255]] {
            let img = single(bgr);
            assert_eq!(from_hsv(&to_hsv(&img)), img);
        }
    }

    #[test]
    fn test_scale_value_saturates() {
        let mut hsv = to_hsv(&single([0, 0, 200]));
        hsv.scale_value(2.0);
        assert_eq!(hsv.value[0], 255);

        hsv.scale_value(-1.0);
        assert_eq!(hsv.value[0], 0);
    }

    #[test]
    fn test_scale_value_is_not_reversible_after_clamp() {
        let img = single([50, 100, 200]);
        let mut hsv = to_hsv(&img);
        hsv.scale_value(2.0);
        hsv.scale_value(0.5);
        let back = from_hsv(&hsv);

        // 200 * 2 clamps at 255, halving gives ~128, not 200
        assert!(back.pixel(0, 0)[RED] < 150);
    }

    #[test]
    fn test_scale_saturation_to_zero_gives_gray() {
        let mut hsv = to_hsv(&single([40, 120, 220]));
        hsv.scale_saturation(0.0);
        let px = from_hsv(&hsv).pixel(0, 0);
        assert_eq!(px, [220, 220, 220]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

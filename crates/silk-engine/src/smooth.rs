//! Variance-adaptive skin smoothing on the luma channel.
//!
//! Each skin pixel is blended toward the mean of its neighbourhood with a
//! weight `k = v / (v + level)`: flat areas (low variance) move toward the
//! mean, textured areas (eyebrows, hairlines) keep their detail.

use rayon::prelude::*;

use crate::color_space::{quantized_luma, ycbcr_to_rgb};
use crate::integral::IntegralImage;
use crate::skin::SKIN;

/// Smallest blur radius in pixels.
pub const MIN_RADIUS: usize = 2;
/// Largest blur radius in pixels.
pub const MAX_RADIUS: usize = 20;
/// Radius as a fraction of the longer image side.
const RADIUS_FRACTION: f32 = 0.02;

/// Blur radius for an image: 2% of the longer side, clamped to `[2, 20]`.
pub fn blur_radius(width: u32, height: u32) -> usize {
    let scaled = (width.max(height) as f32 * RADIUS_FRACTION) as usize;
    scaled.clamp(MIN_RADIUS, MAX_RADIUS)
}

/// Adaptive blend coefficient. Approaches 1 as local variance dominates.
#[inline]
pub fn blend_coefficient(variance: f64, level: f64) -> f64 {
    variance / (variance + level)
}

/// New luma for a pixel: `m - k*m + k*luma`, clamped to `[0, 255]`.
#[inline]
pub fn blend(mean: f64, variance: f64, luma: f64, level: f64) -> f64 {
    let k = blend_coefficient(variance, level);
    (mean - k * mean + k * luma).clamp(0.0, 255.0)
}

/// Smooth the luma of every skin pixel in place.
///
/// `ycc` and `mask` are row-major planes of `integral.width() * integral.height()`
/// entries. The integral tables must describe the current quantized luma.
/// Returns the number of pixels visited.
pub fn smooth_skin_luma(
    ycc: &mut [[f32; 3]],
    mask: &[u8],
    integral: &IntegralImage,
    radius: usize,
    level: f32,
) -> usize {
    let width = integral.width();
    if width == 0 {
        return 0;
    }
    let level = level as f64;

    ycc.par_chunks_mut(width)
        .zip(mask.par_chunks(width))
        .enumerate()
        .map(|(y, (row, mask_row))| {
            let mut visited = 0usize;
            for (x, (px, &m)) in row.iter_mut().zip(mask_row).enumerate() {
                if m != SKIN {
                    continue;
                }
                let stats = integral.window_around(x, y, radius);
                let quantized = quantized_luma(*px) as f64;
                let smoothed = blend(stats.mean, stats.variance, quantized, level);
                // Shift the unquantized luma by the same amount so an
                // unchanged pixel keeps its sub-quantum remainder.
                px[0] = (px[0] as f64 + (smoothed - quantized)).clamp(0.0, 255.0) as f32;
                visited += 1;
            }
            visited
        })
        .sum()
}

/// Convert smoothed skin pixels back into the RGBA buffer. Non-skin pixels
/// and alpha are left untouched.
pub fn write_back_skin(rgba: &mut [[u8; 4]], ycc: &[[f32; 3]], mask: &[u8]) {
    rgba.par_iter_mut()
        .zip(ycc.par_iter())
        .zip(mask.par_iter())
        .filter(|(_, m)| **m == SKIN)
        .for_each(|((px, &ycc), _)| {
            let [r, g, b] = ycbcr_to_rgb(ycc);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        });
}

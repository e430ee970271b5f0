//! Full-range BT.601 RGB <-> YCbCr conversion.
//!
//! The smoothing pass only touches Y, so chroma is carried in `f32` to make
//! an unmodified pixel round-trip back to the exact same RGB bytes.

use rayon::prelude::*;

/// Chroma offset for 8-bit full-range YCbCr.
const CHROMA_OFFSET: f32 = 128.0;

/// Convert one RGB pixel to `[Y, Cb, Cr]`.
#[inline]
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> [f32; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = CHROMA_OFFSET - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
    let cr = CHROMA_OFFSET + 0.5 * r - 0.418_688 * g - 0.081_312 * b;
    [y, cb, cr]
}

/// Convert `[Y, Cb, Cr]` back to rounded, clamped RGB.
#[inline]
pub fn ycbcr_to_rgb(ycc: [f32; 3]) -> [u8; 3] {
    let [y, cb, cr] = ycc;
    let cb = cb - CHROMA_OFFSET;
    let cr = cr - CHROMA_OFFSET;
    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;
    [to_u8(r), to_u8(g), to_u8(b)]
}

/// Luma of `[Y, Cb, Cr]` quantized to a byte, as fed to the integral images.
#[inline]
pub fn quantized_luma(ycc: [f32; 3]) -> u8 {
    to_u8(ycc[0])
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert a whole RGBA buffer into a YCbCr working plane. Alpha is ignored.
pub fn rgba_to_ycbcr_plane(rgba: &[[u8; 4]], out: &mut [[f32; 3]]) {
    out.par_iter_mut()
        .zip(rgba.par_iter())
        .for_each(|(dst, &[r, g, b, _])| *dst = rgb_to_ycbcr(r, g, b));
}

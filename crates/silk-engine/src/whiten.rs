//! Logarithmic whitening curve.
//!
//! `out = 255 * ln(x * (level - 1) + 1) / ln(level)` for `x` normalized to
//! `[0, 1]`. The curve is concave, so highlights approach white without
//! clipping to a flat plateau.

use rayon::prelude::*;

/// Precomputed whitening curve for one level.
#[derive(Debug, Clone)]
pub struct WhitenCurve {
    level: f32,
    lut: [u8; 256],
}

impl WhitenCurve {
    /// Build the lookup table for `level`. Levels at or below 1.0 (and
    /// non-finite levels) give the identity curve.
    pub fn new(level: f32) -> Self {
        let mut lut = [0u8; 256];
        for (x, out) in lut.iter_mut().enumerate() {
            *out = whiten_value(x as u8, level as f64).round().clamp(0.0, 255.0) as u8;
        }
        Self { level, lut }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// True when the curve maps every value to itself.
    pub fn is_identity(&self) -> bool {
        self.lut.iter().enumerate().all(|(x, &v)| x == v as usize)
    }

    /// Map one channel value.
    #[inline]
    pub fn map(&self, value: u8) -> u8 {
        self.lut[value as usize]
    }

    /// Apply the curve to the R, G and B channels. Alpha is untouched.
    pub fn apply(&self, rgba: &mut [[u8; 4]]) {
        rgba.par_iter_mut().for_each(|px| {
            px[0] = self.map(px[0]);
            px[1] = self.map(px[1]);
            px[2] = self.map(px[2]);
        });
    }
}

/// Unrounded whitening of one channel value.
pub fn whiten_value(value: u8, level: f64) -> f64 {
    let x = value as f64;
    if !level.is_finite() || level <= 1.0 {
        return x;
    }
    let t = level - 1.0;
    255.0 * (x / 255.0 * t).ln_1p() / t.ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_level_one_is_identity() {
        let curve = WhitenCurve::new(1.0);
        assert!(curve.is_identity());
        for v in 0..=255u8 {
            assert_eq!(curve.map(v), v);
        }
        assert!(WhitenCurve::new(f32::NAN).is_identity());
    }

    #[test]
    fn test_endpoints_fixed() {
        for level in [1.5f32, 2.0, 3.0, 5.0] {
            let curve = WhitenCurve::new(level);
            assert_eq!(curve.map(0), 0);
            assert_eq!(curve.map(255), 255);
        }
    }

    #[test]
    fn test_midtones_brighten() {
        let curve = WhitenCurve::new(5.0);
        assert!(curve.map(128) > 128);
        assert!(curve.map(64) > 64);
    }

    #[test]
    fn test_apply_preserves_alpha() {
        let curve = WhitenCurve::new(3.0);
        let mut px = vec![[100u8, 50, 200, 17]; 4];
        curve.apply(&mut px);
        for p in &px {
            assert_eq!(p[3], 17);
            assert_eq!(p[0], curve.map(100));
        }
    }

    #[test]
    fn test_monotonic_over_level_grid() {
        let levels = [1.0f32, 1.25, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];
        let curves: Vec<WhitenCurve> = levels.iter().map(|&l| WhitenCurve::new(l)).collect();
        for v in 0..=255u8 {
            for pair in curves.windows(2) {
                assert!(pair[1].map(v) >= pair[0].map(v), "value {v}");
            }
        }
    }

    proptest! {
        #[test]
        fn whitening_never_darkens(v in any::<u8>(), level in 1.0f32..=5.0) {
            prop_assert!(WhitenCurve::new(level).map(v) >= v);
        }

        #[test]
        fn whitening_monotonic_in_level(v in any::<u8>(), a in 1.0f32..=5.0, b in 1.0f32..=5.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(whiten_value(v, hi as f64) >= whiten_value(v, lo as f64) - 1e-9);
        }
    }
}

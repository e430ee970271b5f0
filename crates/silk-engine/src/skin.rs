//! Rule-based skin detection.
//!
//! Two fixed RGB rules, no learned model. The thresholds live in
//! [`SkinThresholds`] so they can be tuned and tested as a boundary rather
//! than treated as ground truth.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Mask value for a skin pixel.
pub const SKIN: u8 = 255;
/// Mask value for a non-skin pixel.
pub const NOT_SKIN: u8 = 0;

/// Thresholds for the two skin rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinThresholds {
    /// Rule A ("typical skin"): minimum blue
    pub typical_blue_min: i32,
    /// Rule A: minimum green
    pub typical_green_min: i32,
    /// Rule A: minimum red
    pub typical_red_min: i32,
    /// Rule A: minimum blue-red and blue-green spread
    pub typical_spread_min: i32,
    /// Rule B ("fair skin"): minimum blue
    pub fair_blue_min: i32,
    /// Rule B: minimum green
    pub fair_green_min: i32,
    /// Rule B: minimum red
    pub fair_red_min: i32,
    /// Rule B: maximum |blue - red|
    pub fair_spread_max: i32,
}

impl Default for SkinThresholds {
    fn default() -> Self {
        Self {
            typical_blue_min: 95,
            typical_green_min: 40,
            typical_red_min: 20,
            typical_spread_min: 15,
            fair_blue_min: 200,
            fair_green_min: 210,
            fair_red_min: 170,
            fair_spread_max: 15,
        }
    }
}

impl SkinThresholds {
    /// Classify one pixel. Skin if Rule A or Rule B holds.
    #[inline]
    pub fn is_skin(&self, r: u8, g: u8, b: u8) -> bool {
        let (r, g, b) = (r as i32, g as i32, b as i32);
        self.typical_skin(r, g, b) || self.fair_skin(r, g, b)
    }

    #[inline]
    fn typical_skin(&self, r: i32, g: i32, b: i32) -> bool {
        b > self.typical_blue_min
            && g > self.typical_green_min
            && r > self.typical_red_min
            && b - r > self.typical_spread_min
            && b - g > self.typical_spread_min
    }

    #[inline]
    fn fair_skin(&self, r: i32, g: i32, b: i32) -> bool {
        b > self.fair_blue_min
            && g > self.fair_green_min
            && r > self.fair_red_min
            && (b - r).abs() <= self.fair_spread_max
            && b > r
            && g > r
    }

    /// Fill `mask` from an RGBA buffer and return the number of skin pixels.
    pub fn compute_mask(&self, rgba: &[[u8; 4]], mask: &mut [u8]) -> usize {
        mask.par_iter_mut()
            .zip(rgba.par_iter())
            .map(|(m, &[r, g, b, _])| {
                let skin = self.is_skin(r, g, b);
                *m = if skin { SKIN } else { NOT_SKIN };
                usize::from(skin)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typical_rule() {
        let t = SkinThresholds::default();
        assert!(t.is_skin(60, 110, 200));
        // Spread too small on blue-green
        assert!(!t.is_skin(60, 190, 200));
        // Green at threshold is excluded (strict inequality)
        assert!(!t.is_skin(60, 40, 200));
    }

    #[test]
    fn test_fair_rule() {
        let t = SkinThresholds::default();
        assert!(t.is_skin(220, 230, 225));
        // Blue must exceed red
        assert!(!t.is_skin(225, 230, 225));
        // Green must exceed red
        assert!(!t.is_skin(220, 215, 225));
    }

    #[test]
    fn test_non_skin_colors() {
        let t = SkinThresholds::default();
        assert!(!t.is_skin(0, 0, 255));
        assert!(!t.is_skin(0, 0, 0));
        assert!(!t.is_skin(255, 255, 255));
        assert!(!t.is_skin(255, 0, 0));
    }

    #[test]
    fn test_mask_counts() {
        let t = SkinThresholds::default();
        let rgba = vec![[60, 110, 200, 255], [0, 0, 255, 255], [220, 230, 225, 255]];
        let mut mask = vec![7u8; 3];
        assert_eq!(t.compute_mask(&rgba, &mut mask), 2);
        assert_eq!(mask, vec![SKIN, NOT_SKIN, SKIN]);
    }

    #[test]
    fn test_tuned_thresholds() {
        let strict = SkinThresholds {
            typical_blue_min: 250,
            ..Default::default()
        };
        assert!(!strict.is_skin(60, 110, 200));
    }
}

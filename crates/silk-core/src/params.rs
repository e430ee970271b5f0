//! Beauty parameters and the public intensity mapping.

use serde::{Deserialize, Serialize};

/// Smallest smoothing level the engine accepts.
pub const MIN_SMOOTH_LEVEL: f32 = 10.0;
/// Largest smoothing level the engine accepts.
pub const MAX_SMOOTH_LEVEL: f32 = 510.0;
/// Smallest whitening level (identity curve).
pub const MIN_WHITEN_LEVEL: f32 = 1.0;
/// Largest whitening level.
pub const MAX_WHITEN_LEVEL: f32 = 5.0;

/// Parameters for one beautification pass.
///
/// `smooth_level` is the denominator bias of the adaptive blend: larger
/// values pull flat skin harder toward its local mean. `whiten_level` is the
/// base of the logarithmic brightening curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeautyParams {
    /// Adaptive smoothing strength (10.0-510.0)
    pub smooth_level: f32,
    /// Whitening strength (1.0-5.0)
    pub whiten_level: f32,
}

impl Default for BeautyParams {
    fn default() -> Self {
        Self::from_intensity(0.5)
    }
}

impl BeautyParams {
    /// Create parameters from explicit levels, clamped to the engine ranges.
    pub fn new(smooth_level: f32, whiten_level: f32) -> Self {
        Self {
            smooth_level,
            whiten_level,
        }
        .clamped()
    }

    /// Map a UI intensity in `[0, 1]` onto both engine levels.
    ///
    /// Non-finite intensities are treated as zero.
    pub fn from_intensity(intensity: f32) -> Self {
        let i = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self::new(10.0 + i * 500.0, 1.0 + i * 4.0)
    }

    /// Return a copy with both levels clamped into the accepted ranges.
    pub fn clamped(self) -> Self {
        Self {
            smooth_level: clamp_smooth_level(self.smooth_level),
            whiten_level: clamp_whiten_level(self.whiten_level),
        }
    }
}

/// Clamp a smoothing level into `[10, 510]`. NaN maps to the minimum.
pub fn clamp_smooth_level(level: f32) -> f32 {
    if level.is_nan() {
        return MIN_SMOOTH_LEVEL;
    }
    level.clamp(MIN_SMOOTH_LEVEL, MAX_SMOOTH_LEVEL)
}

/// Clamp a whitening level into `[1, 5]`. NaN maps to the identity level.
pub fn clamp_whiten_level(level: f32) -> f32 {
    if level.is_nan() {
        return MIN_WHITEN_LEVEL;
    }
    level.clamp(MIN_WHITEN_LEVEL, MAX_WHITEN_LEVEL)
}

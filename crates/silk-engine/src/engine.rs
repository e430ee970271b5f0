//! Stateful skin-smoothing engine.
//!
//! The engine owns every derived buffer (RGBA working copy, YCbCr plane,
//! skin mask, integral tables) for exactly one resolution at a time. It never
//! holds on to the caller's frame: pixels are copied in on
//! [`SkinSmoothingEngine::initialize`] and copied back out on
//! [`SkinSmoothingEngine::write_to`].

use serde::{Deserialize, Serialize};
use silk_core::limits::{MAX_DIMENSION, MAX_PIXELS, MIN_DIMENSION};
use silk_core::params::{clamp_smooth_level, clamp_whiten_level};
use silk_core::{EngineError, EngineResult, Frame};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::alloc::try_filled;
use crate::color_space::{quantized_luma, rgba_to_ycbcr_plane};
use crate::integral::IntegralImage;
use crate::skin::{SkinThresholds, NOT_SKIN};
use crate::smooth::{blur_radius, smooth_skin_luma, write_back_skin};
use crate::whiten::WhitenCurve;

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No frame has been loaded yet.
    Uninitialized,
    /// Buffers are allocated for a frame of this size.
    Initialized { width: u32, height: u32 },
    /// Buffers were torn down.
    Released,
}

/// Buffers derived from one loaded frame.
struct WorkingBuffers {
    width: u32,
    height: u32,
    rgba: Vec<[u8; 4]>,
    ycc: Vec<[f32; 3]>,
    skin_mask: Vec<u8>,
    integral: IntegralImage,
    skin_pixels: usize,
}

impl WorkingBuffers {
    fn try_alloc(width: u32, height: u32) -> EngineResult<Self> {
        let len = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            rgba: try_filled(len, [0u8; 4])?,
            ycc: try_filled(len, [0.0f32; 3])?,
            skin_mask: try_filled(len, NOT_SKIN)?,
            integral: IntegralImage::try_new(width, height)?,
            skin_pixels: 0,
        })
    }

    /// Copy the frame into the RGBA working copy.
    fn load(&mut self, frame: &Frame) {
        let format = frame.format;
        for (dst, &src) in self.rgba.iter_mut().zip(frame.pixels()) {
            *dst = format.to_rgba(src);
        }
    }

    /// Recompute YCbCr, the skin mask and the integral tables from the
    /// current RGBA working copy.
    fn refresh(&mut self, thresholds: &SkinThresholds) {
        rgba_to_ycbcr_plane(&self.rgba, &mut self.ycc);
        self.skin_pixels = thresholds.compute_mask(&self.rgba, &mut self.skin_mask);
        self.integral
            .rebuild(self.ycc.iter().map(|&p| quantized_luma(p)));
    }

    fn pixel_count(&self) -> usize {
        self.rgba.len()
    }
}

/// Skin detection, adaptive smoothing and whitening over one frame.
pub struct SkinSmoothingEngine {
    state: EngineState,
    buffers: Option<WorkingBuffers>,
    thresholds: SkinThresholds,
    last_smooth_level: Option<f32>,
    last_whiten_level: Option<f32>,
}

impl Default for SkinSmoothingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SkinSmoothingEngine {
    /// Create an uninitialized engine with the default skin thresholds.
    pub fn new() -> Self {
        Self::with_thresholds(SkinThresholds::default())
    }

    /// Create an uninitialized engine with custom skin thresholds.
    pub fn with_thresholds(thresholds: SkinThresholds) -> Self {
        Self {
            state: EngineState::Uninitialized,
            buffers: None,
            thresholds,
            last_smooth_level: None,
            last_whiten_level: None,
        }
    }

    /// Check a resolution against the size-safety envelope.
    pub fn check_size(width: u32, height: u32) -> EngineResult<()> {
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            warn!(width, height, "frame below minimum dimension {MIN_DIMENSION}");
            return Err(EngineError::SizeTooSmall { width, height });
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            warn!(width, height, "frame above maximum dimension {MAX_DIMENSION}");
            return Err(EngineError::SizeTooLarge { width, height });
        }
        if width as u64 * height as u64 > MAX_PIXELS {
            warn!(width, height, "frame above maximum pixel count {MAX_PIXELS}");
            return Err(EngineError::SizeTooLarge { width, height });
        }
        Ok(())
    }

    /// Validate a frame before anything is allocated for it.
    pub fn validate_frame(frame: &Frame) -> EngineResult<()> {
        if frame.data.is_empty() {
            return Err(EngineError::InvalidData("empty pixel buffer".into()));
        }
        Self::check_size(frame.width, frame.height)?;
        if !frame.has_valid_layout() {
            return Err(EngineError::InvalidData(format!(
                "buffer holds {} bytes, {}x{} {:?} needs {}",
                frame.data.len(),
                frame.width,
                frame.height,
                frame.format,
                frame.format.frame_size(frame.width, frame.height)
            )));
        }
        Ok(())
    }

    /// Load a frame: validate, drop old buffers, allocate new ones and
    /// compute the skin mask and integral tables.
    ///
    /// Validation failures leave the engine untouched. An allocation failure
    /// leaves it `Released`, never half-initialized.
    pub fn initialize(&mut self, frame: &Frame) -> EngineResult<()> {
        Self::validate_frame(frame)?;
        self.teardown();

        let start = Instant::now();
        let mut buffers = match WorkingBuffers::try_alloc(frame.width, frame.height) {
            Ok(b) => b,
            Err(e) => {
                self.state = EngineState::Released;
                return Err(e);
            }
        };
        buffers.load(frame);
        buffers.refresh(&self.thresholds);

        info!(
            width = frame.width,
            height = frame.height,
            skin_pixels = buffers.skin_pixels,
            elapsed_us = start.elapsed().as_micros() as u64,
            "beauty engine initialized"
        );
        self.state = EngineState::Initialized {
            width: frame.width,
            height: frame.height,
        };
        self.buffers = Some(buffers);
        Ok(())
    }

    /// Run one adaptive smoothing pass over the skin pixels.
    ///
    /// YCbCr, the mask and the integral tables are recomputed first, since
    /// whitening may have changed the pixels since the last pass.
    pub fn smooth(&mut self, level: f32) -> EngineResult<()> {
        let thresholds = self.thresholds;
        let level = clamp_smooth_level(level);
        let buffers = self.buffers_mut()?;

        let start = Instant::now();
        buffers.refresh(&thresholds);
        let radius = blur_radius(buffers.width, buffers.height);
        let visited = smooth_skin_luma(
            &mut buffers.ycc,
            &buffers.skin_mask,
            &buffers.integral,
            radius,
            level,
        );
        write_back_skin(&mut buffers.rgba, &buffers.ycc, &buffers.skin_mask);

        debug!(
            radius,
            level,
            skin_pixels = visited,
            elapsed_us = start.elapsed().as_micros() as u64,
            "skin smoothing pass"
        );
        self.last_smooth_level = Some(level);
        Ok(())
    }

    /// Apply the whitening curve to every pixel.
    pub fn whiten(&mut self, level: f32) -> EngineResult<()> {
        let level = clamp_whiten_level(level);
        let buffers = self.buffers_mut()?;

        let curve = WhitenCurve::new(level);
        if curve.is_identity() {
            debug!(level, "whitening curve is the identity, skipping");
        } else {
            curve.apply(&mut buffers.rgba);
            debug!(level, "whitening pass");
        }
        self.last_whiten_level = Some(level);
        Ok(())
    }

    /// Copy the processed pixels into `frame`, converting to its layout.
    ///
    /// The frame must match the loaded dimensions; on mismatch nothing is
    /// written.
    pub fn write_to(&self, frame: &mut Frame) -> EngineResult<()> {
        let buffers = self.buffers()?;
        if frame.width != buffers.width
            || frame.height != buffers.height
            || !frame.has_valid_layout()
        {
            return Err(EngineError::InvalidData(format!(
                "output frame {}x{} does not match engine {}x{}",
                frame.width, frame.height, buffers.width, buffers.height
            )));
        }
        let format = frame.format;
        for (dst, &src) in frame.pixels_mut().iter_mut().zip(&buffers.rgba) {
            *dst = format.from_rgba(src);
        }
        Ok(())
    }

    /// Drop every owned buffer. Idempotent.
    pub fn release(&mut self) {
        if self.buffers.is_some() {
            debug!("releasing beauty engine buffers");
        }
        self.teardown();
        self.last_smooth_level = None;
        self.last_whiten_level = None;
        self.state = EngineState::Released;
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, EngineState::Initialized { .. })
    }

    /// Dimensions of the loaded frame, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.buffers.as_ref().map(|b| (b.width, b.height))
    }

    /// Fraction of pixels classified as skin in the most recent mask.
    pub fn skin_coverage(&self) -> Option<f32> {
        self.buffers
            .as_ref()
            .map(|b| b.skin_pixels as f32 / b.pixel_count().max(1) as f32)
    }

    /// Smoothing and whitening levels most recently applied.
    pub fn last_levels(&self) -> (Option<f32>, Option<f32>) {
        (self.last_smooth_level, self.last_whiten_level)
    }

    pub fn thresholds(&self) -> &SkinThresholds {
        &self.thresholds
    }

    fn teardown(&mut self) {
        self.buffers = None;
    }

    fn buffers(&self) -> EngineResult<&WorkingBuffers> {
        match (&self.state, &self.buffers) {
            (EngineState::Initialized { .. }, Some(b)) => Ok(b),
            _ => Err(EngineError::NotInitialized),
        }
    }

    fn buffers_mut(&mut self) -> EngineResult<&mut WorkingBuffers> {
        match (&self.state, &mut self.buffers) {
            (EngineState::Initialized { .. }, Some(b)) => Ok(b),
            _ => Err(EngineError::NotInitialized),
        }
    }
}

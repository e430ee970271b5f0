//! Safety boundary around the smoothing engine.
//!
//! [`BeautyBoundary`] owns the only call sites into the engine. Every call
//! validates its input, runs under the engine locks, and converts any panic
//! raised inside the engine into [`EngineError::Processing`] so nothing
//! unwinds into the caller.
//!
//! Lock order is always `lifecycle` then `engine`. Lifecycle transitions
//! (initialize, release, the combined `process`) hold both; single
//! processing calls hold only `engine`.

use parking_lot::Mutex;
use silk_core::params::{clamp_smooth_level, clamp_whiten_level};
use silk_core::{BeautyParams, EngineError, EngineResult, Frame};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, warn};

use crate::engine::{EngineState, SkinSmoothingEngine};

/// Fault-containing handle to the single smoothing engine.
///
/// Construct one at startup and share it by reference (or `Arc`).
pub struct BeautyBoundary {
    lifecycle: Mutex<()>,
    engine: Mutex<SkinSmoothingEngine>,
}

impl Default for BeautyBoundary {
    fn default() -> Self {
        Self::new()
    }
}

impl BeautyBoundary {
    /// Create a boundary around a fresh engine.
    pub fn new() -> Self {
        Self::with_engine(SkinSmoothingEngine::new())
    }

    /// Create a boundary around an existing engine.
    pub fn with_engine(engine: SkinSmoothingEngine) -> Self {
        Self {
            lifecycle: Mutex::new(()),
            engine: Mutex::new(engine),
        }
    }

    /// Load `frame` into the engine.
    pub fn initialize(&self, frame: &Frame) -> EngineResult<()> {
        if let Err(e) = SkinSmoothingEngine::validate_frame(frame) {
            warn!(frame = frame.id.0, error = %e, "rejected frame at beauty boundary");
            return Err(e);
        }

        let _lifecycle = self.lifecycle.lock();
        let mut engine = self.engine.lock();
        contain("initialize", &mut engine, |e| e.initialize(frame))
    }

    /// Smooth the loaded frame. `level` is clamped to `[10, 510]`.
    pub fn smooth(&self, level: f32) -> EngineResult<()> {
        let level = clamp_smooth_level(level);
        let mut engine = self.engine.lock();
        if !engine.is_initialized() {
            return Err(EngineError::NotInitialized);
        }
        contain("smooth", &mut engine, |e| e.smooth(level))
    }

    /// Whiten the loaded frame. `level` is clamped to `[1, 5]`.
    pub fn whiten(&self, level: f32) -> EngineResult<()> {
        let level = clamp_whiten_level(level);
        let mut engine = self.engine.lock();
        if !engine.is_initialized() {
            return Err(EngineError::NotInitialized);
        }
        contain("whiten", &mut engine, |e| e.whiten(level))
    }

    /// Copy the processed pixels back into `frame`.
    pub fn commit(&self, frame: &mut Frame) -> EngineResult<()> {
        let mut engine = self.engine.lock();
        contain("commit", &mut engine, |e| e.write_to(frame))
    }

    /// Initialize, smooth, whiten and commit in one locked step.
    ///
    /// `frame` is only written if every stage succeeds; on error it still
    /// holds the original pixels.
    pub fn process(&self, frame: &mut Frame, params: &BeautyParams) -> EngineResult<()> {
        SkinSmoothingEngine::validate_frame(frame)?;
        let params = params.clamped();

        let _lifecycle = self.lifecycle.lock();
        let mut engine = self.engine.lock();
        contain("process", &mut engine, |e| {
            e.initialize(frame)?;
            e.smooth(params.smooth_level)?;
            e.whiten(params.whiten_level)?;
            e.write_to(frame)
        })
    }

    /// Tear the engine down. Never fails from the caller's point of view.
    pub fn release(&self) {
        let _lifecycle = self.lifecycle.lock();
        let mut engine = self.engine.lock();
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| engine.release())) {
            error!(
                panic = %panic_message(payload.as_ref()),
                "fault while releasing beauty engine"
            );
            let thresholds = *engine.thresholds();
            *engine = SkinSmoothingEngine::with_thresholds(thresholds);
        }
    }

    pub fn state(&self) -> EngineState {
        self.engine.lock().state()
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.lock().is_initialized()
    }

    /// Fraction of skin pixels in the most recent mask.
    pub fn skin_coverage(&self) -> Option<f32> {
        self.engine.lock().skin_coverage()
    }

    /// Smoothing and whitening levels most recently applied.
    pub fn last_levels(&self) -> (Option<f32>, Option<f32>) {
        self.engine.lock().last_levels()
    }
}

/// Run `op` against the engine, converting a panic into
/// [`EngineError::Processing`] and tearing the engine down so no partially
/// updated buffers survive.
fn contain<T>(
    op: &str,
    engine: &mut SkinSmoothingEngine,
    f: impl FnOnce(&mut SkinSmoothingEngine) -> EngineResult<T>,
) -> EngineResult<T> {
    match catch_unwind(AssertUnwindSafe(|| f(engine))) {
        Ok(result) => {
            if let Err(e) = &result {
                debug!(op, error = %e, "beauty engine call failed");
            }
            result
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(op, panic = %message, "fault contained at beauty boundary");
            if catch_unwind(AssertUnwindSafe(|| engine.release())).is_err() {
                *engine = SkinSmoothingEngine::new();
            }
            Err(EngineError::Processing(format!("{op}: {message}")))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! SilkCam Engine - skin detection and beautification on CPU frames
//!
//! Pipeline of one beautification pass:
//! - `color_space`: RGB <-> YCbCr, smoothing only touches luma
//! - `skin`: rule-based skin mask
//! - `integral`: summed-area tables for O(1) window mean/variance
//! - `smooth`: variance-adaptive blend toward the local mean
//! - `whiten`: logarithmic brightening curve
//! - `engine`: stateful owner of all working buffers
//! - `boundary`: the fault-containing entry point callers use

mod alloc;
pub mod boundary;
pub mod color_space;
pub mod engine;
pub mod integral;
pub mod skin;
pub mod smooth;
pub mod whiten;

pub use boundary::BeautyBoundary;
pub use engine::{EngineState, SkinSmoothingEngine};
pub use integral::{IntegralImage, WindowStats};
pub use skin::SkinThresholds;
pub use whiten::WhitenCurve;

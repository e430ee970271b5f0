//! SilkCam Core - Foundation types for the beauty pipeline
//!
//! This crate provides the types shared by the engine and the pipeline:
//! - Frames and pixel formats
//! - Beauty parameters and the intensity mapping
//! - The engine error taxonomy
//! - Size-safety limits for the smoothing engine

pub mod error;
pub mod frame;
pub mod params;

pub use error::{EngineError, EngineResult};
pub use frame::{Frame, FrameId, PixelFormat, SharedFrame};
pub use params::BeautyParams;

/// Size-safety envelope for frames entering the smoothing engine.
pub mod limits {
    /// Smallest accepted side length in pixels.
    pub const MIN_DIMENSION: u32 = 32;

    /// Largest accepted side length in pixels.
    pub const MAX_DIMENSION: u32 = 2048;

    /// Largest accepted pixel count (about 4 MP).
    pub const MAX_PIXELS: u64 = 4_000_000;

    /// Bytes per packed pixel for every format the engine accepts.
    pub const BYTES_PER_PIXEL: usize = 4;
}

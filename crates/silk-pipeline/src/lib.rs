//! SilkCam Pipeline - frame buffering and the background processing loop
//!
//! A capture source hands frames to [`FrameProcessor::submit_frame`], which
//! stores them in a fixed-capacity [`FrameStore`]. A single worker thread
//! takes the newest frame at a fixed cadence, runs the caller's processing
//! function on it and publishes the result on a bounded channel.

pub mod config;
pub mod error;
pub mod frame_store;
pub mod processor;
pub mod stats;

pub use config::ProcessorConfig;
pub use error::{PipelineError, PipelineResult};
pub use frame_store::FrameStore;
pub use processor::{CancelFlag, FrameProcessor, ProcessedFrame, ProcessorState};
pub use stats::{ProcessorStats, StoreStats};

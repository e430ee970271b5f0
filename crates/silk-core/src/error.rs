//! Error types for the smoothing engine and its safety boundary.

use thiserror::Error;

/// Errors returned by every operation of the beauty boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid frame data: {0}")]
    InvalidData(String),

    #[error("Frame too large: {width}x{height} exceeds the engine limits")]
    SizeTooLarge { width: u32, height: u32 },

    #[error("Frame too small: {width}x{height} is below the engine minimum")]
    SizeTooSmall { width: u32, height: u32 },

    #[error("Failed to allocate {bytes} bytes of working memory")]
    MemoryAllocFailure { bytes: usize },

    #[error("Engine not initialized, call initialize() first")]
    NotInitialized,

    #[error("Processing fault: {0}")]
    Processing(String),
}

impl EngineError {
    /// True for the two size-envelope violations.
    pub fn is_size_error(&self) -> bool {
        matches!(self, Self::SizeTooLarge { .. } | Self::SizeTooSmall { .. })
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

//! Error types for the frame pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid processor configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn processing thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

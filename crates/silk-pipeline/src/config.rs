//! Processor configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};

/// Process-lifetime settings for a [`crate::FrameProcessor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Number of frame slots in the store.
    pub store_capacity: usize,
    /// Minimum time between the starts of two processing calls.
    pub target_interval: Duration,
    /// Processed frames buffered for the downstream consumer.
    pub output_capacity: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            store_capacity: 3,
            target_interval: Duration::from_millis(33),
            output_capacity: 4,
        }
    }
}

impl ProcessorConfig {
    /// Config pacing the loop at `fps` frames per second.
    pub fn with_fps(fps: u32) -> Self {
        Self {
            target_interval: Duration::from_secs(1) / fps.max(1),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.store_capacity == 0 {
            return Err(PipelineError::InvalidConfig(
                "store_capacity must be at least 1".into(),
            ));
        }
        if self.output_capacity == 0 {
            return Err(PipelineError::InvalidConfig(
                "output_capacity must be at least 1".into(),
            ));
        }
        if self.target_interval.is_zero() {
            return Err(PipelineError::InvalidConfig(
                "target_interval must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Sleep used while paused or when no frame is waiting.
    pub fn idle_interval(&self) -> Duration {
        self.target_interval / 4
    }
}

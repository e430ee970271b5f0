//! Counters reported by the frame store and the processing loop.

use serde::Serialize;
use std::time::Duration;

/// Frame store bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub submitted: u64,
    pub consumed: u64,
    /// Frames overwritten before they were ever read.
    pub dropped: u64,
    pub drop_rate: f64,
}

impl StoreStats {
    pub(crate) fn new(submitted: u64, consumed: u64, dropped: u64) -> Self {
        let drop_rate = if submitted == 0 {
            0.0
        } else {
            dropped as f64 / submitted as f64
        };
        Self {
            submitted,
            consumed,
            dropped,
            drop_rate,
        }
    }
}

/// Snapshot of a processor run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessorStats {
    /// Frames handed to the processing function.
    pub processed: u64,
    /// Subset of `processed` whose call returned an error or panicked.
    pub failed: u64,
    /// Frames submitted while the processor was stopped.
    pub rejected: u64,
    /// Results dropped because the output channel was full.
    pub unpublished: u64,
    pub total_processing_ms: f64,
    pub average_processing_ms: f64,
    pub store: StoreStats,
}

/// Mutable counters owned by the processing loop.
#[derive(Debug, Default)]
pub(crate) struct LoopCounters {
    pub processed: u64,
    pub failed: u64,
    pub rejected: u64,
    pub unpublished: u64,
    pub total_processing: Duration,
}

impl LoopCounters {
    pub fn record(&mut self, elapsed: Duration, succeeded: bool) {
        self.processed += 1;
        if !succeeded {
            self.failed += 1;
        }
        self.total_processing += elapsed;
    }

    pub fn snapshot(&self, store: StoreStats) -> ProcessorStats {
        let total_ms = self.total_processing.as_secs_f64() * 1000.0;
        let average_ms = if self.processed == 0 {
            0.0
        } else {
            total_ms / self.processed as f64
        };
        ProcessorStats {
            processed: self.processed,
            failed: self.failed,
            rejected: self.rejected,
            unpublished: self.unpublished,
            total_processing_ms: total_ms,
            average_processing_ms: average_ms,
            store,
        }
    }
}

//! Background processing loop.
//!
//! State machine: `Stopped -> Running <-> Paused -> Stopped`. The loop runs
//! on its own thread, checks a [`CancelFlag`] at every iteration boundary
//! and paces itself to `target_interval`. Errors and panics from the
//! processing function are logged and the original frame is published in
//! place of the result, so one bad frame never ends the run.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use silk_core::{Frame, SharedFrame};
use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

use crate::config::ProcessorConfig;
use crate::error::PipelineResult;
use crate::frame_store::FrameStore;
use crate::stats::{LoopCounters, ProcessorStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessorState {
    Stopped,
    Running,
    Paused,
}

/// Cancellation handle shared between the controller and the loop.
#[derive(Clone)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// A frame leaving the processor.
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    pub frame: SharedFrame,
    /// False when processing failed and `frame` is the unmodified input.
    pub beautified: bool,
    pub processing_time: Duration,
}

struct Shared {
    config: ProcessorConfig,
    store: FrameStore,
    /// Whether frames are accepted. `submit_frame` holds the read guard
    /// across its check and the store insert; `stop` takes the write guard
    /// before draining, so nothing lands in the store after a stop.
    accepting: RwLock<bool>,
    paused: AtomicBool,
    counters: RwLock<LoopCounters>,
    output: Sender<ProcessedFrame>,
}

struct Worker {
    cancel: CancelFlag,
    handle: JoinHandle<()>,
}

/// Drives a processing function over the newest submitted frame at a fixed
/// cadence.
pub struct FrameProcessor {
    shared: Arc<Shared>,
    output: Receiver<ProcessedFrame>,
    worker: Mutex<Option<Worker>>,
}

impl FrameProcessor {
    pub fn new(config: ProcessorConfig) -> PipelineResult<Self> {
        config.validate()?;
        let (tx, rx) = bounded(config.output_capacity);
        Ok(Self {
            shared: Arc::new(Shared {
                store: FrameStore::new(config.store_capacity),
                config,
                accepting: RwLock::new(false),
                paused: AtomicBool::new(false),
                counters: RwLock::new(LoopCounters::default()),
                output: tx,
            }),
            output: rx,
            worker: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.shared.config
    }

    /// Receiver for processed frames. Results are dropped (and counted as
    /// unpublished) while it is full.
    pub fn output(&self) -> Receiver<ProcessedFrame> {
        self.output.clone()
    }

    /// Spawn the processing loop. Does nothing if already running.
    ///
    /// Counters from a previous run are reset.
    pub fn start<F, E>(&self, process_fn: F) -> PipelineResult<()>
    where
        F: FnMut(&Frame) -> Result<Frame, E> + Send + 'static,
        E: Display,
    {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            warn!("frame processor already running, ignoring start");
            return Ok(());
        }

        *self.shared.counters.write() = LoopCounters::default();
        let stale = self.shared.store.clear().len();
        if stale > 0 {
            debug!(stale, "released frames left from a previous run");
        }
        self.shared.store.reset_statistics();
        self.shared.paused.store(false, Ordering::Release);

        let cancel = CancelFlag::new();
        let loop_cancel = cancel.clone();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("silk-processor".into())
            .spawn(move || run_loop(&shared, &loop_cancel, process_fn))?;

        *self.shared.accepting.write() = true;
        *worker = Some(Worker { cancel, handle });
        info!(
            interval_ms = self.shared.config.target_interval.as_millis() as u64,
            capacity = self.shared.config.store_capacity,
            "frame processor started"
        );
        Ok(())
    }

    /// Stop the loop, wait for the current iteration and release every
    /// buffered frame. Safe to call repeatedly and from any thread.
    pub fn stop(&self) {
        let taken = {
            let mut worker = self.worker.lock();
            *self.shared.accepting.write() = false;
            self.shared.paused.store(false, Ordering::Release);
            worker.take()
        };

        let Some(Worker { cancel, handle }) = taken else {
            let released = self.shared.store.clear().len();
            if released > 0 {
                debug!(released, "released frames on stop");
            }
            return;
        };

        cancel.cancel();
        if handle.thread().id() == thread::current().id() {
            // Called from inside the processing function; the loop exits
            // as soon as this iteration returns.
            debug!("stop requested from the processing thread");
        } else if handle.join().is_err() {
            error!("processing thread terminated abnormally");
        }

        let released = self.shared.store.clear().len();
        let stats = self.statistics();
        info!(
            released,
            processed = stats.processed,
            failed = stats.failed,
            dropped = stats.store.dropped,
            drop_rate = stats.store.drop_rate,
            avg_ms = stats.average_processing_ms,
            "frame processor stopped"
        );
    }

    pub fn pause(&self) {
        if self.state() == ProcessorState::Running {
            self.shared.paused.store(true, Ordering::Release);
            debug!("frame processor paused");
        }
    }

    pub fn resume(&self) {
        if self.state() == ProcessorState::Paused {
            self.shared.paused.store(false, Ordering::Release);
            debug!("frame processor resumed");
        }
    }

    pub fn state(&self) -> ProcessorState {
        if !*self.shared.accepting.read() {
            ProcessorState::Stopped
        } else if self.shared.paused.load(Ordering::Acquire) {
            ProcessorState::Paused
        } else {
            ProcessorState::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() != ProcessorState::Stopped
    }

    /// Hand a frame to the store. Only waits while a `stop` is taking the
    /// gate, never on processing.
    ///
    /// While stopped the frame is released immediately. Returns whether the
    /// frame was accepted.
    pub fn submit_frame(&self, frame: Frame) -> bool {
        let accepting = self.shared.accepting.read();
        if !*accepting {
            self.shared.counters.write().rejected += 1;
            trace!(frame = frame.id.0, "processor stopped, releasing frame");
            return false;
        }
        if let Some(evicted) = self.shared.store.submit(frame) {
            trace!(frame = evicted.id.0, "releasing stale frame");
        }
        true
    }

    /// Frames currently held by the store.
    pub fn buffered_frames(&self) -> usize {
        self.shared.store.len()
    }

    pub fn statistics(&self) -> ProcessorStats {
        let store = self.shared.store.statistics();
        self.shared.counters.read().snapshot(store)
    }
}

impl Drop for FrameProcessor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop<F, E>(shared: &Shared, cancel: &CancelFlag, mut process_fn: F)
where
    F: FnMut(&Frame) -> Result<Frame, E>,
    E: Display,
{
    let interval = shared.config.target_interval;
    let idle = shared.config.idle_interval();
    debug!("processing loop entered");

    while !cancel.is_cancelled() {
        if shared.paused.load(Ordering::Acquire) {
            thread::sleep(idle);
            continue;
        }
        let Some(input) = shared.store.peek_latest() else {
            thread::sleep(idle);
            continue;
        };

        let started = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| process_fn(&input)));
        let elapsed = started.elapsed();

        let (frame, beautified) = match outcome {
            Ok(Ok(output)) => (Arc::new(output), true),
            Ok(Err(e)) => {
                warn!(frame = input.id.0, error = %e, "frame processing failed, passing through");
                (input, false)
            }
            Err(_) => {
                error!(frame = input.id.0, "frame processing panicked, passing through");
                (input, false)
            }
        };
        trace!(
            frame = frame.id.0,
            beautified,
            elapsed_us = elapsed.as_micros() as u64,
            "frame processed"
        );

        let published = shared.output.try_send(ProcessedFrame {
            frame,
            beautified,
            processing_time: elapsed,
        });

        {
            let mut counters = shared.counters.write();
            counters.record(elapsed, beautified);
            if let Err(e) = published {
                counters.unpublished += 1;
                if let TrySendError::Disconnected(_) = e {
                    debug!("output channel disconnected");
                }
            }
        }

        thread::sleep(interval.saturating_sub(started.elapsed()));
    }

    debug!("processing loop exited");
}

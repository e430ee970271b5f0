//! Fixed-capacity frame store with overwrite-oldest semantics.
//!
//! The producer never waits: `submit` always succeeds and hands back any
//! unread frame it displaced. The consumer only ever sees the most recent
//! frame, and each frame at most once.

use parking_lot::Mutex;
use silk_core::SharedFrame;
use tracing::trace;

use crate::stats::StoreStats;

struct Slot {
    frame: SharedFrame,
    read: bool,
}

struct StoreInner {
    slots: Vec<Option<Slot>>,
    write_pos: usize,
    latest: Option<usize>,
    submitted: u64,
    consumed: u64,
    dropped: u64,
}

/// Circular buffer of the most recent frames.
pub struct FrameStore {
    capacity: usize,
    inner: Mutex<StoreInner>,
}

impl FrameStore {
    /// Create a store with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(StoreInner {
                slots: (0..capacity).map(|_| None).collect(),
                write_pos: 0,
                latest: None,
                submitted: 0,
                consumed: 0,
                dropped: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert a frame at the write position.
    ///
    /// Returns the frame it overwrote if that frame was never read; the
    /// caller is responsible for releasing it.
    pub fn submit(&self, frame: impl Into<SharedFrame>) -> Option<SharedFrame> {
        let frame = frame.into();
        let mut inner = self.inner.lock();
        let pos = inner.write_pos;
        let previous = inner.slots[pos].replace(Slot { frame, read: false });
        inner.write_pos = (pos + 1) % self.capacity;
        inner.latest = Some(pos);
        inner.submitted += 1;

        match previous {
            Some(slot) if !slot.read => {
                inner.dropped += 1;
                trace!(frame = slot.frame.id.0, "evicted unread frame");
                Some(slot.frame)
            }
            _ => None,
        }
    }

    /// Take a shared handle to the newest frame if it hasn't been read yet.
    pub fn peek_latest(&self) -> Option<SharedFrame> {
        let mut inner = self.inner.lock();
        let pos = inner.latest?;
        let frame = match inner.slots[pos].as_mut() {
            Some(slot) if !slot.read => {
                slot.read = true;
                SharedFrame::clone(&slot.frame)
            }
            _ => return None,
        };
        inner.consumed += 1;
        Some(frame)
    }

    /// Remove and return every frame still held.
    pub fn clear(&self) -> Vec<SharedFrame> {
        let mut inner = self.inner.lock();
        inner.latest = None;
        inner.write_pos = 0;
        inner
            .slots
            .iter_mut()
            .filter_map(|slot| slot.take().map(|s| s.frame))
            .collect()
    }

    /// Number of frames currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn statistics(&self) -> StoreStats {
        let inner = self.inner.lock();
        StoreStats::new(inner.submitted, inner.consumed, inner.dropped)
    }

    /// Zero the counters without touching stored frames.
    pub fn reset_statistics(&self) {
        let mut inner = self.inner.lock();
        inner.submitted = 0;
        inner.consumed = 0;
        inner.dropped = 0;
    }
}

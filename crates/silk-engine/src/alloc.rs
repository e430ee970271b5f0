//! Fallible allocation of working buffers.

use silk_core::{EngineError, EngineResult};

/// Allocate a vector of `len` copies of `fill`, reporting failure instead
/// of aborting the process.
pub(crate) fn try_filled<T: Clone>(len: usize, fill: T) -> EngineResult<Vec<T>> {
    let bytes = len.saturating_mul(std::mem::size_of::<T>());
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| EngineError::MemoryAllocFailure { bytes })?;
    buf.resize(len, fill);
    Ok(buf)
}

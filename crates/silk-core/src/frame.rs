//! Frame types for captured video frames in CPU memory.
//!
//! Frames are tightly packed 4-byte-per-pixel buffers. The smoothing engine
//! works on RGBA only, so every other layout is swizzled at the boundary.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::limits::BYTES_PER_PIXEL;

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

/// Unique, monotonically increasing identifier of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameId(pub u64);

impl FrameId {
    /// Allocate the next process-wide frame id.
    pub fn next() -> Self {
        Self(NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Packed 32-bit pixel layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit R, G, B, A in memory order
    #[default]
    Rgba8,
    /// 8-bit B, G, R, A in memory order (common camera/surface layout)
    Bgra8,
}

impl PixelFormat {
    /// Bytes per pixel. Both layouts are 32-bit packed.
    pub fn bytes_per_pixel(self) -> usize {
        BYTES_PER_PIXEL
    }

    /// Calculate total bytes needed for a frame of this format.
    pub fn frame_size(self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.bytes_per_pixel()
    }

    /// Reorder one pixel of this layout into RGBA.
    #[inline]
    pub fn to_rgba(self, px: [u8; 4]) -> [u8; 4] {
        match self {
            Self::Rgba8 => px,
            Self::Bgra8 => [px[2], px[1], px[0], px[3]],
        }
    }

    /// Reorder one RGBA pixel into this layout.
    #[inline]
    pub fn from_rgba(self, px: [u8; 4]) -> [u8; 4] {
        // The BGRA swap is its own inverse.
        self.to_rgba(px)
    }
}

/// A captured video frame.
///
/// The frame owns its pixel buffer. Ownership moves into the frame store on
/// submit; the engine only ever copies out of and back into it.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Capture-order identifier
    pub id: FrameId,
    /// Pixel layout of `data`
    pub format: PixelFormat,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Packed pixel data, `width * height * 4` bytes, no row padding
    pub data: Vec<u8>,
    /// When the frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Create a zeroed frame with the given dimensions and format.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self::from_raw(width, height, format, vec![0u8; format.frame_size(width, height)])
    }

    /// Wrap an existing pixel buffer. The length is not checked here;
    /// see [`Frame::has_valid_layout`].
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            id: FrameId::next(),
            format,
            width,
            height,
            data,
            timestamp: Instant::now(),
        }
    }

    /// Create a frame filled with a single RGBA color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut frame = Self::new(width, height, PixelFormat::Rgba8);
        for px in frame.pixels_mut() {
            *px = rgba;
        }
        frame
    }

    /// Number of pixels described by the dimensions.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True when the buffer length matches the dimensions exactly.
    pub fn has_valid_layout(&self) -> bool {
        !self.data.is_empty() && self.data.len() == self.format.frame_size(self.width, self.height)
    }

    /// Pixels in the frame's own layout.
    #[inline]
    pub fn pixels(&self) -> &[[u8; 4]] {
        let usable = self.data.len() / BYTES_PER_PIXEL * BYTES_PER_PIXEL;
        bytemuck::cast_slice(&self.data[..usable])
    }

    /// Mutable pixels in the frame's own layout.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        let usable = self.data.len() / BYTES_PER_PIXEL * BYTES_PER_PIXEL;
        bytemuck::cast_slice_mut(&mut self.data[..usable])
    }

    /// Read one pixel as RGBA regardless of the frame layout.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels().get(idx).map(|&px| self.format.to_rgba(px))
    }

    /// Write one RGBA pixel, converting to the frame layout.
    pub fn set_rgba(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        let format = self.format;
        if let Some(px) = self.pixels_mut().get_mut(idx) {
            *px = format.from_rgba(rgba);
        }
    }

    /// Total memory usage of the pixel buffer in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len()
    }
}

/// Arc-wrapped frame for shared, read-only handoff.
pub type SharedFrame = Arc<Frame>;

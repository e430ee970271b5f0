//! Synthetic capture source.
//!
//! Produces a moving skin-toned ellipse with per-pixel noise on a blue
//! background, so the pipeline can run without a camera.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use silk_core::{Frame, PixelFormat};

const BACKGROUND: [u8; 4] = [0, 40, 200, 255];
const SKIN: [u8; 3] = [60, 110, 200];
const NOISE: i32 = 12;
const SEED: u64 = 0x5EED_CAFE;

pub struct SyntheticCapture {
    width: u32,
    height: u32,
    format: PixelFormat,
    frame_index: u64,
    rng: StdRng,
}

impl SyntheticCapture {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            frame_index: 0,
            rng: StdRng::seed_from_u64(SEED),
        }
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    pub fn frames_captured(&self) -> u64 {
        self.frame_index
    }

    fn noise(&mut self) -> i32 {
        self.rng.gen_range(-NOISE..=NOISE)
    }

    pub fn next_frame(&mut self) -> Frame {
        let (w, h) = (self.width as f32, self.height as f32);
        let phase = self.frame_index as f32 * 0.05;
        let cx = w * (0.5 + 0.15 * phase.sin());
        let cy = h * 0.5;
        let (rx, ry) = (w * 0.2, h * 0.3);

        let mut frame = Frame::new(self.width, self.height, self.format);
        for y in 0..self.height {
            for x in 0..self.width {
                let dx = (x as f32 - cx) / rx;
                let dy = (y as f32 - cy) / ry;
                let rgba = if dx * dx + dy * dy <= 1.0 {
                    let mut px = [0, 0, 0, 255];
                    for (c, base) in px.iter_mut().zip(SKIN) {
                        *c = (base as i32 + self.noise()).clamp(0, 255) as u8;
                    }
                    px
                } else {
                    BACKGROUND
                };
                frame.set_rgba(x, y, rgba);
            }
        }

        self.frame_index += 1;
        frame
    }
}

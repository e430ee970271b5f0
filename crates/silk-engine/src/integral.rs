//! Integral images (summed-area tables) over the luma channel.
//!
//! Two tables are kept: one of values and one of squared values, so the
//! mean and variance of any axis-aligned window cost four lookups each.

use silk_core::EngineResult;

use crate::alloc::try_filled;

/// Mean and variance of a rectangular window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub variance: f64,
    pub area: u64,
}

/// Inclusive prefix sums of luma and luma² in row-major order.
#[derive(Debug, Clone)]
pub struct IntegralImage {
    width: usize,
    height: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralImage {
    /// Allocate zeroed tables for a `width x height` image.
    pub fn try_new(width: u32, height: u32) -> EngineResult<Self> {
        let len = width as usize * height as usize;
        Ok(Self {
            width: width as usize,
            height: height as usize,
            sum: try_filled(len, 0u64)?,
            sum_sq: try_filled(len, 0u64)?,
        })
    }

    /// Build tables directly from a luma plane.
    pub fn from_luma(luma: &[u8], width: u32, height: u32) -> EngineResult<Self> {
        let mut integral = Self::try_new(width, height)?;
        integral.rebuild(luma.iter().copied());
        Ok(integral)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Recompute both tables in a single row-major pass.
    ///
    /// `luma` yields values in row-major order; missing trailing values are
    /// treated as zero.
    pub fn rebuild(&mut self, luma: impl IntoIterator<Item = u8>) {
        let mut luma = luma.into_iter();
        let w = self.width;
        for y in 0..self.height {
            let mut row_sum = 0u64;
            let mut row_sum_sq = 0u64;
            for x in 0..w {
                let v = luma.next().unwrap_or(0) as u64;
                row_sum += v;
                row_sum_sq += v * v;
                let idx = y * w + x;
                if y == 0 {
                    self.sum[idx] = row_sum;
                    self.sum_sq[idx] = row_sum_sq;
                } else {
                    self.sum[idx] = self.sum[idx - w] + row_sum;
                    self.sum_sq[idx] = self.sum_sq[idx - w] + row_sum_sq;
                }
            }
        }
    }

    /// Sum and sum of squares over the inclusive window `[x0, x1] x [y0, y1]`.
    ///
    /// Coordinates must be in bounds with `x0 <= x1` and `y0 <= y1`.
    #[inline]
    pub fn window_sums(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> (u64, u64) {
        (
            Self::rect(&self.sum, self.width, x0, y0, x1, y1),
            Self::rect(&self.sum_sq, self.width, x0, y0, x1, y1),
        )
    }

    #[inline]
    fn rect(table: &[u64], w: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let at = |x: usize, y: usize| table[y * w + x];
        // Add the diagonal term before subtracting so the u64 never underflows.
        let mut total = at(x1, y1);
        if x0 > 0 && y0 > 0 {
            total += at(x0 - 1, y0 - 1);
        }
        if x0 > 0 {
            total -= at(x0 - 1, y1);
        }
        if y0 > 0 {
            total -= at(x1, y0 - 1);
        }
        total
    }

    /// Mean and variance of the square window of `radius` around `(x, y)`,
    /// clipped to the image bounds.
    #[inline]
    pub fn window_around(&self, x: usize, y: usize, radius: usize) -> WindowStats {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(self.width - 1);
        let y1 = (y + radius).min(self.height - 1);
        let area = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64;
        let (sum, sum_sq) = self.window_sums(x0, y0, x1, y1);
        let mean = sum as f64 / area as f64;
        let variance = (sum_sq as f64 / area as f64 - mean * mean).max(0.0);
        WindowStats {
            mean,
            variance,
            area,
        }
    }
}

//! Summed-area tables.
//!
//! The table is zero-padded with one extra row and column, so entry
//! `(y, x)` holds the sum of every source value strictly above row `y`
//! and strictly left of column `x`. Any rectangle sum is then four lookups.

use super::{Surface, VisionError, validate_window};
use image::GrayImage;
use rayon::prelude::*;

pub struct IntegralImage {
    width: usize,
    height: usize,
    /// (width + 1) * (height + 1) entries, row-major.
    data: Vec<u64>,
}

impl IntegralImage {
    /// Build from row-major values. Missing trailing values count as zero.
    pub fn from_values(width: usize, height: usize, values: impl IntoIterator<Item = u64>) -> Self {
        let stride = width + 1;
        let mut data = vec![0u64; stride * (height + 1)];
        let mut values = values.into_iter();

        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += values.next().unwrap_or(0);
                data[(y + 1) * stride + x + 1] = data[y * stride + x + 1] + row_sum;
            }
        }

        Self { width, height, data }
    }

    /// Integral of raw pixel intensities.
    pub fn from_gray(frame: &GrayImage) -> Self {
        Self::from_values(
            frame.width() as usize,
            frame.height() as usize,
            frame.as_raw().iter().map(|&p| p as u64),
        )
    }

    /// Integral of a 0/1 mask: 1 where `predicate` holds for the pixel.
    pub fn from_mask(frame: &GrayImage, predicate: impl Fn(u8) -> bool) -> Self {
        Self::from_values(
            frame.width() as usize,
            frame.height() as usize,
            frame.as_raw().iter().map(|&p| predicate(p) as u64),
        )
    }

    #[inline]
    fn at(&self, y: usize, x: usize) -> u64 {
        self.data[y * (self.width + 1) + x]
    }

    /// Sum of the `w`x`h` rectangle whose top-left corner is `(x, y)`.
    ///
    /// The rectangle must lie inside the source matrix.
    #[inline]
    pub fn rect_sum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        let (x1, y1) = (x + w, y + h);
        // a + d >= b + c always holds for non-negative inputs
        self.at(y1, x1) + self.at(y, x) - self.at(y, x1) - self.at(y1, x)
    }

    /// Sum of every `window`x`window` square, anchored at its top-left corner.
    ///
    /// The result has `(height - window + 1)` rows and `(width - window + 1)`
    /// columns; cell `(r, c)` covers source rows `r..r + window` and columns
    /// `c..c + window`.
    pub fn window_sums(&self, window: u32) -> Result<Surface<u64>, VisionError> {
        validate_window(window, self.width as u32, self.height as u32)?;

        let w = window as usize;
        let out_w = self.width - w + 1;
        let out_h = self.height - w + 1;
        let mut data = vec![0u64; out_w * out_h];

        data.par_chunks_mut(out_w).enumerate().for_each(|(row, cells)| {
            for (col, cell) in cells.iter_mut().enumerate() {
                *cell = self.rect_sum(col, row, w, w);
            }
        });

        Ok(Surface { width: out_w, height: out_h, data })
    }
}

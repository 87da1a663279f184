//! # Change-Region Locator
//!
//! Scores every window position by how blank the "before" frame was there
//! and how many dark pixels the "after" frame gained:
//!
//! ```text
//! whiteness = clamp((mean_before - white_threshold) / (255 - white_threshold), 0, 1)
//! density   = dark_count_after / window_area
//! score     = whiteness * density
//! ```
//!
//! The search is restricted to the central region of interest (20%..80%
//! of the score surface in each axis by default), away from toolbars and
//! window chrome. Returned centers are in frame pixel coordinates.

use super::{IntegralImage, Surface, VisionError, validate_window};
use image::GrayImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Tunables for the locator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorParams {
    /// Odd window side length in pixels.
    pub window: u32,
    /// Mean brightness at or below which a "before" window counts as not blank.
    pub white_threshold: u8,
    /// Pixels at or below this value in the "after" frame count as text.
    pub dark_threshold: u8,
    /// Start of the region of interest, as a fraction of each axis.
    pub roi_start: f64,
    /// End of the region of interest, as a fraction of each axis.
    pub roi_end: f64,
    /// Upper bound on candidates returned in multi-candidate mode.
    pub max_candidates: usize,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self {
            window: 99,
            white_threshold: 245,
            dark_threshold: 60,
            roi_start: 0.2,
            roi_end: 0.8,
            max_candidates: 5,
        }
    }
}

impl LocatorParams {
    fn validate(&self) -> Result<(), VisionError> {
        if self.white_threshold == 255 {
            return Err(VisionError::InvalidParameter(
                "white_threshold must be below 255".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.roi_start)
            || !(0.0..=1.0).contains(&self.roi_end)
            || self.roi_start >= self.roi_end
        {
            return Err(VisionError::InvalidParameter(format!(
                "roi bounds {}..{} must satisfy 0 <= start < end <= 1",
                self.roi_start, self.roi_end
            )));
        }
        Ok(())
    }
}

/// Selection policy for [`locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateMode {
    /// Global maximum within the ROI, returned even when its score is zero.
    Best,
    /// Non-overlapping positive-score maxima, highest first.
    Multi,
    /// `Multi`, or the `Best` center when nothing scores above zero.
    MultiOrBest,
}

/// Window center judged likely to hold newly appeared text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub x: u32,
    pub y: u32,
    pub score: f64,
}

/// Half-open bounds on the score surface: rows `top..bottom`, cols `left..right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl Roi {
    /// Central region of a `width`x`height` surface.
    pub fn central(
        width: usize,
        height: usize,
        start: f64,
        end: f64,
    ) -> Result<Self, VisionError> {
        let roi = Self {
            top: (height as f64 * start) as usize,
            bottom: ((height as f64 * end) as usize).min(height),
            left: (width as f64 * start) as usize,
            right: ((width as f64 * end) as usize).min(width),
        };
        if roi.bottom <= roi.top || roi.right <= roi.left {
            return Err(VisionError::EmptyRegion(width, height));
        }
        Ok(roi)
    }
}

/// Per-window `whiteness(before) * density(after)` scores.
pub fn score_surface(
    before: &GrayImage,
    after: &GrayImage,
    params: &LocatorParams,
) -> Result<Surface<f64>, VisionError> {
    if before.dimensions() != after.dimensions() {
        let (bw, bh) = before.dimensions();
        let (aw, ah) = after.dimensions();
        return Err(VisionError::ShapeMismatch(bw, bh, aw, ah));
    }
    let (width, height) = before.dimensions();
    validate_window(params.window, width, height)?;
    params.validate()?;

    let area = (params.window as f64) * (params.window as f64);
    let brightness = IntegralImage::from_gray(before).window_sums(params.window)?;
    let dark_threshold = params.dark_threshold;
    let dark = IntegralImage::from_mask(after, |p| p <= dark_threshold).window_sums(params.window)?;

    let white = params.white_threshold as f64;
    let span = 255.0 - white;
    let data = brightness
        .data
        .par_iter()
        .zip(dark.data.par_iter())
        .map(|(&sum, &count)| {
            let mean = sum as f64 / area;
            let whiteness = ((mean - white) / span).clamp(0.0, 1.0);
            whiteness * (count as f64 / area)
        })
        .collect();

    Ok(Surface {
        width: brightness.width,
        height: brightness.height,
        data,
    })
}

fn center_of(row: usize, col: usize, window: u32, score: f64) -> Candidate {
    let half = (window / 2) as usize;
    Candidate {
        x: (col + half) as u32,
        y: (row + half) as u32,
        score,
    }
}

/// Highest-scoring position in the ROI. Ties go to the first in row-major order.
fn argmax_in(
    surface: &Surface<f64>,
    roi: &Roi,
    skip: impl Fn(usize, usize) -> bool,
) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for row in roi.top..roi.bottom {
        for col in roi.left..roi.right {
            let score = surface.get(row, col);
            if best.is_some_and(|(_, _, s)| score <= s) || skip(row, col) {
                continue;
            }
            best = Some((row, col, score));
        }
    }
    best
}

/// Center of the single best window in the ROI of `surface`.
///
/// A zero score is still returned; callers decide whether it is plausible.
pub fn best_on(surface: &Surface<f64>, params: &LocatorParams) -> Result<Candidate, VisionError> {
    let roi = Roi::central(surface.width, surface.height, params.roi_start, params.roi_end)?;
    let (row, col, score) = argmax_in(surface, &roi, |_, _| false)
        .ok_or(VisionError::EmptyRegion(surface.width, surface.height))?;
    Ok(center_of(row, col, params.window, score))
}

/// Centers of up to `max_candidates` non-overlapping windows, best first.
///
/// Greedy non-maximum suppression: the highest positive score in the ROI is
/// taken, then every window overlapping it (closer than one window side in
/// both axes) is excluded, and so on. Returns an empty list when nothing
/// scores above zero.
pub fn candidates_on(
    surface: &Surface<f64>,
    params: &LocatorParams,
) -> Result<Vec<Candidate>, VisionError> {
    let roi = Roi::central(surface.width, surface.height, params.roi_start, params.roi_end)?;
    let w = params.window as usize;

    let mut accepted: Vec<(usize, usize)> = Vec::new();
    let mut candidates = Vec::new();

    while candidates.len() < params.max_candidates {
        let overlaps = |row: usize, col: usize| {
            accepted
                .iter()
                .any(|&(r, c)| row.abs_diff(r) < w && col.abs_diff(c) < w)
        };
        match argmax_in(surface, &roi, overlaps) {
            Some((row, col, score)) if score > 0.0 => {
                accepted.push((row, col));
                candidates.push(center_of(row, col, params.window, score));
            }
            _ => break,
        }
    }

    Ok(candidates)
}

/// Select centers from an already computed score surface.
fn pick(
    surface: &Surface<f64>,
    params: &LocatorParams,
    mode: LocateMode,
) -> Result<Vec<(u32, u32)>, VisionError> {
    let found = match mode {
        LocateMode::Best => vec![best_on(surface, params)?],
        LocateMode::Multi => candidates_on(surface, params)?,
        LocateMode::MultiOrBest => {
            let found = candidates_on(surface, params)?;
            if found.is_empty() {
                log::warn!("No window scored above zero; falling back to the best window");
                vec![best_on(surface, params)?]
            } else {
                found
            }
        }
    };
    Ok(found.into_iter().map(|c| (c.x, c.y)).collect())
}

/// Candidate centers as `(x, y)` pixel coordinates.
pub fn locate(
    before: &GrayImage,
    after: &GrayImage,
    params: &LocatorParams,
    mode: LocateMode,
) -> Result<Vec<(u32, u32)>, VisionError> {
    let surface = score_surface(before, after, params)?;
    pick(&surface, params, mode)
}

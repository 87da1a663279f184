//! # Change-Region Vision
//!
//! Locates the places where dark text appeared on a previously blank
//! (near-white) part of the screen, by comparing a "before" and "after"
//! grayscale capture.
//!
//! ## Submodules
//! - [`integral`]: summed-area tables and windowed sums
//! - [`locator`]: whiteness/darkness score surface and candidate extraction
//!
//! Both frames are plain [`image::GrayImage`] buffers (row-major, origin
//! top-left). Windows are square with an odd side length and are anchored
//! at their top-left corner on every [`Surface`].

pub mod integral;
pub mod locator;


pub use integral::IntegralImage;
pub use locator::{LocateMode, LocatorParams, locate};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VisionError {
    #[error("Window size {window} must be odd, positive and fit the {width}x{height} frame")]
    InvalidWindow { window: u32, width: u32, height: u32 },
    #[error("Frame shapes differ: before is {0}x{1}, after is {2}x{3}")]
    ShapeMismatch(u32, u32, u32, u32),
    #[error("Region of interest is empty for a {0}x{1} score surface")]
    EmptyRegion(usize, usize),
    #[error("Invalid locator parameter: {0}")]
    InvalidParameter(String),
}

/// Dense row-major matrix, one value per window position.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface<T> {
    pub width: usize,
    pub height: usize,
    pub data: Vec<T>,
}

impl<T: Copy> Surface<T> {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.width + col]
    }
}

/// Checks that `window` is odd, positive and fits inside a `width`x`height` frame.
pub fn validate_window(window: u32, width: u32, height: u32) -> Result<(), VisionError> {
    if window == 0 || window % 2 == 0 || window > width || window > height {
        return Err(VisionError::InvalidWindow { window, width, height });
    }
    Ok(())
}

//! # OS Automation Boundary
//!
//! Everything the drawing workflow needs from the desktop goes through
//! [`AutomationBackend`]: screen capture, hotkeys, clipboard text and
//! pointer clicks.
//!
//! ## Submodules
//! - [`keys`]: hotkey name parsing into enigo keys
//! - [`desktop`]: the real backend (enigo + xcap + arboard)
//! - [`artifacts`]: timestamped debug screenshots

pub mod artifacts;
pub mod desktop;
pub mod keys;

#[cfg(test)]
pub mod scripted;

pub use desktop::DesktopBackend;
pub use keys::Hotkey;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Screen capture failed: {0}")]
    CaptureFailure(String),
    #[error("No display available for capture")]
    NoDisplay,
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),
    #[error("No primary key specified for hotkey {0:?}")]
    NoPrimaryKey(Vec<String>),
    #[error("Only one primary key supported in hotkey {0:?}")]
    MultiplePrimaryKeys(Vec<String>),
    #[error("Unknown key name '{0}'")]
    UnknownKey(String),
    #[error("Input synthesis failed: {0}")]
    Input(String),
}

/// Screen rectangle in frame pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Desktop operations consumed by the drawing workflow.
///
/// Coordinates passed to [`click`](Self::click) are in the pixel space of
/// frames returned by [`capture_screen`](Self::capture_screen).
pub trait AutomationBackend {
    /// Grayscale capture of the main display, or of `region` of it.
    /// `label` only tags the debug artifact.
    fn capture_screen(
        &mut self,
        region: Option<CaptureRegion>,
        label: &str,
    ) -> Result<GrayImage, AutomationError>;

    /// Press modifiers, click exactly one primary key, release modifiers.
    fn send_keys(&mut self, keys: &[String]) -> Result<(), AutomationError>;

    /// Current clipboard text; empty when the clipboard holds no text.
    fn read_clipboard(&mut self) -> Result<String, AutomationError>;

    fn write_clipboard(&mut self, text: &str) -> Result<(), AutomationError>;

    fn click(&mut self, x: u32, y: u32) -> Result<(), AutomationError>;
}

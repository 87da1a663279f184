//! Real desktop backend.
//!
//! - Capture: primary monitor via `xcap`, grayscale via `image`
//! - Input: `enigo` keyboard and mouse events
//! - Clipboard: `arboard`
//!
//! Captures are in physical pixels. Mouse events take logical points, so
//! click coordinates are divided by the monitor scale factor (2.0 on
//! Retina displays) before the pointer is moved.

use super::artifacts::DebugArtifacts;
use super::{AutomationBackend, AutomationError, CaptureRegion, Hotkey};
use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use image::{GrayImage, RgbaImage};
use std::thread;
use std::time::Duration;
use xcap::Monitor;

/// Side of the red box drawn on click screenshots.
const CLICK_MARKER_SIZE: u32 = 100;

pub struct DesktopBackend {
    enigo: Enigo,
    clipboard: Option<arboard::Clipboard>,
    artifacts: DebugArtifacts,
    /// Pause between pressing modifiers and clicking the primary key.
    key_settle: Duration,
}

fn primary_monitor() -> Result<Monitor, AutomationError> {
    let monitors = Monitor::all().map_err(|e| AutomationError::CaptureFailure(e.to_string()))?;
    let index = monitors
        .iter()
        .position(|m| m.is_primary().unwrap_or(false))
        .unwrap_or(0);
    monitors.into_iter().nth(index).ok_or(AutomationError::NoDisplay)
}

fn capture_rgba(monitor: &Monitor) -> Result<RgbaImage, AutomationError> {
    monitor
        .capture_image()
        .map_err(|e| AutomationError::CaptureFailure(e.to_string()))
}

impl DesktopBackend {
    pub fn new(artifacts: DebugArtifacts, key_settle: Duration) -> Result<Self, AutomationError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| AutomationError::Input(e.to_string()))?;
        Ok(Self {
            enigo,
            clipboard: None,
            artifacts,
            key_settle,
        })
    }

    fn clipboard(&mut self) -> Result<&mut arboard::Clipboard, AutomationError> {
        if self.clipboard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| AutomationError::ClipboardUnavailable(e.to_string()))?;
            self.clipboard = Some(clipboard);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| {
                AutomationError::ClipboardUnavailable("clipboard not initialised".into())
            })
    }
}

impl AutomationBackend for DesktopBackend {
    fn capture_screen(
        &mut self,
        region: Option<CaptureRegion>,
        label: &str,
    ) -> Result<GrayImage, AutomationError> {
        let monitor = primary_monitor()?;
        let screen = capture_rgba(&monitor)?;
        if screen.width() == 0 || screen.height() == 0 {
            return Err(AutomationError::CaptureFailure("empty image".into()));
        }
        self.artifacts.save_capture(&screen, label);

        let gray = image::imageops::grayscale(&screen);
        log::debug!("Captured {} ({}x{})", label, gray.width(), gray.height());

        match region {
            None => Ok(gray),
            Some(r) => {
                let x = r.x.min(gray.width());
                let y = r.y.min(gray.height());
                let width = r.width.min(gray.width() - x);
                let height = r.height.min(gray.height() - y);
                if width == 0 || height == 0 {
                    return Err(AutomationError::CaptureFailure(format!(
                        "region {:?} is off-screen",
                        r
                    )));
                }
                Ok(image::imageops::crop_imm(&gray, x, y, width, height).to_image())
            }
        }
    }

    fn send_keys(&mut self, keys: &[String]) -> Result<(), AutomationError> {
        let hotkey = Hotkey::parse(keys)?;
        log::info!("Hotkey {}", keys.join("+"));

        let input = |e: enigo::InputError| AutomationError::Input(e.to_string());
        for key in &hotkey.modifiers {
            self.enigo.key(*key, Direction::Press).map_err(input)?;
        }
        if !hotkey.modifiers.is_empty() {
            thread::sleep(self.key_settle);
        }
        let clicked = self.enigo.key(hotkey.primary, Direction::Click).map_err(input);
        // Always release modifiers, even if the primary key failed.
        for key in hotkey.modifiers.iter().rev() {
            let _ = self.enigo.key(*key, Direction::Release);
        }
        clicked
    }

    fn read_clipboard(&mut self) -> Result<String, AutomationError> {
        match self.clipboard()?.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(AutomationError::ClipboardUnavailable(e.to_string())),
        }
    }

    fn write_clipboard(&mut self, text: &str) -> Result<(), AutomationError> {
        self.clipboard()?
            .set_text(text.to_string())
            .map_err(|e| AutomationError::ClipboardUnavailable(e.to_string()))
    }

    fn click(&mut self, x: u32, y: u32) -> Result<(), AutomationError> {
        let monitor = primary_monitor()?;
        let scale = monitor.scale_factor().unwrap_or(1.0) as f64;
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let origin_x = monitor.x().unwrap_or(0);
        let origin_y = monitor.y().unwrap_or(0);

        let point_x = origin_x + (x as f64 / scale) as i32;
        let point_y = origin_y + (y as f64 / scale) as i32;
        log::info!("Click at pixel ({}, {}) -> point ({}, {})", x, y, point_x, point_y);

        self.enigo
            .move_mouse(point_x, point_y, Coordinate::Abs)
            .map_err(|e| AutomationError::Input(e.to_string()))?;
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| AutomationError::Input(e.to_string()))?;

        match capture_rgba(&monitor) {
            Ok(screen) => {
                self.artifacts.save_click(&screen, x, y, CLICK_MARKER_SIZE);
            }
            Err(e) => log::warn!("Click screenshot failed: {}", e),
        }
        Ok(())
    }
}

//! Debug screenshots written as a side effect of captures and clicks.
//!
//! Nothing here is part of the output contract; failures to write are
//! logged and otherwise ignored.

use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::PathBuf;

const MARKER_THICKNESS: u32 = 3;

pub struct DebugArtifacts {
    dir: PathBuf,
    enabled: bool,
}

impl DebugArtifacts {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            dir: dir.into(),
            enabled,
        }
    }

    fn timestamped(&self, prefix: &str) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
        self.dir.join(format!("{}_{}.png", prefix, timestamp))
    }

    fn save(&self, image: &RgbImage, prefix: &str) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            log::warn!("Debug artifact dir {}: {}", self.dir.display(), e);
            return None;
        }
        let path = self.timestamped(prefix);
        match image.save(&path) {
            Ok(()) => {
                log::debug!("Saved debug artifact {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::warn!("Failed to save debug artifact {}: {}", path.display(), e);
                None
            }
        }
    }

    /// `screenshot_main_<label>_<timestamp>.png`
    pub fn save_capture(&self, screen: &RgbaImage, label: &str) -> Option<PathBuf> {
        let rgb = DynamicImage::ImageRgba8(screen.clone()).to_rgb8();
        self.save(&rgb, &format!("screenshot_main_{}", label))
    }

    /// `click_full_<timestamp>.png` with a red box of side `size` at the click.
    pub fn save_click(&self, screen: &RgbaImage, x: u32, y: u32, size: u32) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        let mut rgb = DynamicImage::ImageRgba8(screen.clone()).to_rgb8();
        draw_click_marker(&mut rgb, x, y, size);
        self.save(&rgb, "click_full")
    }
}

/// Draw a red hollow square of side `size` centered at `(x, y)`, clipped to the image.
pub fn draw_click_marker(image: &mut RgbImage, x: u32, y: u32, size: u32) {
    if image.width() == 0 || image.height() == 0 {
        return;
    }
    let half = size / 2;
    let left = x.saturating_sub(half).min(image.width() - 1);
    let top = y.saturating_sub(half).min(image.height() - 1);
    let right = (x + half).min(image.width() - 1);
    let bottom = (y + half).min(image.height() - 1);

    for inset in 0..MARKER_THICKNESS {
        if left + inset > right.saturating_sub(inset)
            || top + inset > bottom.saturating_sub(inset)
        {
            break;
        }
        let w = right - left - 2 * inset + 1;
        let h = bottom - top - 2 * inset + 1;
        let rect = Rect::at((left + inset) as i32, (top + inset) as i32).of_size(w, h);
        draw_hollow_rect_mut(image, rect, Rgb([255, 0, 0]));
    }
}

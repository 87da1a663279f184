//! Application settings, persisted as `settings.json`.
//!
//! Lookup order: `./settings.json`, then
//! `<config_dir>/chemdraw_autoname/settings.json`, then built-in defaults.
//! Every field has a default, so partial files are fine.

use crate::automation::CaptureRegion;
use crate::vision::LocatorParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE: &str = "settings.json";

/// Settle delays in milliseconds.
///
/// These are empirically tuned waits for the drawing application and the OS
/// clipboard to catch up with synthesized input. They are not a
/// synchronization guarantee: a slow machine can outrun them and produce
/// stale captures or stale clipboard reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub paste_settle_ms: u64,
    pub render_settle_ms: u64,
    pub click_settle_ms: u64,
    pub copy_settle_ms: u64,
    pub key_settle_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            paste_settle_ms: 10,
            render_settle_ms: 1000,
            click_settle_ms: 150,
            copy_settle_ms: 500,
            key_settle_ms: 50,
        }
    }
}

impl Timing {
    /// All delays zero, for scripted runs.
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            paste_settle_ms: 0,
            render_settle_ms: 0,
            click_settle_ms: 0,
            copy_settle_ms: 0,
            key_settle_ms: 0,
        }
    }

    pub fn paste_settle(&self) -> Duration {
        Duration::from_millis(self.paste_settle_ms)
    }

    pub fn render_settle(&self) -> Duration {
        Duration::from_millis(self.render_settle_ms)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }

    pub fn copy_settle(&self) -> Duration {
        Duration::from_millis(self.copy_settle_ms)
    }

    pub fn key_settle(&self) -> Duration {
        Duration::from_millis(self.key_settle_ms)
    }
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Key combinations sent to the drawing application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotkeys {
    pub paste: Vec<String>,
    pub copy: Vec<String>,
    /// Converts the pasted structure and shows its name.
    pub new_document: Vec<String>,
    pub select_all: Vec<String>,
    pub clear: Vec<String>,
}

impl Default for Hotkeys {
    fn default() -> Self {
        Self {
            paste: keys(&["command", "v"]),
            copy: keys(&["command", "c"]),
            new_document: keys(&["option", "command", "n"]),
            select_all: keys(&["command", "a"]),
            clear: keys(&["backspace"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub locator: LocatorParams,
    pub timing: Timing,
    /// Vertical offset for retry clicks around each candidate.
    pub jitter_px: u32,
    pub hotkeys: Hotkeys,
    /// Restrict captures to this part of the screen (e.g. the drawing
    /// window). Click coordinates are translated back to the full screen.
    pub capture_region: Option<CaptureRegion>,
    /// Key that starts a batch once pressed and released. Empty starts
    /// immediately.
    pub trigger_key: String,
    /// Token written into names in place of the substituted inert gas.
    pub placeholder: String,
    /// Attachment-point marker in input SMILES.
    pub wildcard: String,
    pub debug_dir: PathBuf,
    pub save_debug_artifacts: bool,
    /// Abort the batch when no copied value ever differed from the input.
    pub fail_on_unverified: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locator: LocatorParams::default(),
            timing: Timing::default(),
            jitter_px: 8,
            hotkeys: Hotkeys::default(),
            capture_region: None,
            trigger_key: "space".to_string(),
            placeholder: "[Chemical_bond]".to_string(),
            wildcard: "*".to_string(),
            debug_dir: PathBuf::from("."),
            save_debug_artifacts: true,
            fail_on_unverified: false,
        }
    }
}

impl Settings {
    /// Candidate settings file locations, in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(SETTINGS_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("chemdraw_autoname").join(SETTINGS_FILE));
        }
        paths
    }

    /// Load from the first readable file in [`search_paths`](Self::search_paths).
    /// When none exists, the defaults are written to `./settings.json` for editing.
    pub fn load() -> Self {
        for path in Self::search_paths() {
            if let Some(settings) = Self::load_from(&path) {
                return settings;
            }
        }
        let defaults = Self::default();
        let local = Path::new(SETTINGS_FILE);
        // A malformed local file is left alone for the user to fix.
        if !local.exists() {
            log::info!("No settings file found, writing defaults to {}", SETTINGS_FILE);
            if let Err(e) = defaults.save_to(local) {
                log::warn!("Could not write default settings: {:#}", e);
            }
        }
        defaults
    }

    /// Parse one file. Missing files yield `None`; malformed files are
    /// logged and also yield `None`.
    pub fn load_from(path: &Path) -> Option<Self> {
        let json = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str::<Settings>(&json) {
            Ok(settings) => {
                log::info!("Settings loaded from {}", path.display());
                Some(settings)
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

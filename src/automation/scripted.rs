//! Deterministic in-memory backend for tests.
//!
//! Frames and clipboard reads are replayed from queues; every call is
//! recorded in [`ScriptedBackend::calls`].

use super::{AutomationBackend, AutomationError, CaptureRegion, Hotkey};
use image::GrayImage;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Capture(String),
    Keys(String),
    Read,
    Write(String),
    Click(u32, u32),
}

#[derive(Default)]
pub struct ScriptedBackend {
    pub frames: VecDeque<GrayImage>,
    /// Values returned by successive clipboard reads. When empty, a read
    /// returns whatever was last written.
    pub reads: VecDeque<String>,
    pub clipboard: String,
    pub calls: Vec<Call>,
    /// When set, every clipboard access fails.
    pub clipboard_down: bool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copies(&self) -> usize {
        self.calls.iter().filter(|c| **c == Call::Read).count()
    }

    pub fn clicks(&self) -> Vec<(u32, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Click(x, y) => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }
}

impl AutomationBackend for ScriptedBackend {
    fn capture_screen(
        &mut self,
        _region: Option<CaptureRegion>,
        label: &str,
    ) -> Result<GrayImage, AutomationError> {
        self.calls.push(Call::Capture(label.to_string()));
        self.frames
            .pop_front()
            .ok_or_else(|| {
                AutomationError::CaptureFailure(format!("no scripted frame for {}", label))
            })
    }

    fn send_keys(&mut self, keys: &[String]) -> Result<(), AutomationError> {
        Hotkey::parse(keys)?;
        self.calls.push(Call::Keys(keys.join("+")));
        Ok(())
    }

    fn read_clipboard(&mut self) -> Result<String, AutomationError> {
        self.calls.push(Call::Read);
        if self.clipboard_down {
            return Err(AutomationError::ClipboardUnavailable("scripted outage".into()));
        }
        if let Some(next) = self.reads.pop_front() {
            self.clipboard = next;
        }
        Ok(self.clipboard.clone())
    }

    fn write_clipboard(&mut self, text: &str) -> Result<(), AutomationError> {
        self.calls.push(Call::Write(text.to_string()));
        if self.clipboard_down {
            return Err(AutomationError::ClipboardUnavailable("scripted outage".into()));
        }
        self.clipboard = text.to_string();
        Ok(())
    }

    fn click(&mut self, x: u32, y: u32) -> Result<(), AutomationError> {
        self.calls.push(Call::Click(x, y));
        Ok(())
    }
}

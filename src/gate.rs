//! Manual "ready" barrier before a batch starts.
//!
//! The user switches to the drawing application, opens a blank document and
//! taps the trigger key. There is no signal from the application itself.

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, unbounded};
use rdev::{EventType, Key, listen};
use std::sync::Arc;
use std::thread;

pub trait ReadyGate {
    /// Block until the batch may start.
    fn wait_ready(&self) -> Result<()>;
}

/// Opens immediately.
pub struct ImmediateGate;

impl ReadyGate for ImmediateGate {
    fn wait_ready(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    Pressed,
    Released,
}

/// Opens once the trigger key has been pressed and released.
pub struct TriggerKeyGate {
    name: String,
    rx: Receiver<KeyEdge>,
}

/// Map a settings key name to an rdev key.
pub fn trigger_key(name: &str) -> Option<Key> {
    let key = match name.to_lowercase().as_str() {
        "space" | " " => Key::Space,
        "return" | "enter" => Key::Return,
        "escape" | "esc" => Key::Escape,
        "tab" => Key::Tab,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        _ => return None,
    };
    Some(key)
}

impl TriggerKeyGate {
    /// Spawn the global key listener. The listener thread lives for the
    /// rest of the process.
    pub fn new(name: &str) -> Result<Self> {
        let key = trigger_key(name).ok_or_else(|| anyhow!("Unsupported trigger key '{}'", name))?;
        let (tx, rx) = unbounded();

        thread::spawn(move || {
            if let Err(error) = listen(move |event| {
                let edge = match event.event_type {
                    EventType::KeyPress(k) if k == key => KeyEdge::Pressed,
                    EventType::KeyRelease(k) if k == key => KeyEdge::Released,
                    _ => return,
                };
                let _ = tx.send(edge);
            }) {
                log::error!("Trigger key listener failed: {:?}", error);
            }
        });

        Ok(Self {
            name: name.to_string(),
            rx,
        })
    }
}

/// Gate for the configured trigger key; an empty name opens immediately.
pub fn build_gate(trigger: &str) -> Result<Arc<dyn ReadyGate + Send + Sync>> {
    if trigger.trim().is_empty() {
        return Ok(Arc::new(ImmediateGate));
    }
    Ok(Arc::new(TriggerKeyGate::new(trigger.trim())?))
}

/// Wait for a press followed by a release. Stray releases are ignored.
pub fn wait_press_release(rx: &Receiver<KeyEdge>) -> Result<()> {
    let mut pressed = false;
    loop {
        match rx.recv() {
            Ok(KeyEdge::Pressed) => pressed = true,
            Ok(KeyEdge::Released) if pressed => return Ok(()),
            Ok(KeyEdge::Released) => {}
            Err(_) => return Err(anyhow!("Trigger key listener stopped")),
        }
    }
}

impl ReadyGate for TriggerKeyGate {
    fn wait_ready(&self) -> Result<()> {
        // Drop edges from before the batch was submitted.
        while self.rx.try_recv().is_ok() {}
        log::info!("Waiting for '{}' to start the batch...", self.name);
        wait_press_release(&self.rx)?;
        log::info!("Trigger received.");
        Ok(())
    }
}

//! Hotkey parsing.
//!
//! A hotkey is written as an ordered list of key names, e.g.
//! `["option", "command", "n"]`: any number of modifiers and exactly one
//! primary key.

use super::AutomationError;
use enigo::Key;

/// Modifier names recognised in hotkeys.
pub fn modifier_key(name: &str) -> Option<Key> {
    match name.to_lowercase().as_str() {
        "shift" | "lshift" => Some(Key::Shift),
        "control" | "ctrl" | "ctl" | "lcontrol" => Some(Key::Control),
        "alt" | "option" | "opt" | "lalt" => Some(Key::Alt),
        "meta" | "command" | "cmd" | "win" | "super" => Some(Key::Meta),
        _ => None,
    }
}

/// Convert a non-modifier key name to an enigo Key variant.
pub fn primary_key(name: &str) -> Option<Key> {
    match name.to_lowercase().as_str() {
        // Navigation keys
        "up" | "uparrow" => Some(Key::UpArrow),
        "down" | "downarrow" => Some(Key::DownArrow),
        "left" | "leftarrow" => Some(Key::LeftArrow),
        "right" | "rightarrow" => Some(Key::RightArrow),
        "home" => Some(Key::Home),
        "end" => Some(Key::End),

        // Special keys
        "return" | "enter" => Some(Key::Return),
        "escape" | "esc" => Some(Key::Escape),
        "tab" => Some(Key::Tab),
        "backspace" | "back" => Some(Key::Backspace),
        "delete" | "del" => Some(Key::Delete),
        "space" | " " => Some(Key::Space),

        // Letters, digits and punctuation
        _ if name.chars().count() == 1 => name.to_lowercase().chars().next().map(Key::Unicode),

        _ => None,
    }
}

/// Parsed hotkey: modifiers in press order plus one primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotkey {
    pub modifiers: Vec<Key>,
    pub primary: Key,
}

impl Hotkey {
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, AutomationError> {
        let owned = || names.iter().map(|n| n.as_ref().to_string()).collect::<Vec<_>>();

        let mut modifiers = Vec::new();
        let mut primary = None;
        for name in names {
            let name = name.as_ref();
            if let Some(key) = modifier_key(name) {
                modifiers.push(key);
                continue;
            }
            let key = primary_key(name)
                .ok_or_else(|| AutomationError::UnknownKey(name.to_string()))?;
            if primary.replace(key).is_some() {
                return Err(AutomationError::MultiplePrimaryKeys(owned()));
            }
        }

        let primary = primary.ok_or_else(|| AutomationError::NoPrimaryKey(owned()))?;
        Ok(Self { modifiers, primary })
    }
}

//! # Click-and-Copy Verification
//!
//! Clicks candidate points, copies, and checks whether the clipboard now
//! holds something other than the text that was pasted in. The pasted
//! text is still on the clipboard when a click lands on background, so an
//! unchanged clipboard means "missed".
//!
//! Each candidate is tried at its center, then `jitter_px` above, then
//! `jitter_px` below, before moving on to the next candidate.

use crate::automation::{AutomationBackend, AutomationError};
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VerifyError {
    #[error(
        "No copied value differed from the input after {attempts} attempts (last value: {value:?})"
    )]
    Unverified { attempts: usize, value: String },
}

pub struct VerifyConfig<'a> {
    pub copy_keys: &'a [String],
    pub jitter_px: u32,
    pub click_settle: Duration,
    pub copy_settle: Duration,
}

/// Outcome of a verification run.
#[derive(Debug, Clone, PartialEq)]
pub struct Harvest {
    /// Last value read from the clipboard, or the input when nothing was tried.
    pub value: String,
    /// Number of click/copy attempts made.
    pub attempts: usize,
    /// True when `value` differs from the input and is not blank.
    pub verified: bool,
    /// Point whose click produced `value`.
    pub point: Option<(u32, u32)>,
}

impl Harvest {
    pub fn into_verified(self) -> Result<String, VerifyError> {
        if self.verified {
            Ok(self.value)
        } else {
            Err(VerifyError::Unverified {
                attempts: self.attempts,
                value: self.value,
            })
        }
    }
}

/// Center, above, below.
pub fn retry_points((x, y): (u32, u32), jitter: u32) -> [(u32, u32); 3] {
    [(x, y), (x, y.saturating_sub(jitter)), (x, y.saturating_add(jitter))]
}

fn is_new_content(value: &str, original: &str) -> bool {
    value != original && !value.trim().is_empty()
}

/// Drive click -> copy -> compare until the clipboard changes.
///
/// Never fails on a miss: when every point is exhausted, the last value is
/// returned with `verified == false` and the caller decides what to do.
pub fn harvest<B: AutomationBackend + ?Sized>(
    backend: &mut B,
    candidates: &[(u32, u32)],
    original: &str,
    config: &VerifyConfig,
) -> Result<Harvest, AutomationError> {
    let mut result = Harvest {
        value: original.to_string(),
        attempts: 0,
        verified: false,
        point: None,
    };

    for (rank, &center) in candidates.iter().enumerate() {
        for point in retry_points(center, config.jitter_px) {
            backend.click(point.0, point.1)?;
            thread::sleep(config.click_settle);
            backend.send_keys(config.copy_keys)?;
            thread::sleep(config.copy_settle);

            let value = backend.read_clipboard()?;
            result.attempts += 1;
            result.point = Some(point);
            log::debug!(
                "Attempt {} (candidate {}) at {:?}: {:?}",
                result.attempts,
                rank,
                point,
                value
            );

            if is_new_content(&value, original) {
                log::info!("Copied new content after {} attempts", result.attempts);
                result.value = value;
                result.verified = true;
                return Ok(result);
            }
            result.value = value;
        }
    }

    log::warn!(
        "No click produced new content after {} attempts; returning last value",
        result.attempts
    );
    Ok(result)
}

//! # Drawing Pipeline
//!
//! Per molecule, strictly in sequence:
//!
//! 1. Substitute the wildcard placeholder
//! 2. Write the SMILES to the clipboard and paste it (with a debug
//!    capture of the untouched canvas when artifacts are enabled)
//! 3. Capture the screen ("before")
//! 4. Send the naming command and wait for the name to render
//! 5. Capture the screen ("after") and locate the new text
//! 6. Click/copy until the clipboard changes (see [`crate::verify`])
//! 7. Clear the canvas and restore the placeholder in the name
//!
//! A batch reads one SMILES per line and writes every record to
//! `<input>.json` only after the last molecule succeeds. Any error aborts
//! the whole batch and nothing is written.

pub mod events;

#[cfg(test)]
mod test_batch;

pub use events::BatchEvent;

use crate::automation::AutomationBackend;
use crate::gate::ReadyGate;
use crate::placeholder;
use crate::settings::Settings;
use crate::verify::{self, VerifyConfig};
use crate::vision::{self, LocateMode};
use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::thread;

/// One output record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingRecord {
    pub smiles: String,
    pub iupac_name: String,
}

pub struct DrawingWorkflow<'a, B: AutomationBackend + ?Sized> {
    backend: &'a mut B,
    settings: &'a Settings,
}

impl<'a, B: AutomationBackend + ?Sized> DrawingWorkflow<'a, B> {
    pub fn new(backend: &'a mut B, settings: &'a Settings) -> Self {
        Self { backend, settings }
    }

    /// Ranked click targets in screen pixels: every positive candidate, or
    /// the single best window when nothing scored above zero.
    fn click_targets(&self, before: &GrayImage, after: &GrayImage) -> Result<Vec<(u32, u32)>> {
        let mut targets =
            vision::locate(before, after, &self.settings.locator, LocateMode::MultiOrBest)?;
        log::info!("Located {} target(s): {:?}", targets.len(), targets);

        // Frames are relative to the capture region.
        if let Some(region) = self.settings.capture_region {
            for (x, y) in targets.iter_mut() {
                *x += region.x;
                *y += region.y;
            }
        }
        Ok(targets)
    }

    /// Draw one molecule and harvest its name.
    pub fn draw(&mut self, smiles: &str) -> Result<DrawingRecord> {
        let settings = self.settings;
        let hotkeys = &settings.hotkeys;
        let timing = &settings.timing;

        let substitution = placeholder::substitute(smiles, &settings.wildcard)?;
        if let Some(gas) = substitution.gas {
            log::info!("Wildcard replaced with {}: {}", gas.symbol, substitution.smiles);
        }

        self.backend.write_clipboard(&substitution.smiles)?;
        if settings.save_debug_artifacts {
            // Only kept as a debug screenshot of the canvas before pasting.
            if let Err(e) = self.backend.capture_screen(settings.capture_region, "beforepaste") {
                log::warn!("beforepaste capture failed: {}", e);
            }
        }
        self.backend.send_keys(&hotkeys.paste)?;
        thread::sleep(timing.paste_settle());
        let before = self.backend.capture_screen(settings.capture_region, "afterpaste")?;

        self.backend.send_keys(&hotkeys.new_document)?;
        thread::sleep(timing.render_settle());
        let after = self.backend.capture_screen(settings.capture_region, "afterstart")?;

        let targets = self.click_targets(&before, &after)?;
        let config = VerifyConfig {
            copy_keys: &hotkeys.copy,
            jitter_px: settings.jitter_px,
            click_settle: timing.click_settle(),
            copy_settle: timing.copy_settle(),
        };
        let harvest = verify::harvest(&mut *self.backend, &targets, &substitution.smiles, &config)?;

        self.backend.send_keys(&hotkeys.select_all)?;
        self.backend.send_keys(&hotkeys.clear)?;

        if let Some(point) = harvest.point {
            log::debug!("Last click at {:?} after {} attempt(s)", point, harvest.attempts);
        }

        let name = if settings.fail_on_unverified {
            harvest.into_verified()?
        } else {
            if !harvest.verified {
                log::warn!("Name for {} is unverified: {:?}", smiles, harvest.value);
            }
            harvest.value
        };

        let iupac_name = match substitution.gas {
            Some(gas) => placeholder::restore(&name, gas, &settings.placeholder),
            None => name,
        };

        Ok(DrawingRecord {
            smiles: smiles.to_string(),
            iupac_name,
        })
    }
}

/// Non-blank lines, trimmed.
pub fn parse_smiles(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn read_smiles_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read SMILES file {}", path.display()))?;
    Ok(parse_smiles(&text))
}

/// `<input>.json`, keeping the input's own extension.
pub fn output_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Pretty JSON array with 4-space indentation.
pub fn write_records(path: &Path, records: &[DrawingRecord]) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records
        .serialize(&mut serializer)
        .context("Failed to serialize records")?;
    std::fs::write(path, buf).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn emit(events: &Sender<BatchEvent>, message: String) {
    log::info!("{}", message);
    let _ = events.send(BatchEvent::Log(message));
}

/// Run a whole file and return the path of the written JSON.
pub fn run_batch<B: AutomationBackend + ?Sized>(
    backend: &mut B,
    gate: &dyn ReadyGate,
    settings: &Settings,
    input: &Path,
    events: &Sender<BatchEvent>,
) -> Result<PathBuf> {
    let molecules = read_smiles_file(input)?;
    let total = molecules.len();
    emit(events, format!("Loaded {} SMILES from {}", total, input.display()));

    gate.wait_ready()?;
    emit(events, "Batch started.".to_string());

    let mut records = Vec::with_capacity(total);
    let mut workflow = DrawingWorkflow::new(backend, settings);
    for (index, smiles) in molecules.iter().enumerate() {
        let record = workflow
            .draw(smiles)
            .with_context(|| format!("Molecule {} of {} ({})", index + 1, total, smiles))?;
        emit(
            events,
            format!("[{}/{}] {} -> {}", index + 1, total, record.smiles, record.iupac_name),
        );
        records.push(record);
        let _ = events.send(BatchEvent::Progress {
            done: index + 1,
            total,
        });
    }

    let output = output_path(input);
    write_records(&output, &records)?;
    emit(events, format!("Results saved to {}", output.display()));
    Ok(output)
}

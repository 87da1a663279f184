//! Minimal form: SMILES file path, Submit, status line and log.
//!
//! The batch runs on a worker thread that owns the desktop backend and
//! streams [`BatchEvent`]s back over a crossbeam channel.

use crate::automation::DesktopBackend;
use crate::automation::artifacts::DebugArtifacts;
use crate::gate::{self, ReadyGate};
use crate::pipeline::{self, BatchEvent};
use crate::settings::Settings;
use crossbeam_channel::{Receiver, Sender, unbounded};
use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

pub struct AutoNameApp {
    settings: Settings,
    input_path: String,
    status: String,
    logs: Vec<String>,
    progress: Option<(usize, usize)>,
    event_receiver: Option<Receiver<BatchEvent>>,
    gate: Result<Arc<dyn ReadyGate + Send + Sync>, String>,
}

/// Check the typed path before starting a batch.
pub fn validate_input(text: &str) -> Result<PathBuf, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Enter the path of a SMILES file.".to_string());
    }
    let path = PathBuf::from(trimmed);
    if !path.is_file() {
        return Err(format!("File not found: {}", trimmed));
    }
    Ok(path)
}

fn run_desktop_batch(
    settings: &Settings,
    gate: &dyn ReadyGate,
    input: &Path,
    events: &Sender<BatchEvent>,
) -> anyhow::Result<PathBuf> {
    let artifacts = DebugArtifacts::new(&settings.debug_dir, settings.save_debug_artifacts);
    let mut backend = DesktopBackend::new(artifacts, settings.timing.key_settle())?;
    pipeline::run_batch(&mut backend, gate, settings, input, events)
}

impl AutoNameApp {
    pub fn new(settings: Settings) -> Self {
        let gate = gate::build_gate(&settings.trigger_key).map_err(|e| format!("{:#}", e));
        if let Err(e) = &gate {
            log::error!("{}", e);
        }
        let status = if settings.trigger_key.trim().is_empty() {
            "Enter a SMILES file path and press Submit. The batch starts immediately.".to_string()
        } else {
            format!(
                "Enter a SMILES file path and press Submit, then switch to ChemDraw, \
                 open a blank document and press '{}'.",
                settings.trigger_key
            )
        };
        Self {
            settings,
            input_path: String::new(),
            status,
            logs: Vec::new(),
            progress: None,
            event_receiver: None,
            gate,
        }
    }

    /// Open a native dialog for the SMILES file.
    fn browse(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Select SMILES file")
            .add_filter("Text Files", &["txt"])
            .pick_file()
        {
            self.use_picked_file(path);
        }
    }

    fn use_picked_file(&mut self, path: PathBuf) {
        self.input_path = path.display().to_string();
        self.status = format!("Selected {}", self.input_path);
    }

    fn is_running(&self) -> bool {
        self.event_receiver.is_some()
    }

    fn submit(&mut self) {
        let input = match validate_input(&self.input_path) {
            Ok(path) => path,
            Err(message) => {
                self.status = message;
                return;
            }
        };
        let gate = match &self.gate {
            Ok(gate) => gate.clone(),
            Err(e) => {
                self.status = format!("Error: {}", e);
                return;
            }
        };

        let (tx, rx) = unbounded();
        let settings = self.settings.clone();
        self.status = format!(
            "Running... results will be written to {}",
            pipeline::output_path(&input).display()
        );
        self.progress = None;
        self.event_receiver = Some(rx);

        thread::spawn(move || {
            let result = run_desktop_batch(&settings, gate.as_ref(), &input, &tx)
                .map_err(|e| format!("{:#}", e));
            if let Err(e) = &result {
                log::error!("Batch failed: {}", e);
            }
            let _ = tx.send(BatchEvent::Finished(result));
        });
    }

    fn poll_events(&mut self) {
        let Some(rx) = &self.event_receiver else {
            return;
        };
        let mut finished = false;
        for event in rx.try_iter() {
            match event {
                BatchEvent::Log(line) => self.logs.push(line),
                BatchEvent::Progress { done, total } => self.progress = Some((done, total)),
                BatchEvent::Finished(Ok(path)) => {
                    self.status = format!("Results saved to {}", path.display());
                    finished = true;
                }
                BatchEvent::Finished(Err(e)) => {
                    self.status = format!("Error: {}", e);
                    finished = true;
                }
            }
        }
        if finished {
            self.event_receiver = None;
        }
    }
}

impl eframe::App for AutoNameApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();
        if self.is_running() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(&self.status);
            ui.separator();

            let running = self.is_running();
            ui.horizontal(|ui| {
                ui.label("SMILES file:");
                ui.text_edit_singleline(&mut self.input_path);
                if ui.add_enabled(!running, egui::Button::new("Browse…")).clicked() {
                    self.browse();
                }
            });

            if ui.add_enabled(!running, egui::Button::new("Submit")).clicked() {
                self.submit();
            }
            if let Some((done, total)) = self.progress {
                ui.label(format!("{} / {} molecules", done, total));
            }

            ui.separator();
            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    for line in &self.logs {
                        ui.monospace(line);
                    }
                });
        });
    }
}

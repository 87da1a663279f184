mod app;
mod automation;
mod gate;
mod pipeline;
mod placeholder;
mod settings;
mod verify;
mod vision;

use app::AutoNameApp;
use eframe::egui;
use settings::Settings;

fn main() -> eframe::Result<()> {
    env_logger::init();
    let settings = Settings::load();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Auto IUPAC",
        native_options,
        Box::new(|_cc| Ok(Box::new(AutoNameApp::new(settings)))),
    )
}

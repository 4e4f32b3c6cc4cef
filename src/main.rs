mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::PriceLensApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Archive path from argv, falling back to ./data.zip when present.
    let archive = std::env::args().nth(1).map(PathBuf::from).or_else(|| {
        let default = PathBuf::from("data.zip");
        default.exists().then_some(default)
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Price Lens – Price Evolution Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(PriceLensApp::new(archive)))),
    )
}

use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PriceLensApp {
    pub state: AppState,
}

impl PriceLensApp {
    /// Create the app, loading `archive` up front when one was given.
    pub fn new(archive: Option<PathBuf>) -> Self {
        let mut state = AppState::default();
        if let Some(path) = archive {
            state.open_archive(path);
        }
        Self { state }
    }
}

impl eframe::App for PriceLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: data table ----
        egui::TopBottomPanel::bottom("data_table")
            .default_height(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                table::data_table(ui, &self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::price_plot(ui, &self.state);
        });
    }
}

use std::path::Path;

use anyhow::Context as _;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::export;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: date range, hour range, source selection,
/// CSV download.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.table.is_none() {
        ui.label("No archive loaded.");
        return;
    }

    // Date / hour widgets mutate the criteria in place; refilter once after.
    let mut changed = false;
    if let Some(criteria) = &mut state.criteria {
        ui.strong("Date range");
        ui.label("Start date");
        changed |= ui
            .add(DatePickerButton::new(&mut criteria.start_date).id_salt("start_date"))
            .changed();
        ui.label("End date");
        changed |= ui
            .add(DatePickerButton::new(&mut criteria.end_date).id_salt("end_date"))
            .changed();
        ui.separator();

        ui.strong("Hour range");
        changed |= ui
            .add(egui::Slider::new(&mut criteria.start_hour, 0..=23).text("Start hour"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut criteria.end_hour, 0..=23).text("End hour"))
            .changed();
        ui.separator();
    }
    if changed {
        state.refilter();
    }

    if let Some(err) = &state.range_error {
        ui.colored_label(Color32::RED, err.to_string());
        ui.separator();
    }

    // Clone the source list so state methods can be called in the loop.
    let sources = state
        .table
        .as_ref()
        .map(|t| t.sources.clone())
        .unwrap_or_default();

    ui.strong("Sources");
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all_sources();
        }
        if ui.small_button("None").clicked() {
            state.select_no_sources();
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for source in &sources {
                let mut checked = state
                    .criteria
                    .as_ref()
                    .is_some_and(|c| c.selected_sources.contains(source));

                let mut text = RichText::new(source);
                if let Some(cm) = &state.color_map {
                    text = text.color(cm.color_for(source));
                }

                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_source(source);
                }
            }
        });

    ui.separator();

    let can_export = state.range_error.is_none();
    if ui
        .add_enabled(can_export, egui::Button::new("Download data as CSV"))
        .clicked()
    {
        save_csv_dialog(state);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open archive…").clicked() {
                open_archive_dialog(state);
                ui.close_menu();
            }
            let has_archive = state.archive_path.is_some();
            if ui
                .add_enabled(has_archive, egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} rows loaded, {} visible",
                table.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_archive_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open price archive")
        .add_filter("Zip archive", &["zip"])
        .pick_file();

    if let Some(path) = file {
        state.open_archive(path);
    }
}

fn save_csv_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name("price_evolution_data.csv")
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    match write_csv(state, &path) {
        Ok(n) => {
            log::info!("exported {n} rows to {}", path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("CSV export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn write_csv(state: &AppState, path: &Path) -> anyhow::Result<usize> {
    let view = state.filtered_view().context("no data to export")?;
    let csv_text = export::to_csv(&view)?;
    std::fs::write(path, csv_text).with_context(|| format!("writing {}", path.display()))?;
    Ok(view.len())
}

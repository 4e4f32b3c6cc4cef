use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::loader::REQUIRED_COLUMNS;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Data table (bottom panel)
// ---------------------------------------------------------------------------

/// Render the filtered rows verbatim, in unified-table column order.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let table = match &state.table {
        Some(t) => t,
        None => return,
    };
    if state.range_error.is_some() {
        return;
    }

    let indices = &state.visible_indices;

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(160.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for name in REQUIRED_COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, indices.len(), |mut row| {
                let obs = &table.rows[indices[row.index()]];
                row.col(|ui: &mut Ui| {
                    ui.label(obs.timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(obs.price.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(obs.volume.map(|v| v.to_string()).unwrap_or_default());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&obs.source);
                });
            });
        });
}

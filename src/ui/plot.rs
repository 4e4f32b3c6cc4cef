use std::collections::BTreeMap;

use chrono::DateTime;
use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Price plot (central panel)
// ---------------------------------------------------------------------------

/// Render the price-evolution chart: one line per source among the
/// currently visible rows, x = timestamp, y = normalized price.
pub fn price_plot(ui: &mut Ui, state: &AppState) {
    let table = match &state.table {
        Some(t) => t,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open an archive to view prices  (File → Open archive…)");
            });
            return;
        }
    };

    if state.range_error.is_some() {
        // The side panel shows the validation message; no chart until the
        // range is fixed.
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("End date must fall after start date.");
        });
        return;
    }

    // Group visible rows into one series per source.
    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for &idx in &state.visible_indices {
        let obs = &table.rows[idx];
        series.entry(obs.source.as_str()).or_default().push([
            obs.timestamp.and_utc().timestamp() as f64,
            obs.price,
        ]);
    }

    Plot::new("price_plot")
        .legend(Legend::default())
        .x_axis_label("Timestamp")
        .y_axis_label("Price (divided by 100,000,000)")
        .x_axis_formatter(|mark, _range| format_timestamp(mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (source, mut points) in series {
                // Rows arrive in table order; lines need time order.
                points.sort_by(|a, b| a[0].total_cmp(&b[0]));

                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(source))
                    .unwrap_or(Color32::LIGHT_BLUE);

                let line = Line::new(PlotPoints::from(points))
                    .name(source)
                    .color(color)
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}

fn format_timestamp(value: f64) -> String {
    DateTime::from_timestamp(value as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

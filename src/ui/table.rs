use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::to_color32;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Station list (bottom panel)
// ---------------------------------------------------------------------------

/// Tabulate the stations currently on the map.
pub fn station_table(ui: &mut Ui, state: &AppState) {
    let points = &state.map.points;
    if points.is_empty() {
        ui.label("No stations match the current selection.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(140.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(110.0))
        .column(Column::auto().at_least(160.0))
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Project", "Station", "Platform", "Instrument_Type", "Lat", "Lon"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, points.len(), |mut row| {
                let point = &points[row.index()];
                row.col(|ui| {
                    let mut text = RichText::new(state.catalog.legend_label(&point.project));
                    if let Some(entry) = state.map.legend_for(&point.project) {
                        text = text.color(to_color32(entry.rgb, 1.0));
                    }
                    ui.label(text).on_hover_text(point.project.as_str());
                });
                row.col(|ui| {
                    ui.label(point.station.as_str());
                });
                row.col(|ui| {
                    ui.label(point.platform.as_str());
                });
                row.col(|ui| {
                    ui.label(point.instruments.to_string());
                });
                row.col(|ui| {
                    ui.label(format!("{:.3}", point.lat));
                });
                row.col(|ui| {
                    ui.label(format!("{:.3}", point.lon));
                });
            });
        });
}

use eframe::egui;

use crate::state::AppState;
use crate::ui::{map, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct StationMapApp {
    pub state: AppState,
}

impl StationMapApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for StationMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: instrument / project selection ----
        egui::SidePanel::left("selection_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: project details ----
        egui::SidePanel::right("details_panel")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::details_panel(ui, &self.state);
            });

        // ---- Bottom panel: stations on the map ----
        egui::TopBottomPanel::bottom("station_table")
            .default_height(180.0)
            .resizable(true)
            .show(ctx, |ui| {
                table::station_table(ui, &self.state);
            });

        // ---- Central panel: map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            map::station_map(ui, &mut self.state);
        });

        // ---- Screenshot requested by "Save map as PNG…" ----
        let screenshot = ctx.input(|i| {
            i.raw.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        if let Some(image) = screenshot {
            self.state.save_figure(&image, ctx.pixels_per_point());
        }
    }
}

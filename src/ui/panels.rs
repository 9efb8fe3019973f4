use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::to_color32;
use crate::figure::FIGURE_FILE_NAME;
use crate::map::MapStyle;
use crate::state::AppState;

const NO_SELECTION: &str =
    "No project selected. Please select a project or instrument to view details.";

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if !state.config.introduction.is_empty() {
                ui.label(state.config.introduction.as_str());
                ui.separator();
            }

            // ---- Instruments ----
            ui.heading("Instrument Type Selection");
            ui.label("Choose the instruments to filter by:");
            for instrument in state.instrument_options() {
                let mut checked = state.selection.has_instrument(&instrument);
                if ui.checkbox(&mut checked, instrument.as_str()).changed() {
                    state.toggle_instrument(&instrument);
                }
            }
            if !state.selection.instruments().is_empty() && ui.small_button("Clear").clicked() {
                state.clear_instruments();
            }
            ui.separator();

            // ---- Projects ----
            ui.heading("Project Selection");
            ui.label("Choose the projects to display on the map:");
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_projects();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_projects();
                }
            });
            let options = state.project_options();
            if options.is_empty() {
                ui.label(RichText::new("No project carries the selected instruments.").italics());
            }
            for project in options {
                let mut checked = state.selection.has_project(&project);
                let mut text = RichText::new(state.catalog.legend_label(&project));
                if let Some(entry) = state.map.legend_for(&project) {
                    text = text.color(to_color32(entry.rgb, 1.0));
                }
                if ui.checkbox(&mut checked, text).on_hover_text(project.as_str()).changed() {
                    state.toggle_project(&project);
                }
            }
            ui.separator();

            // ---- Basemap style ----
            ui.strong("Map style");
            let mut style = state.style;
            egui::ComboBox::from_id_salt("map_style")
                .selected_text(style.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for option in MapStyle::ALL {
                        ui.selectable_value(&mut style, option, option.label());
                    }
                });
            if style != state.style {
                state.set_style(style);
            }
            ui.separator();

            // ---- Resources ----
            if !state.config.resources.is_empty() {
                ui.heading("Resources");
                for resource in &state.config.resources {
                    ui.hyperlink_to(resource.label.as_str(), &resource.url);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Right side panel – project details
// ---------------------------------------------------------------------------

/// Render one collapsible description per relevant project.
pub fn details_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("PROJECT DETAILS");
    ui.separator();

    let projects = state.detail_projects();
    if projects.is_empty() {
        ui.label(NO_SELECTION);
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for project in &projects {
                egui::CollapsingHeader::new(RichText::new(state.catalog.heading(project)).strong())
                    .id_salt(project)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.label(state.catalog.description(project));
                        if let Some(url) = state.catalog.data_url(project) {
                            ui.add_space(4.0);
                            ui.horizontal_wrapped(|ui: &mut Ui| {
                                ui.label("For more details, you can visit the");
                                ui.hyperlink_to("data source", url);
                            });
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export map as JSON…").clicked() {
                export_map_dialog(state);
                ui.close_menu();
            }
            let save_png = ui.add_enabled(
                state.dataset.is_some(),
                egui::Button::new("Save map as PNG…"),
            );
            if save_png.clicked() {
                save_figure_dialog(ui.ctx(), state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong(state.config.title.as_str());
        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} stations loaded, {} on map",
                ds.len(),
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

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sampling stations")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_map_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export map")
        .set_file_name("sampling_stations_map.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match state.export_map(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Map export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

/// Ask for a destination, then request a screenshot; the app saves it when
/// it arrives on a later frame.
pub fn save_figure_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save map figure")
        .set_file_name(FIGURE_FILE_NAME)
        .add_filter("PNG", &["png"])
        .save_file();

    if let Some(path) = file {
        state.pending_figure = Some(path);
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
    }
}

use eframe::egui::{Align2, Color32, Pos2, RichText, Stroke, Ui, Vec2b};
use egui_plot::{
    Legend, Line, MarkerShape, Plot, PlotBounds, PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::color::to_color32;
use crate::map::MapPoint;
use crate::state::AppState;

/// Hover radius around a marker, in screen pixels.
const HOVER_RADIUS_PX: f32 = 10.0;

// ---------------------------------------------------------------------------
// Station map (central panel)
// ---------------------------------------------------------------------------

/// Render the station map in the central panel.
pub fn station_map(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        state.map_rect = None;
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a station table to view the map  (File → Open…)");
        });
        return;
    }

    let mut reset = std::mem::take(&mut state.reset_view);
    let spec = &state.map;

    ui.horizontal(|ui: &mut Ui| {
        ui.heading(spec.title.as_str());
        if ui.small_button("Reset view").clicked() {
            reset = true;
        }
    });

    let basemap = spec.style.basemap_colors();
    let water = Color32::from_rgb(basemap.water[0], basemap.water[1], basemap.water[2]);
    let coast = Color32::from_rgb(basemap.coast[0], basemap.coast[1], basemap.coast[2]);

    let size = ui.available_size();
    let (view_min, view_max) = spec.viewport(size.x as f64, size.y as f64);

    let response = Plot::new("station_map")
        .legend(Legend::default())
        .x_axis_label("Longitude (°E)")
        .y_axis_label("Latitude (°N)")
        .label_formatter(|_name, value| format!("{:.2}°E  {:.2}°N", value.x, value.y))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        // The water layer tracks the visible bounds, so never auto-fit to it.
        .auto_bounds(Vec2b::FALSE)
        .allow_double_click_reset(false)
        .show(ui, |plot_ui| {
            if reset {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(view_min, view_max));
            }

            // ---- Basemap ----
            let bounds = plot_ui.plot_bounds();
            let [x0, y0] = bounds.min();
            let [x1, y1] = bounds.max();
            plot_ui.polygon(
                Polygon::new(PlotPoints::from(vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]]))
                    .fill_color(water)
                    .stroke(Stroke::NONE),
            );
            for outline in &state.coastline {
                plot_ui.line(
                    Line::new(PlotPoints::from(outline.clone()))
                        .color(coast)
                        .width(1.2),
                );
            }

            // ---- Stations, one series per project ----
            for entry in &spec.legend {
                let positions: Vec<[f64; 2]> = spec
                    .points
                    .iter()
                    .filter(|p| p.project == entry.project)
                    .map(|p| [p.lon, p.lat])
                    .collect();
                plot_ui.points(
                    Points::new(positions)
                        .name(&entry.label)
                        .color(to_color32(entry.rgb, spec.marker.opacity))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(spec.marker.size / 2.0),
                );
            }

            // ---- Hover details ----
            let Some(pointer) = plot_ui.pointer_coordinate() else {
                return;
            };
            let pointer_px = plot_ui.screen_from_plot(pointer);
            let hovered = nearest_station(&spec.points, pointer_px, HOVER_RADIUS_PX, |p| {
                plot_ui.screen_from_plot(PlotPoint::new(p.lon, p.lat))
            });
            if let Some(point) = hovered {
                let label = RichText::new(hover_text(point)).strong();
                plot_ui.text(
                    Text::new(PlotPoint::new(point.lon, point.lat), label)
                        .anchor(Align2::LEFT_BOTTOM),
                );
            }
        });
    state.map_rect = Some(response.response.rect);
}

/// The marker closest to `pointer` within `radius` screen pixels.
fn nearest_station<'a>(
    points: &'a [MapPoint],
    pointer: Pos2,
    radius: f32,
    to_screen: impl Fn(&MapPoint) -> Pos2,
) -> Option<&'a MapPoint> {
    points
        .iter()
        .map(|p| (p, to_screen(p).distance(pointer)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}

fn hover_text(point: &MapPoint) -> String {
    format!(
        "  {}\n  Platform: {}\n  Instrument_Type: {}",
        point.station, point.platform, point.instruments
    )
}

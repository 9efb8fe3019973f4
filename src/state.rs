use std::path::{Path, PathBuf};

use anyhow::Context;
use eframe::egui::{ColorImage, Rect};

use crate::basemap::{self, Outline};
use crate::config::DashboardConfig;
use crate::data::filter::{filtered_indices, Selection};
use crate::data::loader;
use crate::data::model::{StationDataset, StationRecord};
use crate::figure;
use crate::map::{self, MapSpec, MapStyle};
use crate::projects::ProjectCatalog;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Display metadata per project.
    pub catalog: ProjectCatalog,

    /// Loaded station table (None until a file loads).
    pub dataset: Option<StationDataset>,

    /// Current project / instrument choice.
    pub selection: Selection,

    /// Indices of stations passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    pub style: MapStyle,

    /// Map for the current selection (cached).
    pub map: MapSpec,

    pub coastline: Vec<Outline>,

    /// Set when the map changed and the plot should jump to its centre/zoom.
    pub reset_view: bool,

    /// Where to save the next screenshot as a figure, once it arrives.
    pub pending_figure: Option<PathBuf>,

    /// Screen area of the map plot in the last frame, in points.
    pub map_rect: Option<Rect>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let catalog = config.catalog();
        let style = config.map_style;
        let mut state = Self {
            config,
            catalog,
            dataset: None,
            selection: Selection::default(),
            visible_indices: Vec::new(),
            style,
            map: MapSpec::default(),
            coastline: basemap::embedded_outlines(),
            reset_view: true,
            pending_figure: None,
            map_rect: None,
            status_message: None,
        };
        state.select_offered_projects();
        state.refresh();
        state
    }

    /// Ingest a newly loaded dataset and recompute the map. Every offered
    /// project starts selected.
    pub fn set_dataset(&mut self, dataset: StationDataset) {
        self.dataset = Some(dataset);
        self.select_offered_projects();
        self.status_message = None;
        self.refresh();
    }

    fn select_offered_projects(&mut self) {
        let offered = self.project_options();
        self.selection.set_projects(offered);
    }

    /// Apply an instrument change. When the offered projects change, the
    /// project choice goes back to all of them.
    fn change_instruments(&mut self, change: impl FnOnce(&mut Selection)) {
        let before = self.project_options();
        change(&mut self.selection);
        if self.project_options() != before {
            self.select_offered_projects();
        }
        self.refresh();
    }

    /// Load a station table, reporting failures in the status bar.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} stations from {} ({} projects)",
                    dataset.len(),
                    path.display(),
                    dataset.project_names().len()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error loading {}: {e}", path.display()));
            }
        }
    }

    /// Recompute `visible_indices` and the map after a selection change.
    pub fn refresh(&mut self) {
        let records: &[StationRecord] = self
            .dataset
            .as_ref()
            .map_or(&[][..], |ds| ds.records.as_slice());
        self.visible_indices = filtered_indices(records, &self.selection);
        self.map = map::render(
            self.visible_indices.iter().map(|&i| &records[i]),
            &self.selection,
            &self.catalog,
            self.style,
        );
        self.reset_view = true;
        log::debug!(
            "selection {:?} / {:?}: {} stations, zoom {}",
            self.selection.projects(),
            self.selection.instruments(),
            self.visible_indices.len(),
            self.map.zoom
        );
    }

    pub fn visible_records(&self) -> impl Iterator<Item = &StationRecord> {
        let records = self.dataset.as_ref().map_or(&[][..], |ds| &ds.records[..]);
        self.visible_indices.iter().map(move |&i| &records[i])
    }

    /// Instruments to offer: the configured list, then any others found in
    /// the data.
    pub fn instrument_options(&self) -> Vec<String> {
        let mut options = self.config.instruments.clone();
        if let Some(ds) = &self.dataset {
            for inst in ds.instrument_types() {
                if !options.contains(inst) {
                    options.push(inst.clone());
                }
            }
        }
        options
    }

    /// Projects to offer: every known project, or only those carrying a
    /// selected instrument.
    pub fn project_options(&self) -> Vec<String> {
        if !self.selection.instruments().is_empty() {
            return self
                .dataset
                .as_ref()
                .map(|ds| ds.projects_with_instruments(self.selection.instruments()))
                .unwrap_or_default();
        }
        let mut options: Vec<String> = self.catalog.names().map(str::to_string).collect();
        if let Some(ds) = &self.dataset {
            for project in ds.project_names() {
                if !options.contains(project) {
                    options.push(project.clone());
                }
            }
        }
        options
    }

    /// Projects whose detail panels are shown: the selected ones, else those
    /// relevant to the selected instruments.
    pub fn detail_projects(&self) -> Vec<String> {
        if !self.selection.projects().is_empty() {
            return self.selection.projects().to_vec();
        }
        match &self.dataset {
            Some(ds) if !self.selection.instruments().is_empty() => {
                ds.projects_with_instruments(self.selection.instruments())
            }
            _ => Vec::new(),
        }
    }

    pub fn toggle_instrument(&mut self, instrument: &str) {
        self.change_instruments(|selection| selection.toggle_instrument(instrument));
    }

    pub fn clear_instruments(&mut self) {
        self.change_instruments(Selection::clear_instruments);
    }

    pub fn toggle_project(&mut self, project: &str) {
        if self.selection.has_project(project) {
            self.selection.remove_project(project);
        } else {
            self.selection.add_project(project.to_string());
        }
        self.refresh();
    }

    /// Select every offered project.
    pub fn select_all_projects(&mut self) {
        for project in self.project_options() {
            self.selection.add_project(project);
        }
        self.refresh();
    }

    /// Deselect all projects.
    pub fn select_no_projects(&mut self) {
        self.selection.clear_projects();
        self.refresh();
    }

    pub fn set_style(&mut self, style: MapStyle) {
        self.style = style;
        self.map.style = style;
    }

    /// Write the current map as pretty-printed JSON.
    pub fn export_map(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.map).context("serializing map")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing map to {}", path.display()))?;
        log::info!("Exported {} map points to {}", self.map.points.len(), path.display());
        Ok(())
    }

    /// Save the map part of a window screenshot to the pending figure path.
    pub fn save_figure(&mut self, screen: &ColorImage, pixels_per_point: f32) {
        let Some(path) = self.pending_figure.take() else {
            return;
        };
        let saved = figure::figure_image(screen, self.map_rect, pixels_per_point)
            .and_then(|image| figure::save_png(&image, &path));
        match saved {
            Ok(()) => {
                log::info!("Saved map figure to {}", path.display());
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Saving the map figure failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, Color32};
    use tempfile::tempdir;

    use super::*;
    use crate::data::model::tests::station;

    const SAMBA: &str = "South Atlantic Meridional Overturning Circulation Basin-wide Array";
    const IEP: &str = "Integrated Ecosystem Programme: Southern Benguela";

    fn state() -> AppState {
        let mut state = AppState::new(DashboardConfig::embedded().unwrap());
        state.set_dataset(StationDataset::from_records(vec![
            station(IEP, "iep-1", "CTD, Bongo", -33.0, 17.5),
            station(IEP, "iep-2", "TSG", -34.0, 18.0),
            station(SAMBA, "samba-1", "CTD, ADCP", -34.5, 10.0),
            station("Z", "z-1", "UTR", -30.0, 31.0),
        ]));
        state
    }

    #[test]
    fn starts_with_every_project_selected() {
        let state = state();
        assert_eq!(state.selection.projects().len(), 5);
        assert_eq!(state.visible_indices, vec![0, 1, 2, 3]);
        assert_eq!(state.map.legend.len(), 3);
        assert_eq!(state.map.zoom, 3.7);
        assert_eq!(state.detail_projects().len(), 5);
    }

    #[test]
    fn nothing_selected_gives_an_empty_map() {
        let mut state = state();
        state.select_no_projects();
        assert!(state.visible_indices.is_empty());
        assert!(state.map.is_empty());
        assert_eq!(state.map.zoom, map::DEFAULT_ZOOM);
        assert!(state.detail_projects().is_empty());
    }

    #[test]
    fn project_options_include_unconfigured_projects() {
        let state = state();
        let options = state.project_options();
        assert_eq!(options.len(), 5);
        assert_eq!(options.last().map(String::as_str), Some("Z"));
    }

    #[test]
    fn instrument_choice_narrows_and_reselects_projects() {
        let mut state = state();
        state.toggle_project(IEP);
        assert!(!state.selection.has_project(IEP));

        state.toggle_instrument("CTD");
        assert_eq!(state.project_options(), vec![IEP, SAMBA]);
        assert_eq!(state.selection.projects(), [IEP.to_string(), SAMBA.to_string()]);
        assert_eq!(state.visible_indices, vec![0, 2]);

        // Same offered projects: the user's choice stays.
        state.toggle_project(SAMBA);
        state.toggle_instrument("Bongo");
        assert_eq!(state.selection.projects(), [IEP.to_string()]);
        assert_eq!(state.visible_indices, vec![0]);

        state.clear_instruments();
        assert_eq!(state.selection.projects().len(), 5);
        assert_eq!(state.visible_indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn instrument_only_selection_shows_relevant_details() {
        let mut state = state();
        state.toggle_instrument("ADCP");
        state.select_no_projects();
        assert_eq!(state.detail_projects(), vec![SAMBA]);
        assert_eq!(state.map.zoom, 3.7);
        let stations: Vec<&str> = state.visible_records().map(|r| r.station.as_str()).collect();
        assert_eq!(stations, vec!["samba-1"]);
    }

    #[test]
    fn select_all_then_none() {
        let mut state = state();
        state.select_no_projects();
        state.select_all_projects();
        assert_eq!(state.visible_indices.len(), 4);
        assert_eq!(state.map.legend.len(), 3);
        state.select_no_projects();
        assert!(state.map.is_empty());
    }

    #[test]
    fn load_failure_sets_status_and_keeps_data() {
        let mut state = state();
        state.load_path(Path::new("does/not/exist.csv"));
        assert!(state.status_message.is_some());
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(4));
    }

    #[test]
    fn bundled_station_table_loads() {
        let mut state = AppState::new(DashboardConfig::embedded().unwrap());
        state.load_path(Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/data/sampling_stations.csv"
        )));
        assert!(state.status_message.is_none());
        let ds = state.dataset.as_ref().unwrap();
        assert_eq!(ds.project_names().len(), 4);
        assert!(ds
            .project_names()
            .iter()
            .all(|p| state.catalog.get(p).is_some()));
    }

    #[test]
    fn style_change_keeps_points_and_exports() {
        let mut state = state();
        state.select_no_projects();
        state.toggle_project(IEP);
        state.set_style(MapStyle::CartoDarkmatter);
        assert_eq!(state.map.style, MapStyle::CartoDarkmatter);
        assert_eq!(state.map.points.len(), 2);

        let dir = tempdir().unwrap();
        let path = dir.path().join("map.json");
        state.export_map(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["style"], "carto-darkmatter");
        assert_eq!(json["points"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn screenshot_is_saved_once_as_figure() {
        let mut state = state();
        let dir = tempdir().unwrap();
        let path = dir.path().join("figure.png");
        let screen = ColorImage::new([28, 16], Color32::WHITE);

        state.save_figure(&screen, 1.0);
        assert!(!path.exists(), "no figure was requested");

        state.pending_figure = Some(path.clone());
        state.map_rect = Some(Rect::from_min_max(pos2(0.0, 0.0), pos2(14.0, 8.0)));
        state.save_figure(&screen, 1.0);
        assert!(state.pending_figure.is_none());
        assert!(state.status_message.is_none());
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn empty_map_area_reports_an_error() {
        let mut state = state();
        state.pending_figure = Some(PathBuf::from("unused.png"));
        state.map_rect = Some(Rect::from_min_max(pos2(4.0, 4.0), pos2(4.0, 4.0)));
        state.save_figure(&ColorImage::new([28, 16], Color32::WHITE), 1.0);
        assert!(state.status_message.is_some());
    }
}

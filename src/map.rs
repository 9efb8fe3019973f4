//! Turns a filtered set of stations into a renderable map description.
//!
//! [`render`] is pure: the GUI draws whatever [`MapSpec`] it returns, and the
//! same value can be written out as JSON for an external charting tool.

use serde::{Deserialize, Serialize};

use crate::color::ColorMap;
use crate::data::filter::Selection;
use crate::data::model::{Instruments, StationRecord};
use crate::projects::ProjectCatalog;

pub const DEFAULT_ZOOM: f64 = 4.8;

/// Centre used when there is nothing to show (southern Africa).
pub const EMPTY_CENTER: GeoPoint = GeoPoint {
    lat: -31.0,
    lon: 23.0,
};

pub const EMPTY_TITLE: &str = "No Data Available";
pub const STATIONS_TITLE: &str = "Sampling Stations for Selected Projects";

/// Web-mercator tile size in pixels that zoom levels refer to.
const TILE_SIZE_PX: f64 = 512.0;

// ---------------------------------------------------------------------------
// Basemap style
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapStyle {
    #[default]
    OpenStreetMap,
    CartoPositron,
    CartoDarkmatter,
    WhiteBg,
}

impl MapStyle {
    pub const ALL: [MapStyle; 4] = [
        MapStyle::OpenStreetMap,
        MapStyle::CartoPositron,
        MapStyle::CartoDarkmatter,
        MapStyle::WhiteBg,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MapStyle::OpenStreetMap => "OpenStreetMap",
            MapStyle::CartoPositron => "Carto Positron",
            MapStyle::CartoDarkmatter => "Carto Dark Matter",
            MapStyle::WhiteBg => "White",
        }
    }

    /// Ocean and coastline colours for the basemap.
    pub fn basemap_colors(self) -> BasemapColors {
        match self {
            MapStyle::OpenStreetMap => BasemapColors {
                water: [170, 211, 223],
                coast: [120, 150, 170],
            },
            MapStyle::CartoPositron => BasemapColors {
                water: [212, 218, 220],
                coast: [180, 180, 180],
            },
            MapStyle::CartoDarkmatter => BasemapColors {
                water: [38, 38, 38],
                coast: [90, 90, 90],
            },
            MapStyle::WhiteBg => BasemapColors {
                water: [255, 255, 255],
                coast: [160, 160, 160],
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasemapColors {
    pub water: [u8; 3],
    pub coast: [u8; 3],
}

// ---------------------------------------------------------------------------
// MapSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One station marker with its hover details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    pub project: String,
    pub station: String,
    pub platform: String,
    pub instruments: Instruments,
}

/// A project's legend entry and marker colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub project: String,
    pub label: String,
    pub rgb: [u8; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub size: f32,
    pub opacity: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size: 8.0,
            opacity: 0.7,
        }
    }
}

/// Everything needed to draw the station map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSpec {
    pub title: String,
    pub points: Vec<MapPoint>,
    pub center: GeoPoint,
    pub zoom: f64,
    pub legend: Vec<LegendEntry>,
    pub style: MapStyle,
    pub marker: MarkerStyle,
}

impl Default for MapSpec {
    fn default() -> Self {
        render(
            std::iter::empty(),
            &Selection::default(),
            &ProjectCatalog::default(),
            MapStyle::default(),
        )
    }
}

impl MapSpec {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn legend_for(&self, project: &str) -> Option<&LegendEntry> {
        self.legend.iter().find(|e| e.project == project)
    }

    /// Longitude/latitude bounds visible in a `width` × `height` pixel view
    /// at this map's centre and zoom, as `([lon_min, lat_min], [lon_max, lat_max])`.
    pub fn viewport(&self, width_px: f64, height_px: f64) -> ([f64; 2], [f64; 2]) {
        let deg_per_px = 360.0 / (TILE_SIZE_PX * 2f64.powf(self.zoom));
        let half_lon = width_px * 0.5 * deg_per_px;
        let half_lat = height_px * 0.5 * deg_per_px * self.center.lat.to_radians().cos();
        (
            [self.center.lon - half_lon, self.center.lat - half_lat],
            [self.center.lon + half_lon, self.center.lat + half_lat],
        )
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Zoom for a map showing `projects`: the lowest configured override among
/// them, else [`DEFAULT_ZOOM`].
pub fn zoom_level<'a>(projects: impl IntoIterator<Item = &'a str>, catalog: &ProjectCatalog) -> f64 {
    projects
        .into_iter()
        .filter_map(|p| catalog.zoom_override(p))
        .fold(DEFAULT_ZOOM, f64::min)
}

/// Build the map for already-filtered stations.
///
/// The selected projects count toward the zoom even when none of their
/// stations survived the instrument filter.
pub fn render<'a>(
    records: impl IntoIterator<Item = &'a StationRecord>,
    selection: &Selection,
    catalog: &ProjectCatalog,
    style: MapStyle,
) -> MapSpec {
    let points: Vec<MapPoint> = records
        .into_iter()
        .map(|rec| MapPoint {
            lat: rec.lat,
            lon: rec.lon,
            project: rec.project.clone(),
            station: rec.station.clone(),
            platform: rec.platform.clone(),
            instruments: rec.instruments.clone(),
        })
        .collect();

    let zoom = zoom_level(
        selection
            .projects()
            .iter()
            .map(String::as_str)
            .chain(points.iter().map(|p| p.project.as_str())),
        catalog,
    );

    if points.is_empty() {
        return MapSpec {
            title: EMPTY_TITLE.to_string(),
            points,
            center: EMPTY_CENTER,
            zoom,
            legend: Vec::new(),
            style,
            marker: MarkerStyle::default(),
        };
    }

    let n = points.len() as f64;
    let center = GeoPoint {
        lat: points.iter().map(|p| p.lat).sum::<f64>() / n,
        lon: points.iter().map(|p| p.lon).sum::<f64>() / n,
    };

    let colors = ColorMap::assign(points.iter().map(|p| p.project.as_str()));
    let legend = colors
        .entries()
        .map(|(project, rgb)| LegendEntry {
            project: project.to_string(),
            label: catalog.legend_label(project),
            rgb: [rgb.red, rgb.green, rgb.blue],
        })
        .collect();

    MapSpec {
        title: STATIONS_TITLE.to_string(),
        points,
        center,
        zoom,
        legend,
        style,
        marker: MarkerStyle::default(),
    }
}

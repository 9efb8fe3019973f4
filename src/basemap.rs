//! Coarse coastline outlines drawn underneath the station markers.

use serde::Deserialize;
use serde_json::Value as JsonValue;

const EMBEDDED: &str = include_str!("../assets/coastline.geojson");

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    ty: String,
    coordinates: JsonValue,
}

/// A polyline of `[lon, lat]` vertices.
pub type Outline = Vec<[f64; 2]>;

/// Parse the LineString / Polygon / Multi* outlines of a GeoJSON
/// FeatureCollection. Other geometry types are skipped.
pub fn parse_outlines(text: &str) -> serde_json::Result<Vec<Outline>> {
    let collection: FeatureCollection = serde_json::from_str(text)?;
    let mut outlines = Vec::new();

    for feature in collection.features {
        let coords = feature.geometry.coordinates;
        match feature.geometry.ty.as_str() {
            "LineString" => outlines.push(serde_json::from_value(coords)?),
            "MultiLineString" | "Polygon" => {
                let rings: Vec<Outline> = serde_json::from_value(coords)?;
                outlines.extend(rings);
            }
            "MultiPolygon" => {
                let polygons: Vec<Vec<Outline>> = serde_json::from_value(coords)?;
                outlines.extend(polygons.into_iter().flatten());
            }
            other => log::debug!("skipping {other} geometry in basemap"),
        }
    }

    Ok(outlines)
}

/// The coastline compiled into the binary. An unreadable asset leaves the
/// map without a basemap.
pub fn embedded_outlines() -> Vec<Outline> {
    match parse_outlines(EMBEDDED) {
        Ok(outlines) => outlines,
        Err(e) => {
            log::error!("Failed to parse embedded coastline: {e}");
            Vec::new()
        }
    }
}

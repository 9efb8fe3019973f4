use eframe::egui::Color32;
use palette::named;
use palette::Srgb;

// ---------------------------------------------------------------------------
// Discrete project palette
// ---------------------------------------------------------------------------

/// Marker colours handed out to projects in the order they appear.
pub const DISCRETE_SEQUENCE: [Srgb<u8>; 4] =
    [named::RED, named::NAVY, named::FORESTGREEN, named::BLACK];

/// Colour for the `n`th distinct project; wraps past the end of the palette.
pub fn sequence_color(n: usize) -> Srgb<u8> {
    DISCRETE_SEQUENCE[n % DISCRETE_SEQUENCE.len()]
}

// ---------------------------------------------------------------------------
// Color mapping: project name → colour
// ---------------------------------------------------------------------------

/// Maps project names to palette colours in first-seen order.
///
/// The assignment is rebuilt on every render, so a project's colour depends
/// on which other projects are on the map.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: Vec<(String, Srgb<u8>)>,
}

impl ColorMap {
    pub fn assign<'a>(projects: impl IntoIterator<Item = &'a str>) -> Self {
        let mut mapping: Vec<(String, Srgb<u8>)> = Vec::new();
        for project in projects {
            if mapping.iter().all(|(p, _)| p != project) {
                let color = sequence_color(mapping.len());
                mapping.push((project.to_string(), color));
            }
        }
        ColorMap { mapping }
    }

    /// Look up the colour for a given project.
    pub fn color_for(&self, project: &str) -> Option<Srgb<u8>> {
        self.mapping
            .iter()
            .find(|(p, _)| p == project)
            .map(|(_, c)| *c)
    }

    /// Entries in assignment order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Srgb<u8>)> {
        self.mapping.iter().map(|(p, c)| (p.as_str(), *c))
    }
}

/// Convert a palette colour to an egui colour with the given opacity.
pub fn to_color32(rgb: [u8; 3], opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb[0], rgb[1], rgb[2], alpha)
}

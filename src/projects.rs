use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Per-project display metadata
// ---------------------------------------------------------------------------

/// Static display metadata for one research project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Full project name as it appears in the `Project_Name` column.
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub description: String,
    /// Link to the project's entry in the data catalogue.
    #[serde(default)]
    pub data_url: Option<String>,
    /// Map zoom to use whenever this project is on the map.
    #[serde(default)]
    pub zoom: Option<f64>,
}

/// Lookup table from project name to [`ProjectInfo`].
///
/// Names missing from the table are not an error: every accessor falls back
/// to an empty string (or the full name, for labels).
#[derive(Debug, Clone, Default)]
pub struct ProjectCatalog {
    entries: Vec<ProjectInfo>,
}

pub const MISSING_DESCRIPTION: &str = "Project description not available.";

impl ProjectCatalog {
    pub fn new(entries: Vec<ProjectInfo>) -> Self {
        Self { entries }
    }

    pub fn get(&self, project: &str) -> Option<&ProjectInfo> {
        self.entries.iter().find(|p| p.name == project)
    }

    /// All configured project names, in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|p| p.name.as_str())
    }

    pub fn abbreviation(&self, project: &str) -> &str {
        self.get(project).map_or("", |p| p.abbreviation.as_str())
    }

    pub fn emoji(&self, project: &str) -> &str {
        self.get(project).map_or("", |p| p.emoji.as_str())
    }

    pub fn description(&self, project: &str) -> &str {
        match self.get(project) {
            Some(p) if !p.description.is_empty() => p.description.as_str(),
            _ => MISSING_DESCRIPTION,
        }
    }

    pub fn data_url(&self, project: &str) -> Option<&str> {
        self.get(project).and_then(|p| p.data_url.as_deref())
    }

    pub fn zoom_override(&self, project: &str) -> Option<f64> {
        self.get(project).and_then(|p| p.zoom)
    }

    /// Short legend label: abbreviation plus emoji, or the full name when the
    /// project has no abbreviation.
    pub fn legend_label(&self, project: &str) -> String {
        let abbr = self.abbreviation(project);
        if abbr.is_empty() {
            return project.to_string();
        }
        match self.emoji(project) {
            "" => abbr.to_string(),
            emoji => format!("{abbr} {emoji}"),
        }
    }

    /// Heading for a detail panel: emoji followed by the full name.
    pub fn heading(&self, project: &str) -> String {
        format!("{} {}", self.emoji(project), project).trim().to_string()
    }
}

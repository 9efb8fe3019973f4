use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::map::MapStyle;
use crate::projects::{ProjectCatalog, ProjectInfo};

/// Environment variable naming an alternative dashboard configuration file.
pub const CONFIG_ENV: &str = "STATION_DASHBOARD_CONFIG";

const EMBEDDED: &str = include_str!("../assets/dashboard.toml");

/// Errors that can occur while reading the dashboard configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("project '{0}' is configured twice")]
    DuplicateProject(String),
}

/// An external link shown under "Resources".
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resource {
    pub label: String,
    pub url: String,
}

/// Dashboard configuration: page text, input options and project metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    pub title: String,
    #[serde(default)]
    pub introduction: String,
    /// Station table opened at start-up, relative to the working directory.
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    /// Instrument choices offered before any data is loaded.
    #[serde(default)]
    pub instruments: Vec<String>,
    #[serde(default)]
    pub map_style: MapStyle,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub projects: Vec<ProjectInfo>,
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        for (i, project) in config.projects.iter().enumerate() {
            if config.projects[..i].iter().any(|p| p.name == project.name) {
                return Err(ConfigError::DuplicateProject(project.name.clone()));
            }
        }
        Ok(config)
    }

    /// The configuration compiled into the binary.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_str(EMBEDDED)
    }

    /// Use the file named by [`CONFIG_ENV`] if set and valid, otherwise the
    /// embedded configuration.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            let path = PathBuf::from(path);
            match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Using dashboard config {}", path.display());
                    return Ok(config);
                }
                Err(e) => log::warn!("Ignoring {CONFIG_ENV}: {e}"),
            }
        }
        Self::embedded()
    }

    pub fn catalog(&self) -> ProjectCatalog {
        ProjectCatalog::new(self.projects.clone())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn embedded_config_is_complete() {
        let config = DashboardConfig::embedded().unwrap();
        assert_eq!(config.title, "Oceans and Coastal Research Directorate");
        assert_eq!(config.projects.len(), 4);
        assert_eq!(
            config.instruments,
            ["CTD", "TSG", "ADCP", "Niskin Bottle", "Bongo", "UTR"]
        );
        assert_eq!(config.map_style, MapStyle::OpenStreetMap);

        let catalog = config.catalog();
        assert_eq!(
            catalog.zoom_override(
                "South Atlantic Meridional Overturning Circulation Basin-wide Array"
            ),
            Some(3.7)
        );
        assert!(config.projects.iter().all(|p| p.data_url.is_some()));
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = DashboardConfig::from_str("title = \"Stations\"").unwrap();
        assert!(config.projects.is_empty());
        assert!(config.data_path.is_none());
        assert_eq!(config.map_style, MapStyle::default());
    }

    #[test]
    fn duplicate_projects_are_rejected() {
        let text = r#"
            title = "Stations"
            [[projects]]
            name = "A"
            [[projects]]
            name = "A"
        "#;
        assert!(matches!(
            DashboardConfig::from_str(text),
            Err(ConfigError::DuplicateProject(name)) if name == "A"
        ));
    }

    #[test]
    fn config_file_with_style_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "title = \"T\"\nmap_style = \"carto-darkmatter\"\n").unwrap();
        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.map_style, MapStyle::CartoDarkmatter);

        assert!(matches!(
            DashboardConfig::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}

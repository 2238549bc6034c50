//! Optional TOML configuration file.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the standard charts. Command-line flags override whatever is loaded here.

use std::path::{Path, PathBuf};

use ai_exposure_geography::{DEFAULT_BOUNDARY_PATH, DEFAULT_CODE_PROPERTY};
use ai_exposure_render::{BubbleOptions, ChoroplethOptions};
use serde::Deserialize;

use crate::CliError;

/// Default choropleth output file.
pub const DEFAULT_MAP_OUTPUT: &str = "canada_ai_exposure_map.svg";

/// Default bubble matrix output file.
pub const DEFAULT_BUBBLE_OUTPUT: &str = "ai_impact_bubble_matrix.svg";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Choropleth settings (`[map]`).
    pub map: MapConfig,
    /// Bubble matrix settings (`[bubbles]`).
    pub bubbles: BubbleConfig,
}

/// Inputs, output and styling of the choropleth.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Boundary `GeoJSON`, plain or zipped.
    pub boundaries: PathBuf,
    /// Feature property holding the province abbreviation.
    pub code_property: String,
    /// Region table replacing the embedded one.
    pub regions: Option<PathBuf>,
    /// Where to write the SVG.
    pub output: PathBuf,
    /// Chart layout and text (`[map.chart]`).
    pub chart: ChoroplethOptions,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            boundaries: PathBuf::from(DEFAULT_BOUNDARY_PATH),
            code_property: DEFAULT_CODE_PROPERTY.to_string(),
            regions: None,
            output: PathBuf::from(DEFAULT_MAP_OUTPUT),
            chart: ChoroplethOptions::default(),
        }
    }
}

/// Inputs, output and styling of the bubble matrix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    /// Industry table replacing the embedded one.
    pub industries: Option<PathBuf>,
    /// Where to write the SVG.
    pub output: PathBuf,
    /// Chart layout and text (`[bubbles.chart]`).
    pub chart: BubbleOptions,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            industries: None,
            output: PathBuf::from(DEFAULT_BUBBLE_OUTPUT),
            chart: BubbleOptions::default(),
        }
    }
}

impl Config {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the text is not valid configuration.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, CliError> {
        toml::from_str(text).map_err(|e| CliError::Config {
            path: origin.to_string(),
            source: e,
        })
    }

    /// Loads `path`, or the defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] if the file can't be read, or
    /// [`CliError::Config`] if it doesn't parse.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|e| CliError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        log::debug!("Loaded configuration from {}", path.display());

        Self::from_toml(&text, &path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml("", "inline").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.map.output, PathBuf::from("canada_ai_exposure_map.svg"));
        assert_eq!(config.map.boundaries, PathBuf::from("lpr_000b21a_e.zip"));
        assert_eq!(config.map.code_property, "PREABBR");
        assert_eq!(
            config.bubbles.output,
            PathBuf::from("ai_impact_bubble_matrix.svg")
        );
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [map]
            boundaries = "shapes/provinces.geojson"

            [map.chart]
            title = "Exposure"
            width = 800.0

            [bubbles.chart]
            opacity = 0.5
            "#,
            "inline",
        )
        .unwrap();

        assert_eq!(
            config.map.boundaries,
            PathBuf::from("shapes/provinces.geojson")
        );
        assert_eq!(config.map.output, PathBuf::from(DEFAULT_MAP_OUTPUT));
        assert_eq!(config.map.chart.title, "Exposure");
        assert!((config.map.chart.width - 800.0).abs() < f64::EPSILON);
        assert!((config.map.chart.height - 1200.0).abs() < f64::EPSILON);
        assert!((config.bubbles.chart.opacity - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.bubbles.chart.x_label, "Industry");
    }

    #[test]
    fn invalid_config_names_its_origin() {
        let err = Config::from_toml("[map]\noutput = 3", "settings.toml").unwrap_err();
        assert!(err.to_string().contains("settings.toml"), "{err}");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bubbles]\noutput = \"out/bubbles.svg\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.bubbles.output, PathBuf::from("out/bubbles.svg"));

        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}

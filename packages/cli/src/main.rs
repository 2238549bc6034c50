#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Canadian AI exposure charts.
//!
//! Renders the population-weighted provincial choropleth and the
//! province × industry bubble matrix as SVG files, and prints the resolved
//! provincial scores.

use std::path::PathBuf;

use ai_exposure_geography::{BOUNDARY_INSTRUCTIONS, GeographyError};
use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

mod commands;
mod config;

use config::Config;

/// Errors surfaced by the command-line tool.
#[derive(Debug, Error)]
pub enum CliError {
    /// Region data could not be loaded.
    #[error(transparent)]
    Region(#[from] ai_exposure_region::RegionError),

    /// A provincial score is undefined.
    #[error(transparent)]
    Weighting(#[from] ai_exposure_weighting::WeightingError),

    /// Industry data could not be loaded.
    #[error(transparent)]
    Industry(#[from] ai_exposure_industry::IndustryError),

    /// Boundaries could not be loaded or joined.
    #[error(transparent)]
    Geography(#[from] GeographyError),

    /// A chart could not be rendered or saved.
    #[error(transparent)]
    Render(#[from] ai_exposure_render::RenderError),

    /// The configuration file is invalid.
    #[error("Invalid configuration in {path}: {source}")]
    Config {
        /// Where the configuration came from.
        path: String,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// I/O error reading an input file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The region table holds no provinces or territories.
    #[error("No provincial scores to draw")]
    NoScores,
}

/// Render Canadian AI job exposure charts.
#[derive(Parser)]
#[command(name = "ai_exposure")]
#[command(about = "Render Canadian AI job exposure charts")]
struct Cli {
    /// TOML file with chart and input settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Render the population-weighted provincial choropleth.
    Map {
        /// Boundary `GeoJSON` file or zip archive.
        #[arg(long)]
        boundaries: Option<PathBuf>,

        /// Feature property holding the province abbreviation.
        #[arg(long)]
        code_property: Option<String>,

        /// Region CSV replacing the embedded table.
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Output SVG path.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Render the province × industry bubble matrix.
    Bubbles {
        /// Industry CSV replacing the embedded table.
        #[arg(long)]
        industries: Option<PathBuf>,

        /// Output SVG path.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the resolved score of every province and territory.
    Scores {
        /// Region CSV replacing the embedded table.
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Render both charts.
    All {
        /// Boundary `GeoJSON` file or zip archive.
        #[arg(long)]
        boundaries: Option<PathBuf>,

        /// Feature property holding the province abbreviation.
        #[arg(long)]
        code_property: Option<String>,

        /// Region CSV replacing the embedded table.
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Industry CSV replacing the embedded table.
        #[arg(long)]
        industries: Option<PathBuf>,

        /// Output SVG path for the map.
        #[arg(long)]
        map_output: Option<PathBuf>,

        /// Output SVG path for the bubble matrix.
        #[arg(long)]
        bubbles_output: Option<PathBuf>,
    },
}

/// How `scores` prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Aligned plain-text table.
    Table,
    /// Pretty-printed JSON array.
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Map {
            boundaries,
            code_property,
            regions,
            output,
        } => {
            override_map(&mut config, boundaries, code_property, regions);
            override_with(&mut config.map.output, output);
            commands::map(&config.map)
        }
        Commands::Bubbles { industries, output } => {
            override_option(&mut config.bubbles.industries, industries);
            override_with(&mut config.bubbles.output, output);
            commands::bubbles(&config.bubbles)
        }
        Commands::Scores { regions, format } => {
            override_option(&mut config.map.regions, regions);
            commands::scores(config.map.regions.as_deref(), format)
        }
        Commands::All {
            boundaries,
            code_property,
            regions,
            industries,
            map_output,
            bubbles_output,
        } => {
            override_map(&mut config, boundaries, code_property, regions);
            override_with(&mut config.map.output, map_output);
            override_option(&mut config.bubbles.industries, industries);
            override_with(&mut config.bubbles.output, bubbles_output);
            commands::all(&config.map, &config.bubbles)
        }
    };

    if result.as_ref().is_err_and(needs_instructions) {
        eprintln!("{BOUNDARY_INSTRUCTIONS}");
    }

    result?;

    Ok(())
}

/// Whether `err` means the boundary file has to be obtained first.
const fn needs_instructions(err: &CliError) -> bool {
    matches!(err, CliError::Geography(e) if e.is_missing_boundaries())
}

fn override_map(
    config: &mut Config,
    boundaries: Option<PathBuf>,
    code_property: Option<String>,
    regions: Option<PathBuf>,
) {
    override_with(&mut config.map.boundaries, boundaries);
    override_with(&mut config.map.code_property, code_property);
    override_option(&mut config.map.regions, regions);
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn override_option<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scores_format() {
        let cli = Cli::parse_from(["ai_exposure", "scores", "--format", "json"]);
        match cli.command {
            Commands::Scores { format, regions } => {
                assert_eq!(format, OutputFormat::Json);
                assert!(regions.is_none());
            }
            _ => panic!("expected scores"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["ai_exposure", "map", "--config", "charts.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("charts.toml")));
    }

    #[test]
    fn instructions_for_missing_or_unusable_boundaries() {
        assert!(needs_instructions(&CliError::Geography(
            GeographyError::MissingBoundaries {
                path: "lpr_000b21a_e.zip".to_string(),
            }
        )));
        assert!(needs_instructions(&CliError::Geography(
            GeographyError::NoBoundaryInArchive {
                path: "lpr_000b21a_e.zip".to_string(),
            }
        )));
        assert!(!needs_instructions(&CliError::Geography(
            GeographyError::NoFeatureCollection
        )));
        assert!(!needs_instructions(&CliError::NoScores));
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        config.map.regions = Some(PathBuf::from("from_config.csv"));

        override_map(
            &mut config,
            Some(PathBuf::from("provinces.geojson")),
            None,
            None,
        );

        assert_eq!(config.map.boundaries, PathBuf::from("provinces.geojson"));
        assert_eq!(config.map.code_property, "PREABBR");
        assert_eq!(config.map.regions, Some(PathBuf::from("from_config.csv")));
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Province and territory boundary data.
//!
//! Loads the Statistics Canada cartographic boundary polygons from the
//! published shapefile archive (or from `GeoJSON`, plain or zipped),
//! projects longitude/latitude data into Statistics Canada Lambert, and
//! joins the outlines with the weighted exposure scores by province code.

pub mod boundaries;
pub mod join;
pub mod projection;
mod shp;

use thiserror::Error;

pub use boundaries::{
    Boundary, DEFAULT_CODE_PROPERTY, is_geographic, load_boundaries, parse_boundaries,
    project_boundaries,
};
pub use join::{ScoredBoundary, join};
pub use projection::LambertConformalConic;

/// Default location of the boundary archive, relative to the working directory.
pub const DEFAULT_BOUNDARY_PATH: &str = "lpr_000b21a_e.zip";

/// How to obtain the boundary file when it is missing.
pub const BOUNDARY_INSTRUCTIONS: &str = "\
This tool requires the official Statistics Canada boundary file to create an accurate map.

INSTRUCTIONS:
1. Download the 'Cartographic Boundary File' for 'Provinces and Territories 2021'
   (shapefile format).
   https://www12.statcan.gc.ca/census-recensement/2021/geo/sip-pis/boundary-limites/index2021-eng.cfm
2. Place 'lpr_000b21a_e.zip' in the working directory without unzipping it,
   or pass its path with --boundaries. A .shp file (next to its .dbf) or a
   GeoJSON file converted with
   ogr2ogr -f GeoJSON -t_srs EPSG:4326 lpr_000b21a_e.geojson lpr_000b21a_e.shp
   works too.
3. Re-run the command.";

/// Errors that can occur while loading or joining boundaries.
#[derive(Debug, Error)]
pub enum GeographyError {
    /// The boundary file does not exist.
    #[error("Boundary file not found: {path}")]
    MissingBoundaries {
        /// Path that was looked up.
        path: String,
    },

    /// I/O error reading the boundary file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The zip archive could not be read.
    #[error("Zip error in {path}: {source}")]
    Zip {
        /// Path to the archive.
        path: String,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },

    /// The archive holds neither `GeoJSON` nor a `.shp`/`.dbf` pair.
    #[error("No .geojson, .json or .shp/.dbf entries in {path}")]
    NoBoundaryInArchive {
        /// Path to the archive.
        path: String,
    },

    /// The shapefile geometry could not be read.
    #[error("Shapefile error in {path}: {source}")]
    Shapefile {
        /// Where the shapefile came from.
        path: String,
        /// Underlying shapefile error.
        source: shapefile::Error,
    },

    /// The shapefile attribute table could not be read.
    #[error("dBase error in {path}: {source}")]
    Dbase {
        /// Where the attribute table came from.
        path: String,
        /// Underlying dBase error.
        source: shapefile::dbase::Error,
    },

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] Box<geojson::Error>),

    /// The document is valid `GeoJSON` but not a `FeatureCollection`.
    #[error("Boundary GeoJSON must be a FeatureCollection")]
    NoFeatureCollection,

    /// Scores and boundaries share no province code.
    #[error(
        "Could not match any province code between the scores and the boundary file.\n\
         Codes found in boundary file: {}\n\
         Codes to match from scores: {}",
        format_codes(.shape_codes),
        format_codes(.score_codes)
    )]
    JoinMismatch {
        /// Codes carried by the score mapping, sorted.
        score_codes: Vec<String>,
        /// Codes carried by the boundary features, sorted.
        shape_codes: Vec<String>,
    },
}

impl GeographyError {
    /// Whether the boundary file is absent or unusable, so the user should
    /// be shown [`BOUNDARY_INSTRUCTIONS`].
    #[must_use]
    pub const fn is_missing_boundaries(&self) -> bool {
        matches!(
            self,
            Self::MissingBoundaries { .. } | Self::NoBoundaryInArchive { .. }
        )
    }
}

impl From<geojson::Error> for GeographyError {
    fn from(e: geojson::Error) -> Self {
        Self::GeoJson(Box::new(e))
    }
}

fn format_codes(codes: &[String]) -> String {
    if codes.is_empty() {
        "(none)".to_string()
    } else {
        codes.join(", ")
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Embedded region exposure data.
//!
//! The Statistics Canada exposure table (country, provinces, territories
//! and the largest CMAs) is baked into the binary at compile time via
//! [`include_str!`] and parsed into typed [`Region`] rows. An alternative
//! table with the same columns can be loaded from disk instead.

pub mod containment;

use std::io::Read;
use std::path::Path;

use ai_exposure_region_models::{Provenance, ProvinceCode, Region, RegionKind};
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

pub use containment::Containment;

/// Region table embedded at compile time.
const REGIONS_CSV: &str = include_str!("../data/regions.csv");

/// Errors that can occur while loading region data.
#[derive(Debug, Error)]
pub enum RegionError {
    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The `geo_type` column held an unrecognized value.
    #[error("Unknown region kind '{value}' for region {id}")]
    InvalidKind {
        /// Region row identifier.
        id: String,
        /// The unrecognized value.
        value: String,
    },

    /// A row failed validation.
    #[error("Invalid region row {id}: {message}")]
    InvalidRow {
        /// Region row identifier.
        id: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The containment table could not be parsed.
    #[error("Containment table error: {0}")]
    Containment(#[from] toml::de::Error),
}

/// One row of the region CSV, before validation.
#[derive(Debug, Deserialize)]
struct RegionRow {
    region_id: String,
    geo_name: String,
    geo_type: String,
    region_code: String,
    population: u64,
    ai_exposure_pct: f64,
    source_url: String,
    source_date: NaiveDate,
}

impl RegionRow {
    fn into_region(self) -> Result<Region, RegionError> {
        let kind: RegionKind = self
            .geo_type
            .trim()
            .parse()
            .map_err(|_| RegionError::InvalidKind {
                id: self.region_id.clone(),
                value: self.geo_type.clone(),
            })?;

        if !(0.0..=100.0).contains(&self.ai_exposure_pct) {
            return Err(RegionError::InvalidRow {
                id: self.region_id,
                message: format!(
                    "exposure percentage {} is outside 0-100",
                    self.ai_exposure_pct
                ),
            });
        }

        if self.population == 0 {
            return Err(RegionError::InvalidRow {
                id: self.region_id,
                message: "population must be greater than zero".to_string(),
            });
        }

        if kind.is_subdivision() && self.region_code.parse::<ProvinceCode>().is_err() {
            return Err(RegionError::InvalidRow {
                id: self.region_id,
                message: format!("'{}' is not a province or territory code", self.region_code),
            });
        }

        Ok(Region {
            id: self.region_id,
            name: self.geo_name,
            kind,
            code: self.region_code,
            population: self.population,
            exposure_pct: self.ai_exposure_pct,
            provenance: Provenance {
                source_url: self.source_url,
                source_date: self.source_date,
            },
        })
    }
}

/// The full set of loaded regions.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Builds a set from already constructed regions.
    #[must_use]
    pub const fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Parses the embedded region table.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError`] if the embedded table is malformed.
    pub fn embedded() -> Result<Self, RegionError> {
        Self::from_reader(REGIONS_CSV.as_bytes())
    }

    /// Loads a region table from a CSV file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError`] if the file cannot be read or a row is invalid.
    pub fn from_path(path: &Path) -> Result<Self, RegionError> {
        log::info!("Loading regions from {}", path.display());
        let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        Self::from_csv(reader)
    }

    /// Parses a region table from any `Read` source.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError`] if a row cannot be parsed or is invalid.
    pub fn from_reader(reader: impl Read) -> Result<Self, RegionError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, RegionError> {
        let mut regions = Vec::new();
        for row in reader.deserialize::<RegionRow>() {
            regions.push(row?.into_region()?);
        }

        log::debug!("Parsed {} regions", regions.len());

        Ok(Self { regions })
    }

    /// All regions in table order.
    #[must_use]
    pub fn all(&self) -> &[Region] {
        &self.regions
    }

    /// Provinces and territories, in table order.
    pub fn provinces(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.kind.is_subdivision())
    }

    /// Census Metropolitan Areas, in table order.
    pub fn metros(&self) -> impl Iterator<Item = &Region> {
        self.regions
            .iter()
            .filter(|r| r.kind == RegionKind::MetroArea)
    }

    /// The country-level row, if present.
    #[must_use]
    pub fn country(&self) -> Option<&Region> {
        self.regions.iter().find(|r| r.kind == RegionKind::Country)
    }

    /// Looks up a province or territory by code.
    #[must_use]
    pub fn province(&self, code: ProvinceCode) -> Option<&Region> {
        self.provinces().find(|r| r.province_code() == Some(code))
    }
}

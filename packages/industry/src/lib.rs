#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Embedded province by industry AI exposure data.
//!
//! Loads the worker exposure table (baked in via [`include_str!`] or read
//! from disk) and arranges it into a [`BubbleMatrix`]: one row per
//! province, one column per industry, one cell per record.

pub mod matrix;

use std::io::Read;
use std::path::Path;

use ai_exposure_industry_models::{ImpactTimeline, IndustryExposureRecord};
use serde::Deserialize;
use thiserror::Error;

pub use matrix::{BubbleCell, BubbleMatrix, INDUSTRY_ORDER};

/// Industry table embedded at compile time.
const INDUSTRIES_CSV: &str = include_str!("../data/industries.csv");

/// Errors that can occur while loading industry data.
#[derive(Debug, Error)]
pub enum IndustryError {
    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The timeline column held an unrecognized value.
    #[error("Unknown impact timeline '{value}' for {province} / {industry}")]
    InvalidTimeline {
        /// Province name.
        province: String,
        /// Industry name.
        industry: String,
        /// The unrecognized value.
        value: String,
    },

    /// An industry has no workers at all.
    #[error("{province} / {industry} has zero total workers")]
    ZeroWorkers {
        /// Province name.
        province: String,
        /// Industry name.
        industry: String,
    },

    /// More workers are exposed than are employed.
    #[error("{province} / {industry}: {exposed} exposed exceeds {total} total workers")]
    ExposedExceedsTotal {
        /// Province name.
        province: String,
        /// Industry name.
        industry: String,
        /// Exposed workers.
        exposed: u64,
        /// Total workers.
        total: u64,
    },
}

#[derive(Debug, Deserialize)]
struct IndustryRow {
    #[serde(rename = "Province")]
    province: String,
    #[serde(rename = "Industry")]
    industry: String,
    #[serde(rename = "Total Workers")]
    total_workers: u64,
    #[serde(rename = "Workers Exposed")]
    workers_exposed: u64,
    #[serde(rename = "Impact Timeline")]
    timeline: String,
}

impl IndustryRow {
    fn into_record(self) -> Result<IndustryExposureRecord, IndustryError> {
        let Ok(timeline) = self.timeline.parse::<ImpactTimeline>() else {
            return Err(IndustryError::InvalidTimeline {
                province: self.province,
                industry: self.industry,
                value: self.timeline,
            });
        };

        if self.total_workers == 0 {
            return Err(IndustryError::ZeroWorkers {
                province: self.province,
                industry: self.industry,
            });
        }

        if self.workers_exposed > self.total_workers {
            return Err(IndustryError::ExposedExceedsTotal {
                province: self.province,
                industry: self.industry,
                exposed: self.workers_exposed,
                total: self.total_workers,
            });
        }

        Ok(IndustryExposureRecord {
            province: self.province,
            industry: self.industry,
            total_workers: self.total_workers,
            workers_exposed: self.workers_exposed,
            timeline,
        })
    }
}

/// Parses the embedded industry table.
///
/// # Errors
///
/// Returns [`IndustryError`] if the embedded table is malformed.
pub fn embedded() -> Result<Vec<IndustryExposureRecord>, IndustryError> {
    from_reader(INDUSTRIES_CSV.as_bytes())
}

/// Loads an industry table from a CSV file on disk.
///
/// # Errors
///
/// Returns [`IndustryError`] if the file cannot be read or a row is invalid.
pub fn from_path(path: &Path) -> Result<Vec<IndustryExposureRecord>, IndustryError> {
    log::info!("Loading industry records from {}", path.display());
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    from_csv(reader)
}

/// Parses an industry table from any `Read` source.
///
/// # Errors
///
/// Returns [`IndustryError`] if a row cannot be parsed or is invalid.
pub fn from_reader(reader: impl Read) -> Result<Vec<IndustryExposureRecord>, IndustryError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    from_csv(reader)
}

fn from_csv<R: Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<IndustryExposureRecord>, IndustryError> {
    let mut records = Vec::new();
    for row in reader.deserialize::<IndustryRow>() {
        records.push(row?.into_record()?);
    }

    log::debug!("Parsed {} industry records", records.len());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    const HEADER: &str = "Province,Industry,Total Workers,Workers Exposed,Impact Timeline\n";

    #[test]
    fn loads_embedded_records() {
        let records = embedded().unwrap();
        assert_eq!(records.len(), 42);
        assert_eq!(records[0].province, "Ontario");
        assert_eq!(records[0].industry, "Healthcare");
        assert_eq!(records[0].workers_exposed, 554_490);
    }

    #[test]
    fn embedded_timelines_cover_all_categories() {
        let records = embedded().unwrap();
        for timeline in ImpactTimeline::ALL {
            assert!(
                records.iter().any(|r| r.timeline == *timeline),
                "no record with timeline {timeline}"
            );
        }
    }

    #[test]
    fn reads_columns_by_header_name() {
        let csv = "Impact Timeline,Workers Exposed,Total Workers,Industry,Province\n\
                   Long-term,40,100,Retail,Yukon\n";
        let records = from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            records,
            vec![IndustryExposureRecord {
                province: "Yukon".to_string(),
                industry: "Retail".to_string(),
                total_workers: 100,
                workers_exposed: 40,
                timeline: ImpactTimeline::LongTerm,
            }]
        );
    }

    #[test]
    fn rejects_unknown_timeline() {
        let csv = format!("{HEADER}Ontario,Retail,100,50,Soon\n");
        let err = from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IndustryError::InvalidTimeline { .. }), "{err}");
    }

    #[test]
    fn rejects_zero_workers() {
        let csv = format!("{HEADER}Ontario,Retail,0,0,Immediate\n");
        let err = from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IndustryError::ZeroWorkers { .. }), "{err}");
    }

    #[test]
    fn rejects_exposed_above_total() {
        let csv = format!("{HEADER}Ontario,Retail,100,101,Immediate\n");
        let err = from_reader(csv.as_bytes()).unwrap_err();
        assert!(
            matches!(err, IndustryError::ExposedExceedsTotal { .. }),
            "{err}"
        );
    }

    #[test]
    fn quoted_industry_names_with_ampersands() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{HEADER}Yukon,\"Finance & Insurance\",1000,900,Immediate\n"
        )
        .unwrap();

        let records = from_path(file.path()).unwrap();
        assert_eq!(records[0].industry, "Finance & Insurance");
    }
}

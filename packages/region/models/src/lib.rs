#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region, province code, and provenance types.
//!
//! A [`Region`] is one geographic unit (the country, a province or
//! territory, or a Census Metropolitan Area) together with its population
//! and AI occupational exposure percentage. Regions are immutable once
//! loaded; derived values such as weighted scores live in other crates.

pub mod codes;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use codes::ProvinceCode;

/// The kind of geographic unit a [`Region`] describes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum RegionKind {
    /// The whole country.
    #[strum(serialize = "country")]
    Country,
    /// One of the ten provinces.
    #[strum(serialize = "province")]
    Province,
    /// One of the three territories.
    #[strum(serialize = "territory")]
    Territory,
    /// A Census Metropolitan Area (CMA).
    #[strum(to_string = "metro-area", serialize = "CMA", serialize = "cma")]
    MetroArea,
}

impl RegionKind {
    /// Whether this kind is a top-level subdivision (province or territory).
    #[must_use]
    pub const fn is_subdivision(self) -> bool {
        matches!(self, Self::Province | Self::Territory)
    }
}

/// Where a region's figures come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// URL of the publication the figures were taken from.
    pub source_url: String,
    /// Publication date.
    pub source_date: NaiveDate,
}

/// A single geographic unit with its population and exposure figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Row identifier (e.g. `"R002"`).
    pub id: String,
    /// Display name (e.g. `"Ontario"`).
    pub name: String,
    /// What kind of unit this is.
    pub kind: RegionKind,
    /// Short code. Two letters for provinces and territories, `"CA"` for
    /// the country, the numeric CMA code for metro areas.
    pub code: String,
    /// Resident population. Always greater than zero for loaded data.
    pub population: u64,
    /// Share of the workforce in occupations exposed to AI, in percent.
    pub exposure_pct: f64,
    /// Source reference.
    pub provenance: Provenance,
}

impl Region {
    /// Returns the province code for provinces and territories.
    ///
    /// Returns `None` for the country, metro areas, and unrecognized codes.
    #[must_use]
    pub fn province_code(&self) -> Option<ProvinceCode> {
        if self.kind.is_subdivision() {
            self.code.parse().ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(kind: RegionKind, code: &str) -> Region {
        Region {
            id: "R999".to_string(),
            name: "Test".to_string(),
            kind,
            code: code.to_string(),
            population: 1,
            exposure_pct: 60.0,
            provenance: Provenance {
                source_url: "https://example.com".to_string(),
                source_date: NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
            },
        }
    }

    #[test]
    fn parses_cma_as_metro_area() {
        assert_eq!("CMA".parse::<RegionKind>().unwrap(), RegionKind::MetroArea);
        assert_eq!(
            "metro-area".parse::<RegionKind>().unwrap(),
            RegionKind::MetroArea
        );
        assert_eq!(RegionKind::MetroArea.to_string(), "metro-area");
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!("county".parse::<RegionKind>().is_err());
    }

    #[test]
    fn province_code_only_for_subdivisions() {
        assert_eq!(
            region(RegionKind::Province, "ON").province_code(),
            Some(ProvinceCode::Ontario)
        );
        assert_eq!(
            region(RegionKind::Territory, "NU").province_code(),
            Some(ProvinceCode::Nunavut)
        );
        assert_eq!(region(RegionKind::Country, "CA").province_code(), None);
        assert_eq!(region(RegionKind::MetroArea, "535").province_code(), None);
    }
}

//! Canadian province and territory code utilities.
//!
//! Provides mappings between two-letter codes, the abbreviations used by
//! the Statistics Canada boundary files (`PREABBR`, e.g. `"Alta."`), and
//! full names for the 10 provinces and 3 territories.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::RegionKind;

/// Two-letter code of a Canadian province or territory.
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
#[strum(ascii_case_insensitive)]
pub enum ProvinceCode {
    /// Alberta
    #[serde(rename = "AB")]
    #[strum(serialize = "AB")]
    Alberta,
    /// British Columbia
    #[serde(rename = "BC")]
    #[strum(serialize = "BC")]
    BritishColumbia,
    /// Manitoba
    #[serde(rename = "MB")]
    #[strum(serialize = "MB")]
    Manitoba,
    /// New Brunswick
    #[serde(rename = "NB")]
    #[strum(serialize = "NB")]
    NewBrunswick,
    /// Newfoundland and Labrador
    #[serde(rename = "NL")]
    #[strum(serialize = "NL")]
    NewfoundlandAndLabrador,
    /// Nova Scotia
    #[serde(rename = "NS")]
    #[strum(serialize = "NS")]
    NovaScotia,
    /// Northwest Territories
    #[serde(rename = "NT")]
    #[strum(serialize = "NT")]
    NorthwestTerritories,
    /// Nunavut
    #[serde(rename = "NU")]
    #[strum(serialize = "NU")]
    Nunavut,
    /// Ontario
    #[serde(rename = "ON")]
    #[strum(serialize = "ON")]
    Ontario,
    /// Prince Edward Island
    #[serde(rename = "PE")]
    #[strum(serialize = "PE")]
    PrinceEdwardIsland,
    /// Quebec
    #[serde(rename = "QC")]
    #[strum(serialize = "QC")]
    Quebec,
    /// Saskatchewan
    #[serde(rename = "SK")]
    #[strum(serialize = "SK")]
    Saskatchewan,
    /// Yukon
    #[serde(rename = "YT")]
    #[strum(serialize = "YT")]
    Yukon,
}

impl ProvinceCode {
    /// All 13 provinces and territories, in alphabetical code order.
    pub const ALL: &[Self] = &[
        Self::Alberta,
        Self::BritishColumbia,
        Self::Manitoba,
        Self::NewBrunswick,
        Self::NewfoundlandAndLabrador,
        Self::NovaScotia,
        Self::NorthwestTerritories,
        Self::Nunavut,
        Self::Ontario,
        Self::PrinceEdwardIsland,
        Self::Quebec,
        Self::Saskatchewan,
        Self::Yukon,
    ];

    /// Full English name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alberta => "Alberta",
            Self::BritishColumbia => "British Columbia",
            Self::Manitoba => "Manitoba",
            Self::NewBrunswick => "New Brunswick",
            Self::NewfoundlandAndLabrador => "Newfoundland and Labrador",
            Self::NovaScotia => "Nova Scotia",
            Self::NorthwestTerritories => "Northwest Territories",
            Self::Nunavut => "Nunavut",
            Self::Ontario => "Ontario",
            Self::PrinceEdwardIsland => "Prince Edward Island",
            Self::Quebec => "Quebec",
            Self::Saskatchewan => "Saskatchewan",
            Self::Yukon => "Yukon",
        }
    }

    /// Whether this is a province or a territory.
    #[must_use]
    pub const fn kind(self) -> RegionKind {
        match self {
            Self::NorthwestTerritories | Self::Nunavut | Self::Yukon => RegionKind::Territory,
            _ => RegionKind::Province,
        }
    }

    /// Abbreviation used in the `PREABBR` column of the Statistics Canada
    /// cartographic boundary files.
    #[must_use]
    pub const fn boundary_abbr(self) -> &'static str {
        match self {
            Self::Alberta => "Alta.",
            Self::BritishColumbia => "B.C.",
            Self::Manitoba => "Man.",
            Self::NewBrunswick => "N.B.",
            Self::NewfoundlandAndLabrador => "N.L.",
            Self::NovaScotia => "N.S.",
            Self::NorthwestTerritories => "N.W.T.",
            Self::Nunavut => "Nvt.",
            Self::Ontario => "Ont.",
            Self::PrinceEdwardIsland => "P.E.I.",
            Self::Quebec => "Que.",
            Self::Saskatchewan => "Sask.",
            Self::Yukon => "Y.T.",
        }
    }

    /// Maps a boundary-file abbreviation (e.g. `"Alta."`) to its code.
    #[must_use]
    pub fn from_boundary_abbr(abbr: &str) -> Option<Self> {
        let abbr = abbr.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.boundary_abbr() == abbr)
    }

    /// Resolves a code from whatever a boundary file carries: either the
    /// `PREABBR` abbreviation, the two-letter code, or the full name.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::from_boundary_abbr(raw)
            .or_else(|| raw.parse().ok())
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|code| code.name().eq_ignore_ascii_case(raw))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_count() {
        assert_eq!(ProvinceCode::ALL.len(), 13);
    }

    #[test]
    fn code_roundtrip() {
        for code in ProvinceCode::ALL {
            let text = code.to_string();
            assert_eq!(text.len(), 2, "code should be two letters: {text}");
            assert_eq!(text.parse::<ProvinceCode>().unwrap(), *code);
        }
    }

    #[test]
    fn boundary_abbr_roundtrip() {
        for code in ProvinceCode::ALL {
            assert_eq!(
                ProvinceCode::from_boundary_abbr(code.boundary_abbr()),
                Some(*code),
                "roundtrip failed for {code}"
            );
        }
    }

    #[test]
    fn three_territories() {
        let territories = ProvinceCode::ALL
            .iter()
            .filter(|c| c.kind() == RegionKind::Territory)
            .count();
        assert_eq!(territories, 3);
    }

    #[test]
    fn normalizes_all_forms() {
        assert_eq!(ProvinceCode::normalize("Alta."), Some(ProvinceCode::Alberta));
        assert_eq!(ProvinceCode::normalize("ab"), Some(ProvinceCode::Alberta));
        assert_eq!(
            ProvinceCode::normalize(" P.E.I. "),
            Some(ProvinceCode::PrinceEdwardIsland)
        );
        assert_eq!(
            ProvinceCode::normalize("british columbia"),
            Some(ProvinceCode::BritishColumbia)
        );
        assert_eq!(ProvinceCode::normalize("Ore."), None);
    }
}

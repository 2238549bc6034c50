//! Metro-to-province containment relation.
//!
//! Each Census Metropolitan Area belongs to exactly one province or
//! territory. The relation is a static lookup keyed by CMA name, loaded
//! from an embedded TOML table rather than derived from geometry.

use std::collections::BTreeMap;

use ai_exposure_region_models::{ProvinceCode, Region};
use serde::Deserialize;

use crate::RegionError;

/// Containment table embedded at compile time.
const CONTAINMENT_TOML: &str = include_str!("../data/containment.toml");

/// Maps metro-area names to the province or territory that contains them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Containment {
    metros: BTreeMap<String, ProvinceCode>,
}

impl Containment {
    /// Parses the embedded containment table.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::Containment`] if the embedded TOML is malformed.
    pub fn embedded() -> Result<Self, RegionError> {
        Self::from_toml(CONTAINMENT_TOML)
    }

    /// Parses a containment table from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::Containment`] if the TOML is malformed or a
    /// province code is unknown.
    pub fn from_toml(text: &str) -> Result<Self, RegionError> {
        Ok(toml::from_str(text)?)
    }

    /// Builds a relation from `(metro name, province)` pairs.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, ProvinceCode)>) -> Self {
        Self {
            metros: pairs
                .into_iter()
                .map(|(name, code)| (name.to_string(), code))
                .collect(),
        }
    }

    /// The province containing `metro`, looked up by its name.
    #[must_use]
    pub fn province_of(&self, metro: &Region) -> Option<ProvinceCode> {
        self.metros.get(&metro.name).copied()
    }

    /// Number of metro entries in the relation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metros.len()
    }

    /// Whether the relation has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metros.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegionSet;

    #[test]
    fn loads_embedded_table() {
        let containment = Containment::embedded().unwrap();
        assert_eq!(containment.len(), 12);
    }

    #[test]
    fn every_embedded_metro_has_a_province() {
        let regions = RegionSet::embedded().unwrap();
        let containment = Containment::embedded().unwrap();
        for metro in regions.metros() {
            let code = containment
                .province_of(metro)
                .unwrap_or_else(|| panic!("no province for {}", metro.name));
            assert!(
                regions.province(code).is_some(),
                "{} maps to missing province {code}",
                metro.name
            );
        }
    }

    #[test]
    fn quebec_city_maps_to_quebec() {
        let regions = RegionSet::embedded().unwrap();
        let containment = Containment::embedded().unwrap();
        let quebec_cma = regions.metros().find(|m| m.name == "Quebec").unwrap();
        assert_eq!(containment.province_of(quebec_cma), Some(ProvinceCode::Quebec));
    }

    #[test]
    fn rejects_unknown_province_code() {
        let err = Containment::from_toml("[metros]\n\"Portland\" = \"OR\"\n").unwrap_err();
        assert!(matches!(err, RegionError::Containment(_)));
    }
}

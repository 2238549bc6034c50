#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Population-weighted provincial AI exposure scores.
//!
//! A province's flat exposure figure understates the effect of its large
//! cities. The weighted score blends each contained CMA's exposure,
//! weighted by its share of the provincial population, with the flat rate
//! applied to the residual (non-CMA) population:
//!
//! ```text
//! score = (Σ cma.population × cma.exposure
//!          + (province.population − Σ cma.population) × province.exposure)
//!         / province.population
//! ```
//!
//! Provinces without any CMA keep their flat rate. The fallback is an
//! explicit step ([`resolve_scores`]) so that every input province is
//! guaranteed exactly one output score.

use std::collections::BTreeMap;

use ai_exposure_region::{Containment, RegionSet};
use ai_exposure_region_models::{ProvinceCode, Region};
use serde::Serialize;
use thiserror::Error;

/// Data errors that make a weighted score undefined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightingError {
    /// The province has no population, so the weighted average divides by zero.
    #[error("Province {code} has zero population; weighted score is undefined")]
    ZeroPopulation {
        /// Province code.
        code: ProvinceCode,
    },

    /// The contained CMAs add up to more people than the province itself.
    #[error(
        "CMA population {metro_population} exceeds the population of {code} \
         ({province_population}); residual weight would be negative"
    )]
    NegativeResidual {
        /// Province code.
        code: ProvinceCode,
        /// Total provincial population.
        province_population: u64,
        /// Sum of the contained CMA populations.
        metro_population: u64,
    },

    /// The same province code appears more than once in the input.
    #[error("Province {code} appears more than once in the region set")]
    DuplicateProvince {
        /// Province code.
        code: ProvinceCode,
    },
}

/// How a [`WeightedScore`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "type")]
pub enum ScoreSource {
    /// Blended from the province's CMAs and its residual flat rate.
    Blended {
        /// Number of CMAs that contributed.
        metro_count: usize,
    },
    /// The province's own flat exposure rate (no CMAs).
    Flat,
}

/// The resolved exposure score of one province or territory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedScore {
    /// Province code.
    pub code: ProvinceCode,
    /// Resolved exposure percentage. Not rounded or clamped.
    pub exposure_pct: f64,
    /// The province's own flat exposure percentage.
    pub flat_pct: f64,
    /// Whether the score is a blend or the flat fallback.
    pub source: ScoreSource,
}

/// Split of a province's population into CMA and residual parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationSplit {
    /// People living in the province's CMAs.
    pub cma_population: u64,
    /// Everyone else.
    pub non_cma_population: u64,
}

/// Splits `province`'s population into CMA and non-CMA parts.
///
/// # Errors
///
/// * [`WeightingError::ZeroPopulation`] if the province has no population.
/// * [`WeightingError::NegativeResidual`] if the CMAs outnumber the province.
pub fn population_split(
    code: ProvinceCode,
    province: &Region,
    metros: &[&Region],
) -> Result<PopulationSplit, WeightingError> {
    if province.population == 0 {
        return Err(WeightingError::ZeroPopulation { code });
    }

    let cma_population: u64 = metros.iter().map(|m| m.population).sum();

    let non_cma_population = province
        .population
        .checked_sub(cma_population)
        .ok_or(WeightingError::NegativeResidual {
            code,
            province_population: province.population,
            metro_population: cma_population,
        })?;

    Ok(PopulationSplit {
        cma_population,
        non_cma_population,
    })
}

/// Blends a province's flat exposure with the exposure of its CMAs.
///
/// With no CMAs this returns the flat rate unchanged.
///
/// # Errors
///
/// Propagates the data errors of [`population_split`].
#[allow(clippy::cast_precision_loss)]
pub fn blend(
    code: ProvinceCode,
    province: &Region,
    metros: &[&Region],
) -> Result<f64, WeightingError> {
    let split = population_split(code, province, metros)?;

    let weighted_metro_exposure: f64 = metros
        .iter()
        .map(|m| m.population as f64 * m.exposure_pct)
        .sum();

    let total_weighted_exposure =
        weighted_metro_exposure + split.non_cma_population as f64 * province.exposure_pct;

    Ok(total_weighted_exposure / province.population as f64)
}

/// Groups metros by the province that contains them.
///
/// Metros without a containment entry, or whose province is not among
/// `provinces`, are skipped with a warning.
fn group_metros<'a>(
    regions: &'a RegionSet,
    provinces: &BTreeMap<ProvinceCode, &'a Region>,
    containment: &Containment,
) -> BTreeMap<ProvinceCode, Vec<&'a Region>> {
    let mut groups: BTreeMap<ProvinceCode, Vec<&Region>> = BTreeMap::new();

    for metro in regions.metros() {
        let Some(code) = containment.province_of(metro) else {
            log::warn!("No containing province for CMA '{}', skipping", metro.name);
            continue;
        };

        if !provinces.contains_key(&code) {
            log::warn!(
                "CMA '{}' maps to {code}, which is not in the region set, skipping",
                metro.name
            );
            continue;
        }

        groups.entry(code).or_default().push(metro);
    }

    groups
}

/// Indexes provinces and territories by code.
fn index_provinces(
    regions: &RegionSet,
) -> Result<BTreeMap<ProvinceCode, &Region>, WeightingError> {
    let mut provinces = BTreeMap::new();

    for region in regions.provinces() {
        let Some(code) = region.province_code() else {
            log::warn!(
                "Region {} has unrecognized code '{}', skipping",
                region.id,
                region.code
            );
            continue;
        };

        if provinces.insert(code, region).is_some() {
            return Err(WeightingError::DuplicateProvince { code });
        }
    }

    Ok(provinces)
}

/// Computes blended scores for every province that contains at least one CMA.
///
/// Provinces with no CMAs are absent from the result; see
/// [`resolve_scores`] for the fallback.
///
/// # Errors
///
/// Returns [`WeightingError`] on duplicate provinces, zero populations, or
/// CMA populations that exceed their province.
pub fn blended_scores(
    regions: &RegionSet,
    containment: &Containment,
) -> Result<BTreeMap<ProvinceCode, WeightedScore>, WeightingError> {
    let provinces = index_provinces(regions)?;
    let groups = group_metros(regions, &provinces, containment);

    let mut scores = BTreeMap::new();

    for (code, metros) in &groups {
        let province = provinces[code];
        let exposure_pct = blend(*code, province, metros)?;

        log::debug!(
            "{code}: {} CMAs, flat {:.2}% -> weighted {exposure_pct:.2}%",
            metros.len(),
            province.exposure_pct
        );

        scores.insert(
            *code,
            WeightedScore {
                code: *code,
                exposure_pct,
                flat_pct: province.exposure_pct,
                source: ScoreSource::Blended {
                    metro_count: metros.len(),
                },
            },
        );
    }

    Ok(scores)
}

/// Resolves a score for every province in `regions`.
///
/// Provinces present in `blended` keep their blended score; every other
/// province gets its own flat exposure rate.
///
/// # Errors
///
/// Returns [`WeightingError::DuplicateProvince`] if a province code repeats.
pub fn resolve_scores(
    regions: &RegionSet,
    mut blended: BTreeMap<ProvinceCode, WeightedScore>,
) -> Result<BTreeMap<ProvinceCode, WeightedScore>, WeightingError> {
    let provinces = index_provinces(regions)?;

    Ok(provinces
        .into_iter()
        .map(|(code, province)| {
            let score = blended.remove(&code).unwrap_or_else(|| WeightedScore {
                code,
                exposure_pct: province.exposure_pct,
                flat_pct: province.exposure_pct,
                source: ScoreSource::Flat,
            });
            (code, score)
        })
        .collect())
}

/// Computes the resolved weighted score of every province and territory.
///
/// # Errors
///
/// Returns [`WeightingError`] if any province's score is undefined.
pub fn weighted_scores(
    regions: &RegionSet,
    containment: &Containment,
) -> Result<BTreeMap<ProvinceCode, WeightedScore>, WeightingError> {
    let blended = blended_scores(regions, containment)?;
    let scores = resolve_scores(regions, blended)?;

    log::info!(
        "Computed {} provincial scores ({} blended)",
        scores.len(),
        scores
            .values()
            .filter(|s| matches!(s.source, ScoreSource::Blended { .. }))
            .count()
    );

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use ai_exposure_region_models::{Provenance, RegionKind};
    use chrono::NaiveDate;

    use super::*;

    fn region(name: &str, kind: RegionKind, code: &str, population: u64, pct: f64) -> Region {
        Region {
            id: format!("T-{name}"),
            name: name.to_string(),
            kind,
            code: code.to_string(),
            population,
            exposure_pct: pct,
            provenance: Provenance {
                source_url: "https://example.com".to_string(),
                source_date: NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
            },
        }
    }

    fn province(code: &str, population: u64, pct: f64) -> Region {
        region(code, RegionKind::Province, code, population, pct)
    }

    fn metro(name: &str, population: u64, pct: f64) -> Region {
        region(name, RegionKind::MetroArea, "000", population, pct)
    }

    #[test]
    fn single_metro_blend() {
        let regions = RegionSet::new(vec![
            province("ON", 1_000_000, 60.0),
            metro("X City", 600_000, 70.0),
        ]);
        let containment = Containment::from_pairs([("X City", ProvinceCode::Ontario)]);

        let scores = weighted_scores(&regions, &containment).unwrap();
        let on = &scores[&ProvinceCode::Ontario];
        assert!((on.exposure_pct - 66.0).abs() < f64::EPSILON);
        assert_eq!(on.source, ScoreSource::Blended { metro_count: 1 });
    }

    #[test]
    fn two_metro_blend() {
        let regions = RegionSet::new(vec![
            province("QC", 1_000_000, 40.0),
            metro("A", 200_000, 80.0),
            metro("B", 100_000, 50.0),
        ]);
        let containment =
            Containment::from_pairs([("A", ProvinceCode::Quebec), ("B", ProvinceCode::Quebec)]);

        let scores = weighted_scores(&regions, &containment).unwrap();
        assert!((scores[&ProvinceCode::Quebec].exposure_pct - 49.0).abs() < f64::EPSILON);
    }

    #[test]
    fn province_without_metros_keeps_flat_rate() {
        let regions = RegionSet::new(vec![
            province("ON", 1_000_000, 60.0),
            province("PE", 154_331, 57.3),
            metro("X City", 600_000, 70.0),
        ]);
        let containment = Containment::from_pairs([("X City", ProvinceCode::Ontario)]);

        let scores = weighted_scores(&regions, &containment).unwrap();
        let pe = &scores[&ProvinceCode::PrinceEdwardIsland];
        assert_eq!(pe.exposure_pct.to_bits(), 57.3_f64.to_bits());
        assert_eq!(pe.source, ScoreSource::Flat);
    }

    #[test]
    fn every_input_province_gets_one_score() {
        let regions = RegionSet::embedded().unwrap();
        let containment = Containment::embedded().unwrap();

        let scores = weighted_scores(&regions, &containment).unwrap();
        assert_eq!(scores.len(), regions.provinces().count());
        for code in ProvinceCode::ALL {
            assert!(scores.contains_key(code), "missing score for {code}");
        }
    }

    #[test]
    fn embedded_blends_match_cities() {
        let regions = RegionSet::embedded().unwrap();
        let containment = Containment::embedded().unwrap();
        let scores = weighted_scores(&regions, &containment).unwrap();

        assert_eq!(
            scores[&ProvinceCode::Ontario].source,
            ScoreSource::Blended { metro_count: 5 }
        );
        assert_eq!(
            scores[&ProvinceCode::Alberta].source,
            ScoreSource::Blended { metro_count: 2 }
        );
        assert_eq!(scores[&ProvinceCode::Saskatchewan].source, ScoreSource::Flat);

        // Halifax is the only Nova Scotia CMA.
        let ns = &scores[&ProvinceCode::NovaScotia];
        let expected = (465_703.0 * 65.0 + (969_383.0 - 465_703.0) * 60.0) / 969_383.0;
        assert!((ns.exposure_pct - expected).abs() < 1e-9);
    }

    #[test]
    fn weighted_score_within_input_range() {
        let regions = RegionSet::embedded().unwrap();
        let containment = Containment::embedded().unwrap();
        let scores = weighted_scores(&regions, &containment).unwrap();

        for score in scores.values() {
            let mut lo = score.flat_pct;
            let mut hi = score.flat_pct;
            for metro in regions.metros() {
                if containment.province_of(metro) == Some(score.code) {
                    lo = lo.min(metro.exposure_pct);
                    hi = hi.max(metro.exposure_pct);
                }
            }
            assert!(
                score.exposure_pct >= lo - 1e-9 && score.exposure_pct <= hi + 1e-9,
                "{} score {} outside [{lo}, {hi}]",
                score.code,
                score.exposure_pct
            );
        }
    }

    #[test]
    fn population_is_conserved() {
        let regions = RegionSet::embedded().unwrap();
        let containment = Containment::embedded().unwrap();

        for province in regions.provinces() {
            let code = province.province_code().unwrap();
            let metros: Vec<&Region> = regions
                .metros()
                .filter(|m| containment.province_of(m) == Some(code))
                .collect();
            let split = population_split(code, province, &metros).unwrap();
            assert_eq!(
                split.cma_population + split.non_cma_population,
                province.population
            );
        }
    }

    #[test]
    fn zero_population_is_a_data_error() {
        let regions = RegionSet::new(vec![province("NU", 0, 60.0), metro("Iqaluit", 0, 60.0)]);
        let containment = Containment::from_pairs([("Iqaluit", ProvinceCode::Nunavut)]);

        assert_eq!(
            weighted_scores(&regions, &containment).unwrap_err(),
            WeightingError::ZeroPopulation {
                code: ProvinceCode::Nunavut
            }
        );
    }

    #[test]
    fn metros_exceeding_province_are_a_data_error() {
        let regions = RegionSet::new(vec![
            province("MB", 100, 60.0),
            metro("Winnipeg", 80, 59.0),
            metro("Brandon", 30, 55.0),
        ]);
        let containment = Containment::from_pairs([
            ("Winnipeg", ProvinceCode::Manitoba),
            ("Brandon", ProvinceCode::Manitoba),
        ]);

        assert_eq!(
            weighted_scores(&regions, &containment).unwrap_err(),
            WeightingError::NegativeResidual {
                code: ProvinceCode::Manitoba,
                province_population: 100,
                metro_population: 110,
            }
        );
    }

    #[test]
    fn duplicate_province_is_a_data_error() {
        let regions = RegionSet::new(vec![province("BC", 10, 60.0), province("BC", 20, 61.0)]);
        let containment = Containment::default();

        assert_eq!(
            weighted_scores(&regions, &containment).unwrap_err(),
            WeightingError::DuplicateProvince {
                code: ProvinceCode::BritishColumbia
            }
        );
    }

    #[test]
    fn metros_without_province_are_skipped() {
        let regions = RegionSet::new(vec![
            province("ON", 1_000_000, 60.0),
            metro("Nowhere", 500_000, 90.0),
            metro("Elsewhere", 500_000, 90.0),
        ]);
        let containment = Containment::from_pairs([("Elsewhere", ProvinceCode::Yukon)]);

        let scores = weighted_scores(&regions, &containment).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[&ProvinceCode::Ontario].source, ScoreSource::Flat);
    }

    #[test]
    fn scores_are_deterministic() {
        let regions = RegionSet::embedded().unwrap();
        let containment = Containment::embedded().unwrap();

        let first = weighted_scores(&regions, &containment).unwrap();
        let second = weighted_scores(&regions, &containment).unwrap();

        for (a, b) in first.values().zip(second.values()) {
            assert_eq!(a.code, b.code);
            assert_eq!(a.exposure_pct.to_bits(), b.exposure_pct.to_bits());
        }
    }

    #[test]
    fn score_source_serializes_camel_case_fields() {
        let blended = serde_json::to_value(ScoreSource::Blended { metro_count: 2 }).unwrap();
        assert_eq!(blended, serde_json::json!({ "type": "blended", "metroCount": 2 }));

        let flat = serde_json::to_value(ScoreSource::Flat).unwrap();
        assert_eq!(flat, serde_json::json!({ "type": "flat" }));
    }
}

//! Inner join of weighted scores and boundary outlines by province code.

use std::collections::BTreeMap;

use ai_exposure_region_models::ProvinceCode;
use ai_exposure_weighting::WeightedScore;

use crate::GeographyError;
use crate::boundaries::Boundary;

/// A boundary together with the score it will be colored by.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBoundary {
    /// Province code shared by the boundary and the score.
    pub code: ProvinceCode,
    /// The outline.
    pub boundary: Boundary,
    /// The resolved score.
    pub score: WeightedScore,
}

/// Joins scores with boundaries on province code.
///
/// Only codes present on both sides are kept. Unmatched codes on either
/// side are logged as warnings.
///
/// # Errors
///
/// Returns [`GeographyError::JoinMismatch`] when no code matches, listing
/// the codes found on each side.
pub fn join(
    scores: &BTreeMap<ProvinceCode, WeightedScore>,
    boundaries: Vec<Boundary>,
) -> Result<Vec<ScoredBoundary>, GeographyError> {
    let mut shape_codes: Vec<String> = boundaries.iter().map(|b| b.raw_code.clone()).collect();

    let mut joined = Vec::new();
    let mut unmatched_shapes = Vec::new();

    for boundary in boundaries {
        match boundary.code.and_then(|code| scores.get(&code)) {
            Some(score) => joined.push(ScoredBoundary {
                code: score.code,
                score: score.clone(),
                boundary,
            }),
            None => unmatched_shapes.push(boundary.raw_code),
        }
    }

    if joined.is_empty() {
        let mut score_codes: Vec<String> = scores.keys().map(ToString::to_string).collect();
        score_codes.sort_unstable();
        shape_codes.sort_unstable();
        shape_codes.dedup();

        return Err(GeographyError::JoinMismatch {
            score_codes,
            shape_codes,
        });
    }

    if !unmatched_shapes.is_empty() {
        log::warn!(
            "Boundaries without a score (dropped): {}",
            unmatched_shapes.join(", ")
        );
    }

    let unmatched_scores: Vec<String> = scores
        .keys()
        .filter(|code| !joined.iter().any(|j| j.code == **code))
        .map(ToString::to_string)
        .collect();
    if !unmatched_scores.is_empty() {
        log::warn!(
            "Scores without a boundary (not drawn): {}",
            unmatched_scores.join(", ")
        );
    }

    log::info!("Joined {} provinces with boundaries", joined.len());

    Ok(joined)
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Province by industry AI exposure record types.

use strum_macros::{AsRefStr, Display, EnumString};

/// How soon AI is expected to change work in an industry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ImpactTimeline {
    /// Already underway.
    #[strum(serialize = "Immediate")]
    Immediate,
    /// Expected over the medium term.
    #[strum(serialize = "Medium")]
    Medium,
    /// Expected over the long term.
    #[strum(serialize = "Long-term")]
    LongTerm,
}

impl ImpactTimeline {
    /// All timelines, soonest first.
    pub const ALL: &[Self] = &[Self::Immediate, Self::Medium, Self::LongTerm];

    /// Label used in chart legends.
    #[must_use]
    pub const fn legend_label(self) -> &'static str {
        match self {
            Self::Immediate => "Immediate",
            Self::Medium => "Medium-term",
            Self::LongTerm => "Long-term",
        }
    }
}

/// Workers in one industry of one province, and how many are exposed to AI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndustryExposureRecord {
    /// Province name (e.g. `"Ontario"`).
    pub province: String,
    /// Industry name (e.g. `"Healthcare"`).
    pub industry: String,
    /// Total workers employed in the industry.
    pub total_workers: u64,
    /// Workers in AI-exposed occupations.
    pub workers_exposed: u64,
    /// Expected timing of the impact.
    pub timeline: ImpactTimeline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_term() {
        assert_eq!(
            "Long-term".parse::<ImpactTimeline>().unwrap(),
            ImpactTimeline::LongTerm
        );
        assert_eq!(ImpactTimeline::LongTerm.to_string(), "Long-term");
    }

    #[test]
    fn legend_labels_expand_medium() {
        assert_eq!(ImpactTimeline::Medium.legend_label(), "Medium-term");
    }
}

//! Subcommand pipelines.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use ai_exposure_geography::{LambertConformalConic, join, load_boundaries, project_boundaries};
use ai_exposure_industry::BubbleMatrix;
use ai_exposure_region::{Containment, RegionSet};
use ai_exposure_region_models::ProvinceCode;
use ai_exposure_render::{ScoreRange, render_bubble_matrix, render_choropleth, save_document};
use ai_exposure_weighting::{ScoreSource, WeightedScore, weighted_scores};
use serde::Serialize;

use crate::config::{BubbleConfig, MapConfig};
use crate::{CliError, OutputFormat};

/// One line of `scores` output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreRow<'a> {
    name: &'a str,
    #[serde(flatten)]
    score: &'a WeightedScore,
}

fn load_regions(path: Option<&Path>) -> Result<RegionSet, CliError> {
    Ok(match path {
        Some(path) => RegionSet::from_path(path)?,
        None => RegionSet::embedded()?,
    })
}

fn provincial_scores(
    regions: &RegionSet,
) -> Result<BTreeMap<ProvinceCode, WeightedScore>, CliError> {
    let containment = Containment::embedded()?;
    Ok(weighted_scores(regions, &containment)?)
}

/// Scores every province, joins the boundaries and writes the choropleth.
pub fn map(config: &MapConfig) -> Result<(), CliError> {
    let regions = load_regions(config.regions.as_deref())?;
    let scores = provincial_scores(&regions)?;

    let range = ScoreRange::from_values(scores.values().map(|s| s.exposure_pct))
        .ok_or(CliError::NoScores)?;
    log::debug!("Color range {:.2}..{:.2}", range.min, range.max);

    let mut boundaries = load_boundaries(&config.boundaries, &config.code_property)?;
    project_boundaries(&mut boundaries, &LambertConformalConic::statistics_canada());

    let provinces = join(&scores, boundaries)?;
    let document = render_choropleth(&provinces, range, &config.chart)?;
    save_document(&config.output, &document)?;

    Ok(())
}

/// Lays out the industry records and writes the bubble matrix.
pub fn bubbles(config: &BubbleConfig) -> Result<(), CliError> {
    let records = match config.industries.as_deref() {
        Some(path) => ai_exposure_industry::from_path(path)?,
        None => ai_exposure_industry::embedded()?,
    };

    let matrix = BubbleMatrix::new(records);
    log::debug!(
        "Bubble matrix: {} provinces x {} industries",
        matrix.rows.len(),
        matrix.columns.len()
    );

    let document = render_bubble_matrix(&matrix, &config.chart)?;
    save_document(&config.output, &document)?;

    Ok(())
}

/// Renders both charts.
///
/// The bubble matrix does not depend on boundary data, so it is rendered
/// even when the map fails. The first error is returned.
pub fn all(map_config: &MapConfig, bubble_config: &BubbleConfig) -> Result<(), CliError> {
    let map_result = map(map_config);
    if let Err(e) = &map_result {
        log::error!("Map failed: {e}");
    }

    let bubbles_result = bubbles(bubble_config);

    map_result.and(bubbles_result)
}

/// Prints every province's resolved score to stdout.
pub fn scores(regions: Option<&Path>, format: OutputFormat) -> Result<(), CliError> {
    let regions = load_regions(regions)?;
    let scores = provincial_scores(&regions)?;

    let output = match format {
        OutputFormat::Table => format_table(&regions, &scores),
        OutputFormat::Json => serde_json::to_string_pretty(&rows(&regions, &scores))?,
    };

    println!("{output}");

    Ok(())
}

fn rows<'a>(
    regions: &'a RegionSet,
    scores: &'a BTreeMap<ProvinceCode, WeightedScore>,
) -> Vec<ScoreRow<'a>> {
    scores
        .values()
        .map(|score| ScoreRow {
            name: regions
                .province(score.code)
                .map_or(score.code.name(), |r| r.name.as_str()),
            score,
        })
        .collect()
}

fn format_table(regions: &RegionSet, scores: &BTreeMap<ProvinceCode, WeightedScore>) -> String {
    let rows = rows(regions, scores);
    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);

    let mut out = format!(
        "{:<4}  {:<name_width$}  {:>8}  {:>8}  SOURCE",
        "CODE", "NAME", "WEIGHTED", "FLAT"
    );
    for row in &rows {
        let source = match row.score.source {
            ScoreSource::Blended { metro_count } => format!("blended ({metro_count} CMAs)"),
            ScoreSource::Flat => "flat".to_string(),
        };
        let _ = write!(
            out,
            "\n{:<4}  {:<name_width$}  {:>8.2}  {:>8.2}  {source}",
            row.score.code.to_string(),
            row.name,
            row.score.exposure_pct,
            row.score.flat_pct,
        );
    }
    out
}

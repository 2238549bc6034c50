#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! SVG renderers for the AI exposure charts.
//!
//! * [`render_choropleth`] draws the provincial map colored by weighted
//!   exposure score on a continuous `YlOrRd` scale.
//! * [`render_bubble_matrix`] draws the province × industry bubble chart.
//!
//! Renderers build an in-memory [`svg::Document`]; [`save_document`] writes
//! it out atomically so that a failed run never leaves a partial file.

pub mod bubble;
pub mod choropleth;
pub mod color;
pub mod labels;

use std::path::Path;

use thiserror::Error;

pub use bubble::{BubbleOptions, render_bubble_matrix};
pub use choropleth::{ChoroplethOptions, render_choropleth};
pub use color::{ColorScale, ScoreRange};

/// Errors that can occur while rendering or saving a chart.
#[derive(Debug, Error)]
pub enum RenderError {
    /// There is nothing to draw.
    #[error("Nothing to render for the {chart}")]
    Empty {
        /// Which chart was being rendered.
        chart: &'static str,
    },

    /// I/O error writing the output file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Writes `document` to `path`.
///
/// The SVG is written to a temporary sibling file first and then renamed
/// into place.
///
/// # Errors
///
/// Returns [`RenderError::Io`] if the file cannot be written or renamed.
pub fn save_document(path: &Path, document: &svg::Document) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| RenderError::Io {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let tmp_path = path.with_extension("svg.tmp");

    svg::save(&tmp_path, document).map_err(|e| RenderError::Io {
        path: tmp_path.display().to_string(),
        source: e,
    })?;

    std::fs::rename(&tmp_path, path).map_err(|e| RenderError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    log::info!("Chart saved as {}", path.display());

    Ok(())
}

/// Formats a worker count in thousands (e.g. `554490` → `"554k"`).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_thousands(count: u64) -> String {
    format!("{:.0}k", count as f64 / 1000.0)
}

/// Text content of every `<text>` element, trimmed.
#[cfg(test)]
pub(crate) fn text_nodes(svg: &str) -> Vec<String> {
    svg.split("<text")
        .skip(1)
        .filter_map(|chunk| {
            let start = chunk.find('>')? + 1;
            let end = chunk.find("</text>")?;
            Some(chunk.get(start..end)?.trim().to_string())
        })
        .collect()
}

//! Province × industry bubble matrix.
//!
//! Bubble area is proportional to the number of exposed workers and the
//! fill encodes the [`ImpactTimeline`].

use ai_exposure_industry::BubbleMatrix;
use ai_exposure_industry_models::ImpactTimeline;
use serde::Deserialize;
use svg::Document;
use svg::node::element::{Circle, Group, Line, Rectangle, Text};

use crate::{RenderError, format_thousands};

/// Workers-exposed values shown in the size legend.
pub const SIZE_LEGEND_VALUES: &[u64] = &[100_000, 300_000, 600_000];

/// Pixels per typographic point at 100 DPI.
const PX_PER_POINT: f64 = 100.0 / 72.0;

/// Fill color for a timeline.
#[must_use]
pub const fn timeline_color(timeline: ImpactTimeline) -> &'static str {
    match timeline {
        ImpactTimeline::Immediate => "#d73027",
        ImpactTimeline::Medium => "#fdae61",
        ImpactTimeline::LongTerm => "#fee090",
    }
}

/// Radius in pixels of a bubble whose area is `size` square points.
#[must_use]
pub fn bubble_radius(size: f64) -> f64 {
    (size.max(0.0) / std::f64::consts::PI).sqrt() * PX_PER_POINT
}

/// Layout and text options for the bubble matrix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BubbleOptions {
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
    /// Chart title.
    pub title: String,
    /// Horizontal axis title.
    pub x_label: String,
    /// Vertical axis title.
    pub y_label: String,
    /// Bubble fill opacity.
    pub opacity: f64,
}

impl Default for BubbleOptions {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1000.0,
            title: "AI Employment Impact: Workers Exposed by Province and Industry".to_string(),
            x_label: "Industry".to_string(),
            y_label: "Province".to_string(),
            opacity: 0.8,
        }
    }
}

struct Grid {
    left: f64,
    top: f64,
    cell_width: f64,
    cell_height: f64,
}

impl Grid {
    #[allow(clippy::cast_precision_loss)]
    fn new(options: &BubbleOptions, rows: usize, columns: usize) -> Self {
        let left = 220.0;
        let top = 90.0;
        let width = options.width - left - 300.0;
        let height = options.height - top - 250.0;
        Self {
            left,
            top,
            cell_width: width / columns.max(1) as f64,
            cell_height: height / rows.max(1) as f64,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn x(&self, column: usize) -> f64 {
        (column as f64 + 0.5).mul_add(self.cell_width, self.left)
    }

    #[allow(clippy::cast_precision_loss)]
    fn y(&self, row: usize) -> f64 {
        (row as f64 + 0.5).mul_add(self.cell_height, self.top)
    }
}

/// Renders the bubble matrix.
///
/// # Errors
///
/// Returns [`RenderError::Empty`] if `matrix` holds no records.
pub fn render_bubble_matrix(
    matrix: &BubbleMatrix,
    options: &BubbleOptions,
) -> Result<Document, RenderError> {
    if matrix.is_empty() {
        return Err(RenderError::Empty {
            chart: "bubble matrix",
        });
    }

    let grid = Grid::new(options, matrix.rows.len(), matrix.columns.len());
    let grid_bottom = grid.y(matrix.rows.len()) - grid.cell_height / 2.0;
    let grid_right = grid.x(matrix.columns.len()) - grid.cell_width / 2.0;

    let mut guides = Group::new()
        .set("id", "grid")
        .set("stroke", "#cccccc")
        .set("stroke-dasharray", "4 4")
        .set("stroke-width", 0.8);
    for column in 0..matrix.columns.len() {
        guides = guides.add(
            Line::new()
                .set("x1", grid.x(column))
                .set("x2", grid.x(column))
                .set("y1", grid.top)
                .set("y2", grid_bottom),
        );
    }
    for row in 0..matrix.rows.len() {
        guides = guides.add(
            Line::new()
                .set("x1", grid.left)
                .set("x2", grid_right)
                .set("y1", grid.y(row))
                .set("y2", grid.y(row)),
        );
    }

    let mut bubbles = Group::new()
        .set("id", "bubbles")
        .set("stroke", "black")
        .set("stroke-width", 0.5)
        .set("fill-opacity", options.opacity);
    let mut values = Group::new()
        .set("id", "values")
        .set("font-family", "sans-serif")
        .set("font-size", 11)
        .set("font-weight", "bold")
        .set("text-anchor", "middle")
        .set("dominant-baseline", "central");

    for cell in &matrix.cells {
        let (x, y) = (grid.x(cell.column), grid.y(cell.row));
        let exposed = cell.record.workers_exposed;
        bubbles = bubbles.add(
            Circle::new()
                .set("class", "bubble")
                .set("cx", x)
                .set("cy", y)
                .set("r", bubble_radius(matrix.bubble_size(exposed)))
                .set("fill", timeline_color(cell.record.timeline)),
        );
        values = values.add(
            Text::new(format_thousands(exposed))
                .set("x", x)
                .set("y", y),
        );
    }

    let mut axes = Group::new()
        .set("id", "axes")
        .set("font-family", "sans-serif")
        .set("font-size", 13);
    for (row, province) in matrix.rows.iter().enumerate() {
        axes = axes.add(
            Text::new(province.as_str())
                .set("x", grid.left - 12.0)
                .set("y", grid.y(row))
                .set("text-anchor", "end")
                .set("dominant-baseline", "central"),
        );
    }
    for (column, industry) in matrix.columns.iter().enumerate() {
        let (x, y) = (grid.x(column), grid_bottom + 16.0);
        axes = axes.add(
            Text::new(industry.as_str())
                .set("x", x)
                .set("y", y)
                .set("text-anchor", "end")
                .set("transform", format!("rotate(-45 {x} {y})")),
        );
    }

    let x_title_y = options.height - 30.0;
    let y_title_x = 40.0;
    let y_title_y = (grid.top + grid_bottom) / 2.0;
    axes = axes
        .add(
            Text::new(options.x_label.as_str())
                .set("x", (grid.left + grid_right) / 2.0)
                .set("y", x_title_y)
                .set("text-anchor", "middle")
                .set("font-size", 16)
                .set("font-weight", "bold"),
        )
        .add(
            Text::new(options.y_label.as_str())
                .set("x", y_title_x)
                .set("y", y_title_y)
                .set("text-anchor", "middle")
                .set("font-size", 16)
                .set("font-weight", "bold")
                .set("transform", format!("rotate(-90 {y_title_x} {y_title_y})")),
        );

    let document = Document::new()
        .set("viewBox", (0.0, 0.0, options.width, options.height))
        .set("width", options.width)
        .set("height", options.height)
        .add(
            Rectangle::new()
                .set("width", options.width)
                .set("height", options.height)
                .set("fill", "white"),
        )
        .add(
            Text::new(options.title.as_str())
                .set("x", options.width / 2.0)
                .set("y", 50.0)
                .set("text-anchor", "middle")
                .set("font-family", "sans-serif")
                .set("font-size", 24)
                .set("font-weight", "bold"),
        )
        .add(guides)
        .add(bubbles)
        .add(values)
        .add(axes)
        .add(legends(matrix, options, grid_right + 40.0, grid.top));

    Ok(document)
}

/// Timeline color legend stacked above the size legend.
fn legends(matrix: &BubbleMatrix, options: &BubbleOptions, x: f64, top: f64) -> Group {
    let mut group = Group::new()
        .set("id", "legend")
        .set("font-family", "sans-serif")
        .set("font-size", 13)
        .add(
            Text::new("Impact Timeline")
                .set("x", x)
                .set("y", top)
                .set("font-weight", "bold"),
        );

    let mut y = top + 28.0;
    for timeline in ImpactTimeline::ALL {
        group = group
            .add(
                Circle::new()
                    .set("cx", x + 10.0)
                    .set("cy", y)
                    .set("r", 9)
                    .set("fill", timeline_color(*timeline))
                    .set("fill-opacity", options.opacity)
                    .set("stroke", "black")
                    .set("stroke-width", 0.5),
            )
            .add(
                Text::new(timeline.legend_label())
                    .set("x", x + 28.0)
                    .set("y", y)
                    .set("dominant-baseline", "central"),
            );
        y += 26.0;
    }

    y += 30.0;
    group = group.add(
        Text::new("Workers Exposed")
            .set("x", x)
            .set("y", y)
            .set("font-weight", "bold"),
    );

    let largest = SIZE_LEGEND_VALUES
        .iter()
        .map(|v| bubble_radius(matrix.bubble_size(*v)))
        .fold(0.0, f64::max);
    for value in SIZE_LEGEND_VALUES {
        let radius = bubble_radius(matrix.bubble_size(*value));
        y += radius.max(10.0) + 18.0;
        group = group
            .add(
                Circle::new()
                    .set("cx", x + largest)
                    .set("cy", y)
                    .set("r", radius)
                    .set("fill", "#999999")
                    .set("fill-opacity", 0.5)
                    .set("stroke", "black")
                    .set("stroke-width", 0.5),
            )
            .add(
                Text::new(format_thousands(*value))
                    .set("x", 2.0f64.mul_add(largest, x + 14.0))
                    .set("y", y)
                    .set("dominant-baseline", "central"),
            );
        y += radius;
    }

    group
}

#[cfg(test)]
mod tests {
    use ai_exposure_industry_models::IndustryExposureRecord;

    use super::*;

    #[test]
    fn embedded_matrix_draws_every_record() {
        let matrix = BubbleMatrix::new(ai_exposure_industry::embedded().unwrap());
        let svg = render_bubble_matrix(&matrix, &BubbleOptions::default())
            .unwrap()
            .to_string();

        assert_eq!(svg.matches("class=\"bubble\"").count(), 42);
        let texts = crate::text_nodes(&svg);
        assert!(texts.iter().any(|t| t == "609k"));
        assert!(svg.contains("Finance &amp; Insurance") || svg.contains("Finance & Insurance"));
        assert!(svg.contains("Impact Timeline"));
        assert!(svg.contains("Medium-term"));
        for label in ["100k", "300k", "600k"] {
            assert!(texts.iter().any(|t| t == label), "missing size legend {label}");
        }
    }

    #[test]
    fn largest_record_gets_largest_bubble() {
        let matrix = BubbleMatrix::new(ai_exposure_industry::embedded().unwrap());
        let max = bubble_radius(matrix.bubble_size(matrix.max_exposed));
        assert!((max - bubble_radius(2000.0)).abs() < 1e-9);
        assert!(bubble_radius(matrix.bubble_size(100_000)) < max);
    }

    #[test]
    fn radius_grows_with_square_root_of_size() {
        let r1 = bubble_radius(500.0);
        let r4 = bubble_radius(2000.0);
        assert!((r4 / r1 - 2.0).abs() < 1e-9);
        assert!(bubble_radius(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn colors_by_timeline() {
        let record = IndustryExposureRecord {
            province: "Ontario".to_string(),
            industry: "Retail".to_string(),
            total_workers: 1000,
            workers_exposed: 500,
            timeline: ImpactTimeline::LongTerm,
        };
        let matrix = BubbleMatrix::new(vec![record]);
        let svg = render_bubble_matrix(&matrix, &BubbleOptions::default())
            .unwrap()
            .to_string();

        assert_eq!(svg.matches("class=\"bubble\"").count(), 1);
        assert!(svg.contains("fill=\"#fee090\""));
        assert_eq!(timeline_color(ImpactTimeline::Immediate), "#d73027");
        assert_eq!(timeline_color(ImpactTimeline::Medium), "#fdae61");
    }

    #[test]
    fn empty_matrix_is_an_error() {
        let matrix = BubbleMatrix::new(Vec::new());
        let err = render_bubble_matrix(&matrix, &BubbleOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::Empty { .. }));
    }
}

//! Provincial choropleth map.

use ai_exposure_geography::ScoredBoundary;
use geo::{BoundingRect, LineString, MultiPolygon, Rect};
use serde::Deserialize;
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Definitions, Group, Line, LinearGradient, Path, Rectangle, Stop, Text};

use crate::RenderError;
use crate::color::{ColorScale, ScoreRange};
use crate::labels::label_offset;

/// Fraction of the map extent added as padding on each side.
const MAP_PADDING: f64 = 0.05;

/// Number of labelled ticks on the color bar.
const COLORBAR_TICKS: usize = 5;

const DEFAULT_CAPTION: &str = "\
This choropleth map displays a population-weighted AI occupational exposure score for each Canadian province and territory.
The score is calculated by combining the AI exposure rates of major cities (CMAs) with the baseline rate for the rest of the province.
This method highlights provinces with large urban centers that have higher overall exposure to AI transformation in the workforce.
Data is derived from Statistics Canada (2024), based on the 2021 Census.";

/// Layout and text options for the choropleth.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChoroplethOptions {
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
    /// Chart title.
    pub title: String,
    /// Label next to the color bar.
    pub colorbar_label: String,
    /// Caption below the map; one line per `\n`.
    pub caption: String,
    /// Background fill of the map area.
    pub background: String,
    /// Province outline color.
    pub edge_color: String,
}

impl Default for ChoroplethOptions {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1200.0,
            title: "Canadian Provincial AI Job Exposure (Population-Weighted)".to_string(),
            colorbar_label: "Weighted AI Exposure Percentage (%)".to_string(),
            caption: DEFAULT_CAPTION.to_string(),
            background: "aliceblue".to_string(),
            edge_color: "#666666".to_string(),
        }
    }
}

/// Maps projected coordinates into the map area of the canvas.
#[derive(Debug, Clone, Copy)]
struct Frame {
    min_x: f64,
    max_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Frame {
    /// Fits `bounds` into the `area` rectangle, preserving aspect ratio.
    fn fit(bounds: Rect<f64>, area: Rect<f64>) -> Self {
        let pad_x = bounds.width() * MAP_PADDING;
        let pad_y = bounds.height() * MAP_PADDING;
        let world_w = 2.0f64.mul_add(pad_x, bounds.width()).max(f64::EPSILON);
        let world_h = 2.0f64.mul_add(pad_y, bounds.height()).max(f64::EPSILON);

        let scale = (area.width() / world_w).min(area.height() / world_h);

        Self {
            min_x: bounds.min().x - pad_x,
            max_y: bounds.max().y + pad_y,
            scale,
            offset_x: world_w.mul_add(-scale, area.width()).mul_add(0.5, area.min().x),
            offset_y: world_h.mul_add(-scale, area.height()).mul_add(0.5, area.min().y),
        }
    }

    fn to_screen(self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.min_x).mul_add(self.scale, self.offset_x),
            (self.max_y - y).mul_add(self.scale, self.offset_y),
        )
    }
}

/// Renders the choropleth.
///
/// `range` is the span of the color scale; it normally covers every
/// province's score, including provinces without a boundary.
///
/// # Errors
///
/// Returns [`RenderError::Empty`] if there is no boundary to draw.
pub fn render_choropleth(
    provinces: &[ScoredBoundary],
    range: ScoreRange,
    options: &ChoroplethOptions,
) -> Result<Document, RenderError> {
    let bounds = provinces
        .iter()
        .filter_map(|p| p.boundary.geometry.bounding_rect())
        .reduce(union)
        .ok_or(RenderError::Empty { chart: "map" })?;

    let scale = ColorScale::yl_or_rd();

    let map_area = Rect::new(
        (30.0, 90.0),
        (options.width - 190.0, options.height - 170.0),
    );
    let frame = Frame::fit(bounds, map_area);

    let mut shapes = Group::new()
        .set("id", "provinces")
        .set("stroke", options.edge_color.as_str())
        .set("stroke-width", 0.8)
        .set("stroke-linejoin", "round");
    for province in provinces {
        let fill = scale.at(range.normalize(province.score.exposure_pct));
        log::debug!(
            "{}: {:.2}% -> {fill}",
            province.code,
            province.score.exposure_pct
        );
        shapes = shapes.add(
            Path::new()
                .set("d", outline(&province.boundary.geometry, frame))
                .set("fill", fill)
                .set("fill-rule", "evenodd")
                .set("data-code", province.code.to_string()),
        );
    }

    let mut labels = Group::new()
        .set("id", "labels")
        .set("font-family", "sans-serif")
        .set("font-size", 14)
        .set("font-weight", "bold")
        .set("text-anchor", "middle")
        .set("dominant-baseline", "central")
        .set("stroke", "white")
        .set("stroke-width", 3)
        .set("paint-order", "stroke");
    for province in provinces {
        let Some(anchor) = province.boundary.label_anchor() else {
            log::warn!("No label position for {}", province.code);
            continue;
        };
        let (dx, dy) = label_offset(province.code);
        let (x, y) = frame.to_screen(anchor.x() + dx, anchor.y() + dy);
        labels = labels.add(
            Text::new(province.code.to_string())
                .set("x", x)
                .set("y", y),
        );
    }

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
            Rectangle::new()
                .set("x", map_area.min().x)
                .set("y", map_area.min().y)
                .set("width", map_area.width())
                .set("height", map_area.height())
                .set("fill", options.background.as_str()),
        )
        .add(
            Text::new(options.title.as_str())
                .set("x", options.width / 2.0)
                .set("y", 55.0)
                .set("text-anchor", "middle")
                .set("font-family", "sans-serif")
                .set("font-size", 28)
                .set("font-weight", "bold"),
        )
        .add(shapes)
        .add(labels)
        .add(colorbar(&scale, range, options))
        .add(caption(options));

    Ok(document)
}

fn union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
        (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
    )
}

/// SVG path data for every ring of a multipolygon.
fn outline(geometry: &MultiPolygon<f64>, frame: Frame) -> Data {
    let mut data = Data::new();
    for polygon in geometry {
        data = ring(data, polygon.exterior(), frame);
        for interior in polygon.interiors() {
            data = ring(data, interior, frame);
        }
    }
    data
}

fn ring(mut data: Data, ring: &LineString<f64>, frame: Frame) -> Data {
    let mut points = ring.coords().map(|c| frame.to_screen(c.x, c.y));
    let Some(first) = points.next() else {
        return data;
    };
    data = data.move_to(first);
    for point in points {
        data = data.line_to(point);
    }
    data.close()
}

/// Vertical color bar with ticks, right of the map.
fn colorbar(scale: &ColorScale, range: ScoreRange, options: &ChoroplethOptions) -> Group {
    let bar_x = options.width - 150.0;
    let bar_top = 150.0;
    let bar_width = 28.0;
    let bar_height = options.height - 420.0;

    let mut gradient = LinearGradient::new()
        .set("id", "exposure-scale")
        .set("x1", 0)
        .set("y1", 1)
        .set("x2", 0)
        .set("y2", 0);
    for (offset, color) in scale.gradient_stops() {
        gradient = gradient.add(
            Stop::new()
                .set("offset", offset)
                .set("stop-color", color),
        );
    }

    let mut group = Group::new()
        .set("id", "colorbar")
        .set("font-family", "sans-serif")
        .add(Definitions::new().add(gradient))
        .add(
            Rectangle::new()
                .set("x", bar_x)
                .set("y", bar_top)
                .set("width", bar_width)
                .set("height", bar_height)
                .set("fill", "url(#exposure-scale)")
                .set("stroke", "#444444")
                .set("stroke-width", 0.5),
        );

    for value in range.ticks(COLORBAR_TICKS) {
        let y = range.normalize(value).mul_add(-bar_height, bar_top + bar_height);
        group = group
            .add(
                Line::new()
                    .set("x1", bar_x + bar_width)
                    .set("x2", bar_x + bar_width + 6.0)
                    .set("y1", y)
                    .set("y2", y)
                    .set("stroke", "#444444"),
            )
            .add(
                Text::new(format!("{value:.1}"))
                    .set("x", bar_x + bar_width + 10.0)
                    .set("y", y)
                    .set("font-size", 12)
                    .set("dominant-baseline", "central"),
            );
    }

    let label_x = bar_x + bar_width + 70.0;
    let label_y = bar_height.mul_add(0.5, bar_top);
    group.add(
        Text::new(options.colorbar_label.as_str())
            .set("x", label_x)
            .set("y", label_y)
            .set("font-size", 16)
            .set("text-anchor", "middle")
            .set("transform", format!("rotate(-90 {label_x} {label_y})")),
    )
}

/// Italic multi-line caption centered under the map.
#[allow(clippy::cast_precision_loss)]
fn caption(options: &ChoroplethOptions) -> Group {
    let lines: Vec<&str> = options.caption.lines().filter(|l| !l.trim().is_empty()).collect();
    let line_height = 18.0;
    let top = (lines.len() as f64).mul_add(-line_height, options.height - 20.0);

    lines.iter().enumerate().fold(
        Group::new()
            .set("id", "caption")
            .set("font-family", "sans-serif")
            .set("font-size", 14)
            .set("font-style", "italic")
            .set("text-anchor", "middle"),
        |group, (i, line)| {
            group.add(
                Text::new(*line)
                    .set("x", options.width / 2.0)
                    .set("y", (i as f64).mul_add(line_height, top + line_height)),
            )
        },
    )
}

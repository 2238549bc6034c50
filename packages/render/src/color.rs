//! Continuous color scales.

/// `ColorBrewer` `YlOrRd` (9 classes), light to dark.
const YL_OR_RD: &[(u8, u8, u8)] = &[
    (0xff, 0xff, 0xcc),
    (0xff, 0xed, 0xa0),
    (0xfe, 0xd9, 0x76),
    (0xfe, 0xb2, 0x4c),
    (0xfd, 0x8d, 0x3c),
    (0xfc, 0x4e, 0x2a),
    (0xe3, 0x1a, 0x1c),
    (0xbd, 0x00, 0x26),
    (0x80, 0x00, 0x26),
];

/// Inclusive range of values a color scale spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl ScoreRange {
    /// The observed min/max of `values`. Returns `None` when empty.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |range, v| {
            Some(match range {
                None => Self { min: v, max: v },
                Some(Self { min, max }) => Self {
                    min: min.min(v),
                    max: max.max(v),
                },
            })
        })
    }

    /// Position of `value` within the range, clamped to `[0, 1]`.
    ///
    /// A degenerate range maps everything to the middle.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    /// `count` evenly spaced values from `min` to `max` inclusive.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => (0..count)
                .map(|i| {
                    let t = i as f64 / (count - 1) as f64;
                    (self.max - self.min).mul_add(t, self.min)
                })
                .collect(),
        }
    }
}

/// A piecewise-linear color scale over evenly spaced stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScale {
    stops: &'static [(u8, u8, u8)],
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::yl_or_rd()
    }
}

impl ColorScale {
    /// Yellow → orange → red.
    #[must_use]
    pub const fn yl_or_rd() -> Self {
        Self { stops: YL_OR_RD }
    }

    /// Color at `t ∈ [0, 1]` as `#rrggbb`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn at(&self, t: f64) -> String {
        let t = t.clamp(0.0, 1.0);
        let last = self.stops.len() - 1;
        let pos = t * last as f64;
        let i = (pos.floor() as usize).min(last.saturating_sub(1));
        let frac = pos - i as f64;

        let (r0, g0, b0) = self.stops[i];
        let (r1, g1, b1) = self.stops[(i + 1).min(last)];

        let lerp = |a: u8, b: u8| -> u8 {
            (f64::from(b) - f64::from(a))
                .mul_add(frac, f64::from(a))
                .round() as u8
        };

        format!(
            "#{:02x}{:02x}{:02x}",
            lerp(r0, r1),
            lerp(g0, g1),
            lerp(b0, b1)
        )
    }

    /// Stops as `(offset, #rrggbb)` pairs, for SVG gradients.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn gradient_stops(&self) -> Vec<(f64, String)> {
        let last = (self.stops.len() - 1) as f64;
        self.stops
            .iter()
            .enumerate()
            .map(|(i, (r, g, b))| (i as f64 / last, format!("#{r:02x}{g:02x}{b:02x}")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_first_and_last_stop() {
        let scale = ColorScale::yl_or_rd();
        assert_eq!(scale.at(0.0), "#ffffcc");
        assert_eq!(scale.at(1.0), "#800026");
        assert_eq!(scale.at(-3.0), "#ffffcc");
        assert_eq!(scale.at(7.0), "#800026");
    }

    #[test]
    fn midpoint_hits_middle_stop() {
        assert_eq!(ColorScale::yl_or_rd().at(0.5), "#fd8d3c");
    }

    #[test]
    fn range_from_values() {
        let range = ScoreRange::from_values([61.2, 60.0, 63.9]).unwrap();
        assert!((range.min - 60.0).abs() < f64::EPSILON);
        assert!((range.max - 63.9).abs() < f64::EPSILON);
        assert!(ScoreRange::from_values(std::iter::empty()).is_none());
    }

    #[test]
    fn normalize_clamps_and_handles_flat_range() {
        let range = ScoreRange { min: 60.0, max: 70.0 };
        assert!((range.normalize(65.0) - 0.5).abs() < 1e-12);
        assert!(range.normalize(50.0).abs() < f64::EPSILON);
        assert!((range.normalize(80.0) - 1.0).abs() < f64::EPSILON);

        let flat = ScoreRange { min: 60.0, max: 60.0 };
        assert!((flat.normalize(60.0) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn ticks_span_range() {
        let ticks = ScoreRange { min: 60.0, max: 64.0 }.ticks(5);
        assert_eq!(ticks.len(), 5);
        assert!((ticks[0] - 60.0).abs() < 1e-12);
        assert!((ticks[2] - 62.0).abs() < 1e-12);
        assert!((ticks[4] - 64.0).abs() < 1e-12);
    }

    #[test]
    fn gradient_stops_cover_unit_interval() {
        let stops = ColorScale::yl_or_rd().gradient_stops();
        assert_eq!(stops.len(), 9);
        assert!(stops[0].0.abs() < f64::EPSILON);
        assert!((stops[8].0 - 1.0).abs() < f64::EPSILON);
    }
}

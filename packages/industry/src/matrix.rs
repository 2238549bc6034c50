//! Province by industry layout for the bubble matrix chart.

use ai_exposure_industry_models::IndustryExposureRecord;

/// Column order for known industries, most exposed sectors first.
pub const INDUSTRY_ORDER: &[&str] = &[
    "Finance & Insurance",
    "Professional & Technical Services",
    "Retail",
    "Healthcare",
    "Manufacturing",
    "Transportation & Warehousing",
    "Natural Resources",
];

/// Bubble size (in square points) given to the largest record.
pub const MAX_BUBBLE_SIZE: f64 = 2000.0;

/// One record placed at a row and column of the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleCell {
    /// Row index (0 = top).
    pub row: usize,
    /// Column index (0 = left).
    pub column: usize,
    /// The underlying record.
    pub record: IndustryExposureRecord,
}

/// Records arranged on a province × industry grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleMatrix {
    /// Province names, top to bottom, in order of first appearance.
    pub rows: Vec<String>,
    /// Industry names, left to right. Known industries follow
    /// [`INDUSTRY_ORDER`]; unknown ones are appended as they appear.
    pub columns: Vec<String>,
    /// One cell per record.
    pub cells: Vec<BubbleCell>,
    /// Largest `workers_exposed` across all records (0 when empty).
    pub max_exposed: u64,
}

impl BubbleMatrix {
    /// Lays out `records` on the grid.
    #[must_use]
    pub fn new(records: Vec<IndustryExposureRecord>) -> Self {
        let mut rows: Vec<String> = Vec::new();
        for record in &records {
            if !rows.contains(&record.province) {
                rows.push(record.province.clone());
            }
        }

        let mut columns: Vec<String> = INDUSTRY_ORDER
            .iter()
            .filter(|name| records.iter().any(|r| r.industry == **name))
            .map(ToString::to_string)
            .collect();
        for record in &records {
            if !columns.contains(&record.industry) {
                log::debug!("Appending unlisted industry '{}'", record.industry);
                columns.push(record.industry.clone());
            }
        }

        let max_exposed = records.iter().map(|r| r.workers_exposed).max().unwrap_or(0);

        let mut cells: Vec<BubbleCell> = Vec::with_capacity(records.len());
        for record in records {
            let row = rows.iter().position(|p| *p == record.province).unwrap_or(0);
            let column = columns
                .iter()
                .position(|i| *i == record.industry)
                .unwrap_or(0);

            if cells.iter().any(|c| c.row == row && c.column == column) {
                log::warn!(
                    "Duplicate record for {} / {}; bubbles will overlap",
                    record.province,
                    record.industry
                );
            }

            cells.push(BubbleCell {
                row,
                column,
                record,
            });
        }

        Self {
            rows,
            columns,
            cells,
            max_exposed,
        }
    }

    /// Whether the matrix holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bubble size (area, in square points) for a number of exposed workers.
    ///
    /// Linear in `exposed`, with the largest record mapped to
    /// [`MAX_BUBBLE_SIZE`].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bubble_size(&self, exposed: u64) -> f64 {
        if self.max_exposed == 0 {
            return 0.0;
        }
        exposed as f64 / self.max_exposed as f64 * MAX_BUBBLE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use ai_exposure_industry_models::ImpactTimeline;

    use super::*;

    fn record(province: &str, industry: &str, exposed: u64) -> IndustryExposureRecord {
        IndustryExposureRecord {
            province: province.to_string(),
            industry: industry.to_string(),
            total_workers: exposed * 2,
            workers_exposed: exposed,
            timeline: ImpactTimeline::Medium,
        }
    }

    #[test]
    fn embedded_matrix_shape() {
        let matrix = BubbleMatrix::new(crate::embedded().unwrap());
        assert_eq!(matrix.rows.len(), 6);
        assert_eq!(matrix.columns.len(), 7);
        assert_eq!(matrix.cells.len(), 42);
        assert_eq!(matrix.rows[0], "Ontario");
        assert_eq!(matrix.rows[5], "Saskatchewan");
        assert_eq!(matrix.columns, INDUSTRY_ORDER);
        assert_eq!(matrix.max_exposed, 609_040);
    }

    #[test]
    fn columns_follow_fixed_order() {
        let matrix = BubbleMatrix::new(vec![
            record("Ontario", "Natural Resources", 10),
            record("Ontario", "Retail", 20),
            record("Ontario", "Fishing", 5),
        ]);
        assert_eq!(matrix.columns, vec!["Retail", "Natural Resources", "Fishing"]);
        assert_eq!(matrix.cells[0].column, 1);
        assert_eq!(matrix.cells[2].column, 2);
    }

    #[test]
    fn bubble_size_is_linear() {
        let matrix = BubbleMatrix::new(vec![
            record("Ontario", "Retail", 600_000),
            record("Quebec", "Retail", 300_000),
        ]);
        assert!((matrix.bubble_size(600_000) - MAX_BUBBLE_SIZE).abs() < 1e-9);
        assert!((matrix.bubble_size(300_000) - MAX_BUBBLE_SIZE / 2.0).abs() < 1e-9);
        assert!(matrix.bubble_size(0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_matrix() {
        let matrix = BubbleMatrix::new(Vec::new());
        assert!(matrix.is_empty());
        assert!(matrix.bubble_size(100).abs() < f64::EPSILON);
    }
}

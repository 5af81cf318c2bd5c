//! Error types.

use thiserror::Error;

use crate::catalog::MetricCategory;

/// Rejected view-state mutations. The prior selection is always preserved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("unknown country: {0}")]
    UnknownCountry(String),
    #[error("unknown metric id: {0}")]
    UnknownMetric(String),
    #[error("inverted year range: {lo} > {hi}")]
    InvertedYearRange { lo: i32, hi: i32 },
    #[error("year range {lo}-{hi} outside the available {min}-{max} for {country}")]
    YearRangeOutOfBounds {
        country: String,
        lo: i32,
        hi: i32,
        min: i32,
        max: i32,
    },
    #[error("relationship view needs two different metrics, got {0} on both axes")]
    EqualAxes(String),
    #[error("metric {metric} is not a {category} metric")]
    MetricOutsideCategory {
        metric: String,
        category: MetricCategory,
    },
    #[error("dataset contains no records")]
    EmptyDataset,
}

/// Failures while assembling a view payload. Confined to the affected view;
/// the rest of the dashboard keeps rendering.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error("dataset is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

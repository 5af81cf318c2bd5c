use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// A single (country, year) observation.
///
/// Metric values are keyed by the raw source column name (see
/// [`crate::catalog`]); a missing cell in the source is an absent key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub country: String,
    pub year: i32,
    /// Metric id → value for the metrics present on this row.
    pub values: BTreeMap<String, f64>,
}

impl Record {
    /// Value of one metric column, `None` when the cell is missing.
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }
}

// ---------------------------------------------------------------------------
// IndicatorDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
///
/// Invariant: at most one record per (country, year) pair; read-only after
/// load. Shared behind an `Arc` handle for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct IndicatorDataset {
    /// All observations (rows), in source order.
    pub records: Vec<Record>,
    /// Ordered list of distinct country names.
    pub countries: Vec<String>,
    /// Metric columns that actually appear in the source file.
    pub metric_columns: BTreeSet<String>,
    /// Per-country (min, max) observation years.
    year_bounds: BTreeMap<String, (i32, i32)>,
}

impl IndicatorDataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut countries: BTreeSet<String> = BTreeSet::new();
        let mut metric_columns: BTreeSet<String> = BTreeSet::new();
        let mut year_bounds: BTreeMap<String, (i32, i32)> = BTreeMap::new();

        for rec in &records {
            countries.insert(rec.country.clone());
            for col in rec.values.keys() {
                if !metric_columns.contains(col) {
                    metric_columns.insert(col.clone());
                }
            }
            year_bounds
                .entry(rec.country.clone())
                .and_modify(|(lo, hi)| {
                    *lo = (*lo).min(rec.year);
                    *hi = (*hi).max(rec.year);
                })
                .or_insert((rec.year, rec.year));
        }

        IndicatorDataset {
            records,
            countries: countries.into_iter().collect(),
            metric_columns,
            year_bounds,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Observation year bounds for one country, `None` if it has no rows.
    pub fn year_bounds(&self, country: &str) -> Option<(i32, i32)> {
        self.year_bounds.get(country).copied()
    }

    /// Whether any record carries this country.
    pub fn has_country(&self, country: &str) -> bool {
        self.year_bounds.contains_key(country)
    }

    /// Whether this metric column appears anywhere in the source file.
    pub fn has_column(&self, column: &str) -> bool {
        self.metric_columns.contains(column)
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Shorthand record constructor shared by the unit tests of this crate.
#[cfg(test)]
pub(crate) fn record(country: &str, year: i32, values: &[(&str, f64)]) -> Record {
    Record {
        country: country.to_string(),
        year,
        values: values.iter().map(|&(k, v)| (k.to_string(), v)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_records_builds_indices() {
        let ds = IndicatorDataset::from_records(vec![
            record("Ireland", 2010, &[("gdp_per_capita (US$)", 48671.0)]),
            record("Austria", 2011, &[("unemployment_rate (%)", 4.6)]),
            record("Ireland", 2012, &[("gdp_per_capita (US$)", 49177.0)]),
        ]);

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.countries, vec!["Austria", "Ireland"]);
        assert_eq!(ds.year_bounds("Ireland"), Some((2010, 2012)));
        assert_eq!(ds.year_bounds("Austria"), Some((2011, 2011)));
        assert_eq!(ds.year_bounds("France"), None);
        assert!(ds.has_column("gdp_per_capita (US$)"));
        assert!(ds.has_column("unemployment_rate (%)"));
        assert!(!ds.has_column("exports (%)"));
    }

    #[test]
    fn value_lookup_distinguishes_missing_cells() {
        let rec = record("Ireland", 2010, &[("exports (%)", 102.3)]);
        assert_eq!(rec.value("exports (%)"), Some(102.3));
        assert_eq!(rec.value("tax_revenue (%)"), None);
    }

    #[test]
    fn empty_dataset() {
        let ds = IndicatorDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert!(ds.countries.is_empty());
    }
}

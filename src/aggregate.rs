use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::IndicatorDataset;

// ---------------------------------------------------------------------------
// Aggregation method
// ---------------------------------------------------------------------------

/// Per-year reduction applied to a metric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AggMethod {
    Mean,
    Median,
    Max,
    Min,
}

impl AggMethod {
    /// All methods, in the order the comparison picker offers them.
    pub const ALL: [AggMethod; 4] = [
        AggMethod::Mean,
        AggMethod::Median,
        AggMethod::Max,
        AggMethod::Min,
    ];

    /// Label used in series names and legends.
    pub fn label(self) -> &'static str {
        match self {
            AggMethod::Mean => "Mean",
            AggMethod::Median => "Median",
            AggMethod::Max => "Max",
            AggMethod::Min => "Min",
        }
    }

    /// Reduce a non-empty group of values. Median sorts in place.
    pub fn reduce(self, values: &mut [f64]) -> f64 {
        match self {
            AggMethod::Mean => values.iter().sum::<f64>() / values.len() as f64,
            AggMethod::Median => {
                values.sort_by(|a, b| a.total_cmp(b));
                let mid = values.len() / 2;
                if values.len() % 2 == 1 {
                    values[mid]
                } else {
                    (values[mid - 1] + values[mid]) / 2.0
                }
            }
            AggMethod::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggMethod::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregated series
// ---------------------------------------------------------------------------

/// One (year, value) point of an aggregated series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: f64,
}

/// Year-ascending aggregated values for one metric.
pub type AggregatedSeries = Vec<SeriesPoint>;

/// Group a subset by year and reduce one metric per group.
///
/// Rows with a missing value are excluded from their group; a year whose
/// group has no valid values yields no point at all, not zero. Output is
/// ascending by year.
pub fn aggregate(
    dataset: &IndicatorDataset,
    indices: &[usize],
    metric: &str,
    method: AggMethod,
) -> AggregatedSeries {
    let mut groups: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for &idx in indices {
        let rec = &dataset.records[idx];
        if let Some(v) = rec.value(metric) {
            groups.entry(rec.year).or_default().push(v);
        }
    }
    groups
        .into_iter()
        .map(|(year, mut vals)| SeriesPoint {
            year,
            value: method.reduce(&mut vals),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Comparison series
// ---------------------------------------------------------------------------

/// One long-form row of a comparison series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub year: i32,
    pub series: String,
    pub value: f64,
}

/// Long-form merge of two aggregated series for grouped display.
pub type ComparisonSeries = Vec<ComparisonPoint>;

/// Inner-join two aggregated series on year and reshape long-form,
/// series-major (all of `a`, then all of `b`).
///
/// Years present on only one side are dropped from the comparison.
pub fn merge(
    a: &AggregatedSeries,
    b: &AggregatedSeries,
    label_a: &str,
    label_b: &str,
) -> ComparisonSeries {
    let b_by_year: BTreeMap<i32, f64> = b.iter().map(|p| (p.year, p.value)).collect();
    let joined: Vec<(i32, f64, f64)> = a
        .iter()
        .filter_map(|p| b_by_year.get(&p.year).map(|&vb| (p.year, p.value, vb)))
        .collect();

    let mut out = Vec::with_capacity(joined.len() * 2);
    for &(year, va, _) in &joined {
        out.push(ComparisonPoint {
            year,
            series: label_a.to_string(),
            value: va,
        });
    }
    for &(year, _, vb) in &joined {
        out.push(ComparisonPoint {
            year,
            series: label_b.to_string(),
            value: vb,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;

    const EXPORTS: &str = "exports (%)";

    fn single_row_per_year() -> IndicatorDataset {
        IndicatorDataset::from_records(vec![
            record("Ireland", 2010, &[(EXPORTS, 88.0)]),
            record("Ireland", 2011, &[(EXPORTS, 91.0)]),
            record("Ireland", 2012, &[(EXPORTS, 95.0)]),
        ])
    }

    #[test]
    fn single_row_groups_return_the_value_unchanged_for_every_method() {
        let ds = single_row_per_year();
        let indices: Vec<usize> = (0..ds.len()).collect();
        for method in AggMethod::ALL {
            let series = aggregate(&ds, &indices, EXPORTS, method);
            assert_eq!(
                series,
                vec![
                    SeriesPoint { year: 2010, value: 88.0 },
                    SeriesPoint { year: 2011, value: 91.0 },
                    SeriesPoint { year: 2012, value: 95.0 },
                ],
                "method {}",
                method.label()
            );
        }
    }

    #[test]
    fn missing_values_are_excluded_from_the_group() {
        // A year-group of [5, missing] under mean yields 5, not an error.
        let ds = IndicatorDataset::from_records(vec![
            record("Ireland", 2010, &[(EXPORTS, 5.0)]),
            record("Austria", 2010, &[]),
        ]);
        let series = aggregate(&ds, &[0, 1], EXPORTS, AggMethod::Mean);
        assert_eq!(series, vec![SeriesPoint { year: 2010, value: 5.0 }]);
    }

    #[test]
    fn all_missing_year_yields_no_point() {
        let ds = IndicatorDataset::from_records(vec![
            record("Ireland", 2010, &[(EXPORTS, 5.0)]),
            record("Ireland", 2011, &[]),
        ]);
        let series = aggregate(&ds, &[0, 1], EXPORTS, AggMethod::Mean);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].year, 2010);
    }

    #[test]
    fn median_of_even_and_odd_groups() {
        let ds = IndicatorDataset::from_records(vec![
            record("A", 2010, &[(EXPORTS, 3.0)]),
            record("B", 2010, &[(EXPORTS, 1.0)]),
            record("C", 2010, &[(EXPORTS, 2.0)]),
            record("A", 2011, &[(EXPORTS, 4.0)]),
            record("B", 2011, &[(EXPORTS, 1.0)]),
        ]);
        let series = aggregate(&ds, &[0, 1, 2, 3, 4], EXPORTS, AggMethod::Median);
        assert_eq!(series[0].value, 2.0);
        assert_eq!(series[1].value, 2.5);
    }

    #[test]
    fn merge_drops_years_missing_from_either_side() {
        let a = vec![
            SeriesPoint { year: 2000, value: 1.0 },
            SeriesPoint { year: 2001, value: 2.0 },
        ];
        let b = vec![
            SeriesPoint { year: 2001, value: 5.0 },
            SeriesPoint { year: 2002, value: 6.0 },
        ];
        let merged = merge(&a, &b, "Exports (%) (Mean)", "FDI (US$) (Max)");
        assert_eq!(
            merged,
            vec![
                ComparisonPoint {
                    year: 2001,
                    series: "Exports (%) (Mean)".to_string(),
                    value: 2.0,
                },
                ComparisonPoint {
                    year: 2001,
                    series: "FDI (US$) (Max)".to_string(),
                    value: 5.0,
                },
            ]
        );
    }

    #[test]
    fn merge_is_series_major() {
        let a = vec![
            SeriesPoint { year: 2000, value: 1.0 },
            SeriesPoint { year: 2001, value: 2.0 },
        ];
        let b = a.clone();
        let merged = merge(&a, &b, "left", "right");
        let series: Vec<&str> = merged.iter().map(|p| p.series.as_str()).collect();
        assert_eq!(series, vec!["left", "left", "right", "right"]);
    }
}

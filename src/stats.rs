use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog;
use crate::data::model::IndicatorDataset;

// ---------------------------------------------------------------------------
// Scalar summaries over a filtered subset
// ---------------------------------------------------------------------------

/// Arithmetic mean of the non-missing values of `metric` over the subset.
/// `None` when the subset carries no valid values.
pub fn period_average(
    dataset: &IndicatorDataset,
    indices: &[usize],
    metric: &str,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for &idx in indices {
        if let Some(v) = dataset.records[idx].value(metric) {
            sum += v;
            n += 1;
        }
    }
    (n > 0).then(|| sum / n as f64)
}

/// Difference between the boundary-year values of `metric`:
/// `value_at(year_hi) - value_at(year_lo)`.
///
/// Falls back to 0.0 when either boundary year has no row in the subset,
/// matches more than one row, or the value is missing on a boundary row.
/// The fallback is a documented policy, never an error.
pub fn period_delta(
    dataset: &IndicatorDataset,
    indices: &[usize],
    metric: &str,
    year_lo: i32,
    year_hi: i32,
) -> f64 {
    match (
        boundary_value(dataset, indices, metric, year_lo),
        boundary_value(dataset, indices, metric, year_hi),
    ) {
        (Some(lo), Some(hi)) => hi - lo,
        _ => {
            log::debug!(
                "no unambiguous boundary values for {metric} in {year_lo}-{year_hi}, \
                 delta falls back to 0"
            );
            0.0
        }
    }
}

/// The metric value of the single subset row matching `year`. `None` when
/// no row matches, more than one matches, or the cell is missing.
fn boundary_value(
    dataset: &IndicatorDataset,
    indices: &[usize],
    metric: &str,
    year: i32,
) -> Option<f64> {
    let mut rows = indices
        .iter()
        .map(|&i| &dataset.records[i])
        .filter(|rec| rec.year == year);
    let first = rows.next()?;
    if rows.next().is_some() {
        return None;
    }
    first.value(metric)
}

// ---------------------------------------------------------------------------
// Grouped means for the map
// ---------------------------------------------------------------------------

/// Per-country mean of `metric` over a year-filtered subset spanning ALL
/// countries. Countries without valid values are omitted.
///
/// The subset must come from a year-only filter; the map is independent of
/// the currently selected country by design.
pub fn grouped_mean_by_country(
    dataset: &IndicatorDataset,
    indices: &[usize],
    metric: &str,
) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for &idx in indices {
        let rec = &dataset.records[idx];
        if let Some(v) = rec.value(metric) {
            let entry = sums.entry(rec.country.as_str()).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(country, (sum, n))| (country.to_string(), sum / n as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Headline summary + latest-year snapshot
// ---------------------------------------------------------------------------

/// Sign classification of a period delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Rising,
    Falling,
    Flat,
}

impl Trend {
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Trend::Rising
        } else if delta < 0.0 {
            Trend::Falling
        } else {
            Trend::Flat
        }
    }
}

/// Metrics shown in the summary panel, in display order.
pub const HEADLINE_METRICS: [&str; 4] = [
    catalog::UNEMPLOYMENT,
    catalog::INFLATION,
    catalog::GDP_PER_CAPITA,
    catalog::POPULATION,
];

/// One figure of the summary panel: period average plus boundary delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineStat {
    pub metric: String,
    pub label: String,
    pub average: Option<f64>,
    pub delta: f64,
    pub trend: Trend,
}

/// Averages and period deltas for the headline metrics over the subset.
pub fn headline(
    dataset: &IndicatorDataset,
    indices: &[usize],
    year_lo: i32,
    year_hi: i32,
) -> Vec<HeadlineStat> {
    HEADLINE_METRICS
        .iter()
        .map(|&metric| {
            let delta = period_delta(dataset, indices, metric, year_lo, year_hi);
            HeadlineStat {
                metric: metric.to_string(),
                label: catalog::label_for(metric).to_string(),
                average: period_average(dataset, indices, metric),
                delta,
                trend: Trend::of(delta),
            }
        })
        .collect()
}

/// Values highlighted for the newest year of the filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestSnapshot {
    pub year: i32,
    pub unemployment: Option<f64>,
    pub inflation: Option<f64>,
    pub gdp_per_capita: Option<f64>,
}

/// Snapshot of the newest subset row, `None` when the subset is empty.
pub fn latest_snapshot(dataset: &IndicatorDataset, indices: &[usize]) -> Option<LatestSnapshot> {
    let latest = indices
        .iter()
        .map(|&i| &dataset.records[i])
        .max_by_key(|rec| rec.year)?;
    Some(LatestSnapshot {
        year: latest.year,
        unemployment: latest.value(catalog::UNEMPLOYMENT),
        inflation: latest.value(catalog::INFLATION),
        gdp_per_capita: latest.value(catalog::GDP_PER_CAPITA),
    })
}

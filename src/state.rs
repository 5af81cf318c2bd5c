use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use serde::Serialize;

use crate::aggregate::{self, AggMethod, ComparisonSeries, SeriesPoint};
use crate::catalog::{self, MetricCategory};
use crate::data::filter::{filter_by_country_and_years, filter_by_years};
use crate::data::model::{IndicatorDataset, Record};
use crate::error::{SelectionError, ViewError};
use crate::export;
use crate::scatter::{self, ScatterColor, ScatterData};
use crate::stats::{self, HeadlineStat, LatestSnapshot};

// ---------------------------------------------------------------------------
// Selection – the full set of current user choices
// ---------------------------------------------------------------------------

/// One side of the comparison view: a metric reduced with a method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonChoice {
    pub metric: String,
    pub method: AggMethod,
}

impl ComparisonChoice {
    /// Legend label, e.g. `"Exports (%) (Mean)"`.
    pub fn series_label(&self) -> String {
        format!("{} ({})", catalog::label_for(&self.metric), self.method.label())
    }
}

/// X/Y metric pair of the relationship view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipChoice {
    pub x: String,
    pub y: String,
    pub color: ScatterColor,
}

/// Category + metric shown on the choropleth map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapChoice {
    pub category: MetricCategory,
    pub metric: String,
}

/// Everything the user has currently selected. Mutated only through the
/// validating setters on [`DashboardState`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub country: String,
    /// Inclusive [lo, hi] year window within the country's bounds.
    pub year_range: (i32, i32),
    /// Metrics of the time-series view; empty is a valid "nothing selected"
    /// state.
    pub metrics: Vec<String>,
    pub comparison: (ComparisonChoice, ComparisonChoice),
    pub relationship: RelationshipChoice,
    pub map: MapChoice,
}

// ---------------------------------------------------------------------------
// View payloads
// ---------------------------------------------------------------------------

/// Single-metric (year, value) points of the time-series view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    pub metric: String,
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

// ---------------------------------------------------------------------------
// DashboardState – the view-state model external views bind to
// ---------------------------------------------------------------------------

/// Holds the current [`Selection`] over an immutable dataset handle and
/// recomputes the view payloads on demand.
///
/// Every setter validates its input against the catalog / dataset domain
/// and either applies the change or rejects it, leaving prior state intact.
pub struct DashboardState {
    dataset: Arc<IndicatorDataset>,
    selection: Selection,
    /// Indices of records passing the country + year filter (refreshed
    /// after every accepted mutation).
    filtered: Vec<usize>,
}

impl DashboardState {
    /// Build the model with the default selection: first country, full year
    /// range, the stock time-series metrics, and the first catalog entries
    /// for the comparison / relationship / map views.
    pub fn new(dataset: Arc<IndicatorDataset>) -> Result<Self, SelectionError> {
        let country = dataset
            .countries
            .first()
            .cloned()
            .ok_or(SelectionError::EmptyDataset)?;
        let year_range = dataset
            .year_bounds(&country)
            .ok_or(SelectionError::EmptyDataset)?;

        let first = catalog::METRICS[0].id;
        let second = catalog::METRICS[1].id;
        let selection = Selection {
            country,
            year_range,
            metrics: vec![
                catalog::UNEMPLOYMENT.to_string(),
                catalog::GDP_PER_CAPITA.to_string(),
            ],
            comparison: (
                ComparisonChoice {
                    metric: first.to_string(),
                    method: AggMethod::Mean,
                },
                ComparisonChoice {
                    metric: first.to_string(),
                    method: AggMethod::Mean,
                },
            ),
            relationship: RelationshipChoice {
                x: first.to_string(),
                y: second.to_string(),
                color: ScatterColor::None,
            },
            map: MapChoice {
                category: MetricCategory::Economic,
                metric: catalog::GDP_PER_CAPITA.to_string(),
            },
        };

        let mut state = DashboardState {
            dataset,
            selection,
            filtered: Vec::new(),
        };
        state.refilter();
        Ok(state)
    }

    pub fn dataset(&self) -> &IndicatorDataset {
        &self.dataset
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Recompute the cached filtered subset from the current selection.
    fn refilter(&mut self) {
        let (lo, hi) = self.selection.year_range;
        self.filtered =
            filter_by_country_and_years(&self.dataset, &self.selection.country, lo, hi);
    }

    // -- Mutators ----------------------------------------------------------

    /// Switch country; the year range resets to the country's full bounds.
    pub fn set_country(&mut self, country: &str) -> Result<(), SelectionError> {
        let bounds = self
            .dataset
            .year_bounds(country)
            .ok_or_else(|| SelectionError::UnknownCountry(country.to_string()))?;
        self.selection.country = country.to_string();
        self.selection.year_range = bounds;
        self.refilter();
        Ok(())
    }

    /// Narrow or widen the year window within the country's bounds.
    pub fn set_year_range(&mut self, lo: i32, hi: i32) -> Result<(), SelectionError> {
        if lo > hi {
            return Err(SelectionError::InvertedYearRange { lo, hi });
        }
        let (min, max) = self
            .dataset
            .year_bounds(&self.selection.country)
            .ok_or_else(|| SelectionError::UnknownCountry(self.selection.country.clone()))?;
        if lo < min || hi > max {
            return Err(SelectionError::YearRangeOutOfBounds {
                country: self.selection.country.clone(),
                lo,
                hi,
                min,
                max,
            });
        }
        self.selection.year_range = (lo, hi);
        self.refilter();
        Ok(())
    }

    /// Replace the time-series metric set. Empty is allowed.
    pub fn set_metrics(&mut self, metrics: Vec<String>) -> Result<(), SelectionError> {
        for id in &metrics {
            if !catalog::is_known(id) {
                return Err(SelectionError::UnknownMetric(id.clone()));
            }
        }
        self.selection.metrics = metrics;
        Ok(())
    }

    /// Replace both sides of the comparison view.
    pub fn set_comparison_choice(
        &mut self,
        first: ComparisonChoice,
        second: ComparisonChoice,
    ) -> Result<(), SelectionError> {
        for id in [&first.metric, &second.metric] {
            if !catalog::is_known(id) {
                return Err(SelectionError::UnknownMetric(id.clone()));
            }
        }
        self.selection.comparison = (first, second);
        Ok(())
    }

    /// Pick the relationship view's axes; X and Y must differ.
    pub fn set_relationship_choice(
        &mut self,
        x: &str,
        y: &str,
        color: ScatterColor,
    ) -> Result<(), SelectionError> {
        for id in [x, y] {
            if !catalog::is_known(id) {
                return Err(SelectionError::UnknownMetric(id.to_string()));
            }
        }
        if x == y {
            return Err(SelectionError::EqualAxes(x.to_string()));
        }
        self.selection.relationship = RelationshipChoice {
            x: x.to_string(),
            y: y.to_string(),
            color,
        };
        Ok(())
    }

    /// Pick the map's category + metric; the metric must belong to the
    /// category.
    pub fn set_map_choice(
        &mut self,
        category: MetricCategory,
        metric: &str,
    ) -> Result<(), SelectionError> {
        let desc = catalog::descriptor(metric)
            .ok_or_else(|| SelectionError::UnknownMetric(metric.to_string()))?;
        if desc.category != category {
            return Err(SelectionError::MetricOutsideCategory {
                metric: metric.to_string(),
                category,
            });
        }
        self.selection.map = MapChoice {
            category,
            metric: metric.to_string(),
        };
        Ok(())
    }

    // -- View payloads -----------------------------------------------------

    /// Indices of the current filtered subset, in source order.
    pub fn filtered_indices(&self) -> &[usize] {
        &self.filtered
    }

    /// Records of the current filtered subset.
    pub fn filtered_records(&self) -> Vec<&Record> {
        self.filtered.iter().map(|&i| &self.dataset.records[i]).collect()
    }

    /// One single-metric series per selected metric, years ascending.
    /// Missing cells yield no point (the renderer breaks the line there).
    pub fn time_series(&self) -> Vec<MetricSeries> {
        self.selection
            .metrics
            .iter()
            .map(|id| {
                let mut points: Vec<SeriesPoint> = self
                    .filtered
                    .iter()
                    .filter_map(|&i| {
                        let rec = &self.dataset.records[i];
                        rec.value(id).map(|v| SeriesPoint {
                            year: rec.year,
                            value: v,
                        })
                    })
                    .collect();
                points.sort_by_key(|p| p.year);
                MetricSeries {
                    metric: id.clone(),
                    label: catalog::label_for(id).to_string(),
                    points,
                }
            })
            .collect()
    }

    /// The comparison view's long-form series, labelled
    /// `"<metric label> (<method>)"`.
    pub fn comparison(&self) -> ComparisonSeries {
        let (first, second) = &self.selection.comparison;
        let a = aggregate::aggregate(&self.dataset, &self.filtered, &first.metric, first.method);
        let b = aggregate::aggregate(&self.dataset, &self.filtered, &second.metric, second.method);
        aggregate::merge(&a, &b, &first.series_label(), &second.series_label())
    }

    /// The relationship view's scatter table.
    pub fn relationship(&self) -> Result<ScatterData, ViewError> {
        let rel = &self.selection.relationship;
        scatter::scatter_table(&self.dataset, &self.filtered, &rel.x, &rel.y, rel.color)
    }

    /// Per-country means feeding the map. Spans ALL countries over the
    /// selected year window; never restricted to the selected country.
    pub fn map_values(&self) -> BTreeMap<String, f64> {
        let (lo, hi) = self.selection.year_range;
        let window = filter_by_years(&self.dataset, lo, hi);
        stats::grouped_mean_by_country(&self.dataset, &window, &self.selection.map.metric)
    }

    /// Legend label of the map view.
    pub fn map_label(&self) -> &str {
        catalog::label_for(&self.selection.map.metric)
    }

    /// Summary panel: averages + period deltas for the headline metrics.
    pub fn headline(&self) -> Vec<HeadlineStat> {
        let (lo, hi) = self.selection.year_range;
        stats::headline(&self.dataset, &self.filtered, lo, hi)
    }

    /// Latest-year highlights, `None` when the subset is empty.
    pub fn latest_snapshot(&self) -> Option<LatestSnapshot> {
        stats::latest_snapshot(&self.dataset, &self.filtered)
    }

    /// Serialize the current filtered subset as CSV for download.
    pub fn export_csv<W: io::Write>(&self, writer: W) -> anyhow::Result<()> {
        export::write_csv(&self.dataset, &self.filtered, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;

    const GDP: &str = "gdp_per_capita (US$)";
    const UNEMP: &str = "unemployment_rate (%)";

    /// Two countries × three years, fully populated.
    fn dataset() -> Arc<IndicatorDataset> {
        let mut records = Vec::new();
        for (country, base) in [("Austria", 50.0), ("Ireland", 80.0)] {
            for (i, year) in (2010..=2012).enumerate() {
                records.push(record(
                    country,
                    year,
                    &[
                        (GDP, base * 1000.0 + i as f64),
                        (UNEMP, 10.0 - i as f64),
                        ("population_total", 5e6 + i as f64),
                    ],
                ));
            }
        }
        Arc::new(IndicatorDataset::from_records(records))
    }

    #[test]
    fn defaults_cover_the_first_country_in_full() {
        let state = DashboardState::new(dataset()).unwrap();
        let sel = state.selection();
        assert_eq!(sel.country, "Austria");
        assert_eq!(sel.year_range, (2010, 2012));
        assert_eq!(sel.metrics, vec![UNEMP.to_string(), GDP.to_string()]);
        assert_ne!(sel.relationship.x, sel.relationship.y);
        assert_eq!(state.filtered_indices().len(), 3);
    }

    #[test]
    fn empty_dataset_is_rejected_at_construction() {
        let ds = Arc::new(IndicatorDataset::from_records(Vec::new()));
        assert_eq!(
            DashboardState::new(ds).err(),
            Some(SelectionError::EmptyDataset)
        );
    }

    #[test]
    fn set_country_resets_the_year_range() {
        let mut state = DashboardState::new(dataset()).unwrap();
        state.set_year_range(2011, 2011).unwrap();
        state.set_country("Ireland").unwrap();
        assert_eq!(state.selection().year_range, (2010, 2012));
        assert_eq!(state.filtered_indices().len(), 3);
    }

    #[test]
    fn unknown_country_is_rejected_and_state_kept() {
        let mut state = DashboardState::new(dataset()).unwrap();
        let before = state.selection().clone();
        assert_eq!(
            state.set_country("Atlantis").err(),
            Some(SelectionError::UnknownCountry("Atlantis".to_string()))
        );
        assert_eq!(state.selection(), &before);
    }

    #[test]
    fn year_range_validation() {
        let mut state = DashboardState::new(dataset()).unwrap();
        assert!(matches!(
            state.set_year_range(2012, 2010),
            Err(SelectionError::InvertedYearRange { .. })
        ));
        assert!(matches!(
            state.set_year_range(2005, 2012),
            Err(SelectionError::YearRangeOutOfBounds { .. })
        ));
        assert_eq!(state.selection().year_range, (2010, 2012));

        state.set_year_range(2011, 2012).unwrap();
        assert_eq!(state.filtered_indices().len(), 2);
    }

    #[test]
    fn metric_set_accepts_empty_and_rejects_unknown_ids() {
        let mut state = DashboardState::new(dataset()).unwrap();
        state.set_metrics(Vec::new()).unwrap();
        assert!(state.time_series().is_empty());

        let err = state.set_metrics(vec!["gdp".to_string()]).unwrap_err();
        assert_eq!(err, SelectionError::UnknownMetric("gdp".to_string()));
    }

    #[test]
    fn equal_relationship_axes_are_rejected_and_state_kept() {
        let mut state = DashboardState::new(dataset()).unwrap();
        let before = state.selection().relationship.clone();
        assert_eq!(
            state
                .set_relationship_choice(GDP, GDP, ScatterColor::None)
                .err(),
            Some(SelectionError::EqualAxes(GDP.to_string()))
        );
        assert_eq!(state.selection().relationship, before);
    }

    #[test]
    fn map_metric_must_match_its_category() {
        let mut state = DashboardState::new(dataset()).unwrap();
        assert!(matches!(
            state.set_map_choice(MetricCategory::Social, GDP),
            Err(SelectionError::MetricOutsideCategory { .. })
        ));
        state
            .set_map_choice(MetricCategory::Social, UNEMP)
            .unwrap();
        assert_eq!(state.selection().map.metric, UNEMP);
    }

    #[test]
    fn time_series_end_to_end() {
        // 2 countries × 3 years; selecting one country over the full range
        // yields exactly 3 points per metric, matching that country's rows.
        let mut state = DashboardState::new(dataset()).unwrap();
        state.set_country("Ireland").unwrap();
        state.set_metrics(vec![GDP.to_string()]).unwrap();

        let series = state.time_series();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "GDP Per Capita (US$)");
        assert_eq!(
            series[0].points,
            vec![
                SeriesPoint { year: 2010, value: 80000.0 },
                SeriesPoint { year: 2011, value: 80001.0 },
                SeriesPoint { year: 2012, value: 80002.0 },
            ]
        );
    }

    #[test]
    fn comparison_uses_display_labels() {
        let mut state = DashboardState::new(dataset()).unwrap();
        state
            .set_comparison_choice(
                ComparisonChoice {
                    metric: GDP.to_string(),
                    method: AggMethod::Mean,
                },
                ComparisonChoice {
                    metric: UNEMP.to_string(),
                    method: AggMethod::Max,
                },
            )
            .unwrap();

        let series = state.comparison();
        // 3 joined years × 2 series.
        assert_eq!(series.len(), 6);
        assert_eq!(series[0].series, "GDP Per Capita (US$) (Mean)");
        assert_eq!(series[5].series, "Unemployment Rate (%) (Max)");
    }

    #[test]
    fn map_values_ignore_the_selected_country() {
        let mut state = DashboardState::new(dataset()).unwrap();
        state.set_map_choice(MetricCategory::Economic, GDP).unwrap();
        let before = state.map_values();
        assert_eq!(before.len(), 2);

        state.set_country("Ireland").unwrap();
        assert_eq!(state.map_values(), before);
    }

    #[test]
    fn empty_subset_flows_through_every_view() {
        let ds = Arc::new(IndicatorDataset::from_records(vec![
            record("Austria", 2010, &[(GDP, 1.0)]),
            record("Austria", 2012, &[(GDP, 2.0)]),
        ]));
        let mut state = DashboardState::new(ds).unwrap();
        // A window with no observations is a valid, empty state.
        state.set_year_range(2011, 2011).unwrap();

        assert!(state.filtered_records().is_empty());
        assert!(state.time_series().iter().all(|s| s.points.is_empty()));
        assert!(state.comparison().is_empty());
        assert!(state.latest_snapshot().is_none());
        assert!(state.headline().iter().all(|h| h.average.is_none()));
    }
}

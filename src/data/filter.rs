use super::model::IndicatorDataset;

// ---------------------------------------------------------------------------
// Filter engine: country + year-window predicates over the record table
// ---------------------------------------------------------------------------

/// Indices of records matching `country` within the inclusive year window,
/// in original row order.
///
/// A country with no rows in the dataset yields an empty subset; callers
/// render an empty state rather than treating this as a failure.
pub fn filter_by_country_and_years(
    dataset: &IndicatorDataset,
    country: &str,
    year_lo: i32,
    year_hi: i32,
) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| rec.country == country && (year_lo..=year_hi).contains(&rec.year))
        .map(|(i, _)| i)
        .collect()
}

/// Indices of records within the inclusive year window, across all
/// countries. Feeds the map aggregation, which is never country-filtered.
pub fn filter_by_years(dataset: &IndicatorDataset, year_lo: i32, year_hi: i32) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| (year_lo..=year_hi).contains(&rec.year))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;

    fn dataset() -> IndicatorDataset {
        IndicatorDataset::from_records(vec![
            record("Ireland", 2010, &[("exports (%)", 88.0)]),
            record("Austria", 2010, &[("exports (%)", 51.0)]),
            record("Ireland", 2011, &[("exports (%)", 91.0)]),
            record("Ireland", 2012, &[("exports (%)", 95.0)]),
            record("Austria", 2012, &[("exports (%)", 53.0)]),
        ])
    }

    #[test]
    fn country_filter_is_sound_and_complete() {
        let ds = dataset();
        let idx = filter_by_country_and_years(&ds, "Ireland", 2010, 2011);

        // Soundness: every returned record satisfies the predicate.
        for &i in &idx {
            let rec = &ds.records[i];
            assert_eq!(rec.country, "Ireland");
            assert!((2010..=2011).contains(&rec.year));
        }
        // Completeness: no matching record is omitted.
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn preserves_source_order() {
        let ds = dataset();
        let idx = filter_by_country_and_years(&ds, "Ireland", 2010, 2012);
        assert_eq!(idx, vec![0, 2, 3]);
    }

    #[test]
    fn unknown_country_yields_empty_subset() {
        let ds = dataset();
        assert!(filter_by_country_and_years(&ds, "Atlantis", 2010, 2012).is_empty());
    }

    #[test]
    fn year_only_filter_spans_countries() {
        let ds = dataset();
        let idx = filter_by_years(&ds, 2012, 2012);
        assert_eq!(idx, vec![3, 4]);
    }
}

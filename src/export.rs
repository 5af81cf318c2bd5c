use std::io;

use anyhow::{Context, Result};

use crate::catalog;
use crate::data::model::IndicatorDataset;

/// Write a record subset as CSV for download.
///
/// Header is `country_name,year,<metric columns in catalog order>`; missing
/// values become empty cells. Rows keep the order of `indices`.
pub fn write_csv<W: io::Write>(
    dataset: &IndicatorDataset,
    indices: &[usize],
    writer: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = vec![catalog::COUNTRY_NAME, catalog::YEAR];
    header.extend(catalog::METRICS.iter().map(|m| m.id));
    wtr.write_record(&header).context("writing CSV header")?;

    for &idx in indices {
        let rec = &dataset.records[idx];
        let mut row: Vec<String> = vec![rec.country.clone(), rec.year.to_string()];
        for metric in catalog::METRICS {
            row.push(
                rec.value(metric.id)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&row)
            .with_context(|| format!("writing CSV row for {} {}", rec.country, rec.year))?;
    }

    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;

    #[test]
    fn header_and_missing_cells() {
        let ds = IndicatorDataset::from_records(vec![
            record("Ireland", 2010, &[(catalog::EXPORTS, 88.0)]),
            record("Ireland", 2011, &[]),
        ]);

        let mut buf = Vec::new();
        write_csv(&ds, &[0, 1], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("country_name,year,"));
        assert!(lines[0].contains("exports (%)"));
        // One value set, nine empty metric cells.
        assert!(lines[1].starts_with("Ireland,2010,"));
        assert!(lines[1].contains("88"));
        assert!(lines[2].starts_with("Ireland,2011,"));
        assert!(lines[2].ends_with(",,,,,,,,,"));
    }

    #[test]
    fn subset_order_is_preserved() {
        let ds = IndicatorDataset::from_records(vec![
            record("Ireland", 2012, &[]),
            record("Ireland", 2010, &[]),
        ]);
        let mut buf = Vec::new();
        write_csv(&ds, &[1, 0], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let years: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(1).unwrap())
            .collect();
        assert_eq!(years, vec!["2010", "2012"]);
    }
}

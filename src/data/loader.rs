use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use crate::catalog;
use super::model::{IndicatorDataset, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an indicator dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – scalar columns, one row per (country, year)
/// * `.json`    – records-oriented array of objects
/// * `.csv`     – header row; blank or non-numeric cells are missing values
///
/// Every format requires a `country_name` and a `year` column; all other
/// columns are treated as numeric metric columns.
pub fn load_file(path: &Path) -> Result<IndicatorDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<IndicatorDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let country_idx = headers
        .iter()
        .position(|h| h == catalog::COUNTRY_NAME)
        .context("CSV missing 'country_name' column")?;
    let year_idx = headers
        .iter()
        .position(|h| h == catalog::YEAR)
        .context("CSV missing 'year' column")?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let country = row.get(country_idx).unwrap_or("").trim().to_string();
        if country.is_empty() {
            bail!("CSV row {row_no}: empty country_name");
        }
        let year: i32 = row
            .get(year_idx)
            .unwrap_or("")
            .trim()
            .parse()
            .with_context(|| format!("CSV row {row_no}: invalid year"))?;

        let mut values = BTreeMap::new();
        for (col_idx, cell) in row.iter().enumerate() {
            if col_idx == country_idx || col_idx == year_idx {
                continue;
            }
            if let Ok(v) = cell.trim().parse::<f64>() {
                values.insert(headers[col_idx].clone(), v);
            }
        }

        records.push(Record { country, year, values });
    }

    Ok(IndicatorDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "country_name": "Ireland",
///     "year": 2010,
///     "gdp_per_capita (US$)": 48671.0,
///     "unemployment_rate (%)": 13.9
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<IndicatorDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let country = obj
            .get(catalog::COUNTRY_NAME)
            .and_then(|v| v.as_str())
            .with_context(|| format!("Row {i}: missing or invalid 'country_name'"))?
            .to_string();
        let year = obj
            .get(catalog::YEAR)
            .and_then(|v| v.as_i64())
            .with_context(|| format!("Row {i}: missing or invalid 'year'"))?
            as i32;

        let mut values = BTreeMap::new();
        for (key, val) in obj {
            if key == catalog::COUNTRY_NAME || key == catalog::YEAR {
                continue;
            }
            // Nulls and non-numeric values are missing cells.
            if let Some(v) = val.as_f64() {
                values.insert(key.clone(), v);
            }
        }

        records.push(Record { country, year, values });
    }

    Ok(IndicatorDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with scalar indicator columns.
///
/// Expected schema:
/// - `country_name`: Utf8
/// - `year`: Int32 or Int64
/// - Any other numeric column is treated as a metric (Float64, Float32,
///   Int64, Int32); nulls are missing cells
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<IndicatorDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let n_rows = batch.num_rows();

        let country_idx = schema
            .index_of(catalog::COUNTRY_NAME)
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'country_name' column"))?;
        let year_idx = schema
            .index_of(catalog::YEAR)
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'year' column"))?;

        let country_col = batch.column(country_idx);
        let year_col = batch.column(year_idx);

        // Collect metric column indices (everything except country, year)
        let metric_cols: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != country_idx && *i != year_idx)
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        for row in 0..n_rows {
            let country = extract_string(country_col, row)
                .with_context(|| format!("Row {row}: missing or non-string country_name"))?;
            let year = extract_year(year_col, row)
                .with_context(|| format!("Row {row}: missing or non-integer year"))?;

            let mut values = BTreeMap::new();
            for (col_idx, col_name) in &metric_cols {
                if let Some(v) = extract_numeric(batch.column(*col_idx), row) {
                    values.insert(col_name.clone(), v);
                }
            }

            records.push(Record { country, year, values });
        }
    }

    Ok(IndicatorDataset::from_records(records))
}

// -- Parquet / Arrow helpers --

/// String cell from an Arrow column at the given row.
fn extract_string(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col.as_any().downcast_ref::<StringArray>().unwrap();
            Some(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let arr = col.as_any().downcast_ref::<LargeStringArray>().unwrap();
            Some(arr.value(row).to_string())
        }
        _ => None,
    }
}

/// Integer year cell from an Arrow column at the given row.
fn extract_year(col: &Arc<dyn Array>, row: usize) -> Option<i32> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Some(arr.value(row))
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Some(arr.value(row) as i32)
        }
        _ => None,
    }
}

/// Numeric cell from an Arrow column, `None` for nulls and non-numeric
/// types.
fn extract_numeric(col: &Arc<dyn Array>, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Some(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Some(arr.value(row) as f64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Some(arr.value(row) as f64)
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Some(arr.value(row) as f64)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn csv_round_trip_with_missing_cells() {
        let path = temp_path("eurodash_loader_test.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "country_name,year,exports (%),gdp_per_capita (US$)").unwrap();
        writeln!(file, "Ireland,2010,88.5,48671").unwrap();
        writeln!(file, "Ireland,2011,,49177").unwrap();
        writeln!(file, "Austria,2010,51.2,46915").unwrap();
        drop(file);

        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.countries, vec!["Austria", "Ireland"]);
        assert_eq!(ds.records[0].value("exports (%)"), Some(88.5));
        assert_eq!(ds.records[1].value("exports (%)"), None);
        assert_eq!(ds.records[1].value("gdp_per_capita (US$)"), Some(49177.0));
    }

    #[test]
    fn csv_without_required_columns_fails() {
        let path = temp_path("eurodash_loader_test_bad.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "nation,year,exports (%)").unwrap();
        writeln!(file, "Ireland,2010,88.5").unwrap();
        drop(file);

        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().contains("country_name"));
    }

    #[test]
    fn json_round_trip() {
        let path = temp_path("eurodash_loader_test.json");
        std::fs::write(
            &path,
            r#"[
                {"country_name": "Ireland", "year": 2010, "exports (%)": 88.5},
                {"country_name": "Ireland", "year": 2011, "exports (%)": null}
            ]"#,
        )
        .unwrap();

        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].year, 2010);
        assert_eq!(ds.records[0].value("exports (%)"), Some(88.5));
        assert_eq!(ds.records[1].value("exports (%)"), None);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog;
use crate::data::model::IndicatorDataset;
use crate::error::ViewError;

// ---------------------------------------------------------------------------
// Column disambiguation
// ---------------------------------------------------------------------------

/// Colour-by option of the relationship view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ScatterColor {
    #[default]
    None,
    Year,
    Country,
}

/// Disambiguated column names for the plotting roles.
///
/// Roles resolve positionally against the requested column list: the first
/// column is x, the second y, the last size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleResolution {
    pub x: String,
    pub y: String,
    pub size: String,
}

/// Make a requested column list unique by suffixing repeats with their
/// occurrence count (`gdp`, `gdp_2`, `gdp_3`, …), and resolve the plotting
/// roles to the renamed columns.
///
/// A role referring to a repeated occurrence resolves to the suffixed name,
/// so every role maps to a distinct column of the working table.
pub fn dedupe_and_resolve(columns: &[String]) -> (Vec<String>, RoleResolution) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut renamed = Vec::with_capacity(columns.len());
    for col in columns {
        let n = counts
            .entry(col.as_str())
            .and_modify(|n| *n += 1)
            .or_insert(1);
        renamed.push(if *n > 1 {
            format!("{col}_{n}")
        } else {
            col.clone()
        });
    }

    let roles = RoleResolution {
        x: renamed.first().cloned().unwrap_or_default(),
        y: renamed.get(1).cloned().unwrap_or_default(),
        size: renamed.last().cloned().unwrap_or_default(),
    };
    (renamed, roles)
}

// ---------------------------------------------------------------------------
// Scatter table
// ---------------------------------------------------------------------------

/// One plotted bubble.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub country: String,
    pub year: i32,
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Bubble size: the observation's population.
    pub size: Option<f64>,
}

/// The relationship-view payload: renamed working columns, role mapping,
/// axis labels, and the plotted rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterData {
    pub columns: Vec<String>,
    pub roles: RoleResolution,
    pub x_label: String,
    pub y_label: String,
    pub color: ScatterColor,
    pub points: Vec<ScatterPoint>,
}

/// Build the scatter table for a filtered subset.
///
/// The working column set is [x, y, year, country_name, population_total].
/// Every metric column involved must exist in the dataset, otherwise the
/// view fails with [`ViewError::MissingColumns`]; other views are
/// unaffected.
pub fn scatter_table(
    dataset: &IndicatorDataset,
    indices: &[usize],
    x_metric: &str,
    y_metric: &str,
    color: ScatterColor,
) -> Result<ScatterData, ViewError> {
    let required = [x_metric, y_metric, catalog::POPULATION];
    let mut missing: Vec<String> = Vec::new();
    for col in required {
        if !dataset.has_column(col) && !missing.iter().any(|m| m == col) {
            missing.push(col.to_string());
        }
    }
    if !missing.is_empty() {
        return Err(ViewError::MissingColumns(missing));
    }

    let requested: Vec<String> = vec![
        x_metric.to_string(),
        y_metric.to_string(),
        catalog::YEAR.to_string(),
        catalog::COUNTRY_NAME.to_string(),
        catalog::POPULATION.to_string(),
    ];
    let (columns, roles) = dedupe_and_resolve(&requested);

    let points = indices
        .iter()
        .map(|&idx| {
            let rec = &dataset.records[idx];
            ScatterPoint {
                country: rec.country.clone(),
                year: rec.year,
                x: rec.value(x_metric),
                y: rec.value(y_metric),
                size: rec.value(catalog::POPULATION),
            }
        })
        .collect();

    Ok(ScatterData {
        columns,
        roles,
        x_label: catalog::label_for(x_metric).to_string(),
        y_label: catalog::label_for(y_metric).to_string(),
        color,
        points,
    })
}

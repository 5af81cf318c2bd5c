use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use eurodash::data::loader;
use eurodash::state::DashboardState;
use eurodash::stats::Trend;

/// Headless driver: load a dataset, apply selections from the command
/// line, print the summary panel, and write the CSV export.
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: eurodash <dataset.{{csv,json,parquet}}> [country] [year_lo year_hi]");
    };
    let path = PathBuf::from(path);

    let dataset = loader::load_file(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} records, {} countries, {} metric columns",
        dataset.len(),
        dataset.countries.len(),
        dataset.metric_columns.len()
    );

    let mut state = DashboardState::new(Arc::new(dataset))?;
    if let Some(country) = args.next() {
        state.set_country(&country)?;
    }
    if let Some(lo) = args.next() {
        let hi = args.next().context("year_lo given without year_hi")?;
        let lo: i32 = lo.parse().context("year_lo must be an integer")?;
        let hi: i32 = hi.parse().context("year_hi must be an integer")?;
        state.set_year_range(lo, hi)?;
    }

    let (year_lo, year_hi) = state.selection().year_range;
    println!(
        "{}: {year_lo} - {year_hi} ({} rows)",
        state.selection().country,
        state.filtered_indices().len()
    );

    for stat in state.headline() {
        let arrow = match stat.trend {
            Trend::Rising => '▲',
            Trend::Falling => '▼',
            Trend::Flat => '▶',
        };
        match stat.average {
            Some(avg) => println!("  {:<28} avg {avg:>14.2}  {arrow} {:+.2}", stat.label, stat.delta),
            None => println!("  {:<28} no data", stat.label),
        }
    }

    if let Some(snap) = state.latest_snapshot() {
        println!("Latest year: {}", snap.year);
        if let Some(v) = snap.unemployment {
            println!("  Unemployment: {v:.2}%");
        }
        if let Some(v) = snap.inflation {
            println!("  Inflation: {v:.2}%");
        }
        if let Some(v) = snap.gdp_per_capita {
            println!("  GDP per Capita: ${v:.0}");
        }
    }

    for series in state.time_series() {
        println!("  {}: {} points", series.label, series.points.len());
    }

    let out = format!(
        "{}_filtered_data.csv",
        state.selection().country.replace(' ', "_")
    );
    let file = std::fs::File::create(&out).with_context(|| format!("creating {out}"))?;
    state.export_csv(file)?;
    log::info!("Wrote filtered subset to {out}");

    Ok(())
}

use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use eurodash::catalog;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Per-country baselines the synthetic series grow from.
struct CountryProfile {
    name: &'static str,
    gdp_base: f64,
    population: f64,
    unemployment_base: f64,
}

const PROFILES: &[CountryProfile] = &[
    CountryProfile { name: "Austria", gdp_base: 38000.0, population: 8.0e6, unemployment_base: 4.8 },
    CountryProfile { name: "Belgium", gdp_base: 36000.0, population: 10.3e6, unemployment_base: 7.5 },
    CountryProfile { name: "Denmark", gdp_base: 46000.0, population: 5.3e6, unemployment_base: 4.5 },
    CountryProfile { name: "Finland", gdp_base: 35000.0, population: 5.2e6, unemployment_base: 8.0 },
    CountryProfile { name: "France", gdp_base: 33000.0, population: 60.9e6, unemployment_base: 8.5 },
    CountryProfile { name: "Germany", gdp_base: 34000.0, population: 82.2e6, unemployment_base: 7.8 },
    CountryProfile { name: "Ireland", gdp_base: 40000.0, population: 3.8e6, unemployment_base: 4.3 },
    CountryProfile { name: "Italy", gdp_base: 30000.0, population: 56.9e6, unemployment_base: 10.0 },
    CountryProfile { name: "Netherlands", gdp_base: 39000.0, population: 15.9e6, unemployment_base: 3.8 },
    CountryProfile { name: "Poland", gdp_base: 11000.0, population: 38.3e6, unemployment_base: 16.0 },
    CountryProfile { name: "Portugal", gdp_base: 18000.0, population: 10.3e6, unemployment_base: 4.5 },
    CountryProfile { name: "Spain", gdp_base: 24000.0, population: 40.6e6, unemployment_base: 13.9 },
    CountryProfile { name: "Sweden", gdp_base: 41000.0, population: 8.9e6, unemployment_base: 5.8 },
];

const FIRST_YEAR: i32 = 2000;
const LAST_YEAR: i32 = 2023;

fn main() {
    let mut rng = SimpleRng::new(42);

    let mut countries: Vec<String> = Vec::new();
    let mut years: Vec<i64> = Vec::new();
    let mut metrics: Vec<(&'static str, Vec<Option<f64>>)> = vec![
        (catalog::FDI, Vec::new()),
        (catalog::NONPERFORMING_LOANS, Vec::new()),
        (catalog::EXPORTS, Vec::new()),
        (catalog::GDP_PER_CAPITA, Vec::new()),
        (catalog::HIGH_TECH_EXPORTS, Vec::new()),
        (catalog::INFLATION, Vec::new()),
        (catalog::NET_CAPITAL, Vec::new()),
        (catalog::POPULATION, Vec::new()),
        (catalog::TAX_REVENUE, Vec::new()),
        (catalog::UNEMPLOYMENT, Vec::new()),
    ];

    for profile in PROFILES {
        let mut gdp = profile.gdp_base;
        let mut population = profile.population;

        for year in FIRST_YEAR..=LAST_YEAR {
            let t = (year - FIRST_YEAR) as f64;

            gdp *= 1.0 + rng.gauss(0.025, 0.02);
            population *= 1.0 + rng.gauss(0.004, 0.002);

            // 2008-2009 recession bump, 2021-2022 inflation spike.
            let crisis = if (2008..=2009).contains(&year) { 3.5 } else { 0.0 };
            let spike = if (2021..=2022).contains(&year) { 4.5 } else { 0.0 };

            let unemployment = (profile.unemployment_base + crisis + rng.gauss(0.0, 0.8)).max(1.5);
            let inflation = rng.gauss(2.0, 1.2) + spike;
            let exports = (35.0 + t * 0.6 + rng.gauss(0.0, 4.0)).max(5.0);
            let high_tech = (8.0 + t * 0.3 + rng.gauss(0.0, 2.0)).max(0.5);
            let fdi = gdp * population * rng.gauss(0.02, 0.015);
            let net_capital = rng.gauss(0.0, 0.5) * 1.0e9;
            let tax_revenue = rng.gauss(21.0, 2.5).max(10.0);
            let loans = (8.0 - t * 0.2 + crisis + rng.gauss(0.0, 1.0)).max(0.3);

            countries.push(profile.name.to_string());
            years.push(year as i64);

            let row = [
                fdi,
                loans,
                exports,
                gdp,
                high_tech,
                inflation,
                net_capital,
                population,
                tax_revenue,
                unemployment,
            ];
            for ((_, column), value) in metrics.iter_mut().zip(row) {
                // ~2% of cells are left empty.
                if rng.next_f64() < 0.02 {
                    column.push(None);
                } else {
                    column.push(Some(value));
                }
            }
        }
    }

    let mut fields = vec![
        Field::new(catalog::COUNTRY_NAME, DataType::Utf8, false),
        Field::new(catalog::YEAR, DataType::Int64, false),
    ];
    for (name, _) in &metrics {
        fields.push(Field::new(*name, DataType::Float64, true));
    }
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<Arc<dyn arrow::array::Array>> = vec![
        Arc::new(StringArray::from(
            countries.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(Int64Array::from(years)),
    ];
    for (_, column) in metrics {
        columns.push(Arc::new(Float64Array::from(column)));
    }

    let batch =
        RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    let output_path = "sample_indicators.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {} records ({} countries, {}-{}) to {output_path}",
        countries.len(),
        PROFILES.len(),
        FIRST_YEAR,
        LAST_YEAR
    );
}

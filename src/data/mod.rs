/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → IndicatorDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ IndicatorDataset  │  Vec<Record>, column index
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  country + year window → record indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;

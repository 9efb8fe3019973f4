/// Data layer: station records, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → StationDataset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ StationDataset │  Vec<StationRecord>, project / instrument index
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply Selection → filtered indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;

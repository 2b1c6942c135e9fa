/// Data layer: core types, loading, and column profiling.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Column>, optional index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ profile   │  Column → ColumnProfile { dtype, distinct }
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod profile;

/// Data layer: records, datasets, and the position reader.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, source label
///   └──────────┘
///        │  project(AxisSelector)
///        ▼
///   Projection::Points | Projection::Axis
/// ```

pub mod error;
pub mod loader;
pub mod model;

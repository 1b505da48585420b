/// Data layer: listing types, loading, caching, filtering and aggregates.
///
/// Architecture:
/// ```text
///  .csv / .zip / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Dataset, derive car_age
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache   │  one Arc<Dataset> per source
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  brand → fuel types → age range → working set
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  report  │  describe, histogram, boxes, scatter, top models, fuel share
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod report;
pub mod stats;

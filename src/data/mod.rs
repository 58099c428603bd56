/// Data layer: core types, loading, memoization and filtering.
///
/// Architecture:
/// ```text
///  URL / path (.csv or .csv.gz)
///        │
///        ▼
///   ┌──────────┐      ┌────────┐
///   │  loader   │ ───▶ │ cache  │  CacheKey → Arc<Dataset>
///   └──────────┘      └────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  Vec<Record>, lower-case columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  rows at hour h, 24-bucket histogram
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;

/// Data layer: core types, loading/aggregation, caching, filtering, export.
///
/// Architecture:
/// ```text
///   data.zip (one data.csv entry)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decompress → batched parse → quorum filter → medians
///   └──────────┘
///        │                         ┌─────────┐
///        ▼            memoized via │  cache   │  (archive path → table)
///   ┌──────────────┐              └─────────┘
///   │ UnifiedTable  │  observations + one "Median" row per timestamp
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date/hour/source criteria → FilteredView
///   └──────────┘
///        │
///        ├──▶ plot (one line per source)
///        ├──▶ table widget
///        └──▶ export (CSV download)
/// ```

pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;

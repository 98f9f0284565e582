/// Data layer: core types, ingestion, cleaning, projection, export.
///
/// Architecture:
/// ```text
///  uploaded .csv / .xlsx bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SessionCache  │  file name → current Table
///   └──────────────┘
///        │  ▲
///        ▼  │
///   ┌──────────┐
///   │  clean    │  drop duplicates / fill missing numerics (owned in, owned out)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ projection  │  chosen columns → transient view
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  view → CSV / XLSX bytes + file name + MIME
///   └──────────┘
/// ```

pub mod cache;
pub mod clean;
pub mod error;
pub mod export;
pub mod loader;
pub mod model;
pub mod projection;

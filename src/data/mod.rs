/// Data layer: the filter-and-aggregate pipeline.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SalesDataset (typed rows, LoadError on bad schema)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset │  Vec<OrderRecord>, category/region/date indices
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterCriteria → FilteredView
///   └──────────┘
///        │
///        ├──────────────────┐
///        ▼                  ▼
///   ┌───────────┐      ┌──────────┐
///   │ aggregate  │      │  export   │
///   │ KPIs, group│      │  CSV bytes│
///   └───────────┘      └──────────┘
/// ```
///
/// Every stage is a pure function of its inputs; nothing here retains state
/// across calls.

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;

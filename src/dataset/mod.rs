// src/dataset/mod.rs
//
// The country-metrics aggregation pipeline: raw rows → group-by-country →
// per-indicator year series, plus the derived-metric helpers every view
// shares. Filter state lives elsewhere; everything here is filter-agnostic.

pub mod build;
pub mod extract;
pub mod group;
pub mod metrics;
pub mod store;
pub mod types;

pub use build::build_dataset;
pub use extract::{extract_indicators, IndicatorTable};
pub use group::group_by_country;
pub use metrics::{latest_value, mean_over_range, normalize_by_area, sum_indicator};
pub use store::DatasetStore;
pub use types::{
    CarbonKind, CountryRecord, Dataset, DisasterKind, IndicatorKind, IndicatorSeries, YearValue,
};

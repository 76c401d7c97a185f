//! GridLoad Model Library
//!
//! Core data pipeline for zone load dashboards: load a tabular export,
//! normalize it into a typed [`Dataset`], then window, resample, rank and
//! summarize it. Pure logic with no rendering or service dependencies.

//! # Modules
//!
//! - `table`: raw tabular input and the `TableLoader` seam (CSV built in)
//! - `timestamp`: timestamp parsing and ordered column detection
//! - `dataset`: the typed, time-sorted zone table
//! - `window`: inclusive time windows and the binary-search filter
//! - `resample`: fixed-width bucket means
//! - `selection` / `target`: zone selection and KPI/grouping targets
//! - `kpi`, `grouping`, `ranking`: the dashboard figures
//! - `cache`: keyed dataset memoization
//! - `view`: one-call assembly of everything above
//!
//! # Example
//!
//! ```
//! use gridload_model::{
//!     build_view, Dataset, RawTable, RawValue, TargetSelector, TimestampResolver, ViewDefaults,
//!     ViewParams,
//! };
//!
//! let table = RawTable::new(vec!["interval_start_local".into(), "pjm_rto".into()])
//!     .with_row(vec![RawValue::from("2024-01-01 00:00"), RawValue::from(80_000.0)])
//!     .unwrap()
//!     .with_row(vec![RawValue::from("2024-01-01 01:00"), RawValue::from(100_000.0)])
//!     .unwrap();
//!
//! let dataset = Dataset::from_table(&table, &TimestampResolver::new()).unwrap();
//! let params = ViewParams::defaults_for(&dataset, &ViewDefaults::default());
//! let view = build_view(&dataset, &params, &TargetSelector::default());
//!
//! let kpis = view.kpis.kpis().unwrap();
//! assert_eq!(kpis.peak, 100_000.0);
//! assert_eq!(kpis.percent_change(), Some(25.0));
//! ```

pub mod cache;
pub mod dataset;
pub mod error;
pub mod grouping;
pub mod kpi;
pub mod ranking;
pub mod resample;
pub mod selection;
pub mod table;
pub mod target;
pub mod timestamp;
pub mod validation;
pub mod view;
pub mod window;

// Re-exports for convenience
pub use cache::DatasetCache;
pub use dataset::{Dataset, Record};
pub use error::{ModelError, Result};
pub use grouping::{DailyPoint, DailySeries, GroupAggregator, HourlyPattern, HourlyPoint};
pub use kpi::{KpiComputer, KpiReport, KpiSet};
pub use ranking::{ZoneAverage, ZoneRanking};
pub use resample::{ResampleRule, ResampledSeries, Resampler, TrendPoint};
pub use selection::ZoneSelection;
pub use table::{CsvTableLoader, RawTable, RawValue, TableLoader};
pub use target::{
    GroupTarget, KpiTarget, TargetSelector, TargetSource, DEFAULT_SYSTEM_TOTAL_ZONE,
};
pub use timestamp::{
    parse_timestamp, ExplicitColumn, FirstColumn, FirstParseableColumn, IntervalStartLocal,
    ResolvedColumn, TimestampDetector, TimestampResolver,
};
pub use validation::{validate_zone_name, TopN, DEFAULT_TOP_N, MAX_TOP_N, MIN_TOP_N};
pub use view::{build_view, DashboardView, ViewDefaults, ViewParams, DEFAULT_WINDOW_DAYS};
pub use window::{filter_records, TimeWindow};

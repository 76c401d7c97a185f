//! Dashboard View
//!
//! Runs the whole pipeline for one parameter set:
//! filter -> resample -> trend -> KPIs -> ranking -> daily -> hourly.
//! Every step is total over a valid dataset, so building a view never fails.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Dataset;
use crate::grouping::{DailySeries, GroupAggregator, HourlyPattern};
use crate::kpi::{KpiComputer, KpiReport};
use crate::ranking::{ZoneAverage, ZoneRanking};
use crate::resample::{ResampleRule, ResampledSeries, Resampler, TrendPoint};
use crate::selection::ZoneSelection;
use crate::target::{GroupTarget, KpiTarget, TargetSelector};
use crate::validation::TopN;
use crate::window::TimeWindow;

pub const DEFAULT_WINDOW_DAYS: i64 = 3;

/// Zones shown by default when the dataset has them
pub const PREFERRED_ZONES: [&str; 5] = [
    "pjm_rto",
    "pjm_eastern_region",
    "pjm_western_region",
    "pjm_southern_region",
    "dom",
];

/// Selection size when none of the preferred zones exist
pub const FALLBACK_SELECTION_SIZE: usize = 5;

/// Tunable defaults for [`ViewParams::defaults_for`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewDefaults {
    pub window_days: i64,
    pub preferred_zones: Vec<String>,
    pub rule: ResampleRule,
    pub top_n: TopN,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            preferred_zones: PREFERRED_ZONES.iter().map(|z| z.to_string()).collect(),
            rule: ResampleRule::default(),
            top_n: TopN::default(),
        }
    }
}

/// One complete parameter set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewParams {
    /// `None` only for an empty dataset
    pub window: Option<TimeWindow>,
    pub selection: ZoneSelection,
    pub rule: ResampleRule,
    pub top_n: TopN,
}

impl ViewParams {
    /// Initial parameters for `dataset`
    ///
    /// The window is the last `window_days` days. The selection is the
    /// preferred zones the dataset has, or its first few zones if it has none.
    pub fn defaults_for(dataset: &Dataset, defaults: &ViewDefaults) -> Self {
        let preferred: Vec<&String> = defaults
            .preferred_zones
            .iter()
            .filter(|z| dataset.has_zone(z))
            .collect();

        let selection = if preferred.is_empty() {
            ZoneSelection::new(dataset.zones().iter().take(FALLBACK_SELECTION_SIZE).cloned())
        } else {
            ZoneSelection::new(preferred.into_iter().cloned())
        };

        Self {
            window: TimeWindow::trailing_days(dataset, defaults.window_days),
            selection,
            rule: defaults.rule,
            top_n: defaults.top_n,
        }
    }
}

/// Everything the dashboard renders for one parameter set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub params: ViewParams,
    pub record_count: usize,
    pub resampled: ResampledSeries,
    pub trend: Vec<TrendPoint>,
    pub kpi_target: Option<KpiTarget>,
    pub kpis: KpiReport,
    pub top_zones: Vec<ZoneAverage>,
    pub bottom_zones: Vec<ZoneAverage>,
    pub group_target: Option<GroupTarget>,
    pub daily: Option<DailySeries>,
    pub hourly: Option<HourlyPattern>,
}

/// Assemble a [`DashboardView`]
///
/// Unknown names in the selection are ignored. A window that selects no
/// records yields empty series and [`KpiReport::NoData`].
pub fn build_view(dataset: &Dataset, params: &ViewParams, selector: &TargetSelector) -> DashboardView {
    let records = match &params.window {
        Some(window) => dataset.window(window),
        None => dataset.records(),
    };
    let zones = dataset.zones();
    let selection = params.selection.resolve(zones);

    let resampled = Resampler::new().resample(records, zones, params.rule);
    let trend = resampled.long_form(selection.zones());

    let kpi_target = selector.kpi_target(zones, &selection);
    let kpis = match &kpi_target {
        Some(target) => KpiComputer::new().compute(&target.series(zones, resampled.buckets())),
        None => KpiReport::NoData,
    };

    let ranking = ZoneRanking::from_series(&resampled);
    let n = params.top_n.get();

    let aggregator = GroupAggregator::new();
    let group_target = selector.group_target(zones, &selection);
    let daily = group_target
        .as_ref()
        .and_then(|t| aggregator.daily(records, zones, &t.zone));
    let hourly = group_target
        .as_ref()
        .and_then(|t| aggregator.hourly(records, zones, &t.zone));

    debug!(
        "View built: {} records in window, {} buckets, {} trend points",
        records.len(),
        resampled.len(),
        trend.len()
    );

    DashboardView {
        params: ViewParams {
            selection,
            ..params.clone()
        },
        record_count: records.len(),
        trend,
        kpi_target,
        kpis,
        top_zones: ranking.top(n),
        bottom_zones: ranking.bottom(n),
        group_target,
        daily,
        hourly,
        resampled,
    }
}

//! KPI Computer
//!
//! Peak, trough, mean and percent change over the KPI target series.

use std::fmt;

use serde::Serialize;
use tracing::debug;

/// Headline figures for one target series
///
/// `percent_change` is NaN when undefined; it is never dropped from the set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiSet {
    pub peak: f64,
    pub trough: f64,
    pub mean: f64,
    pub percent_change: f64,
}

impl KpiSet {
    /// Percent change when defined
    pub fn percent_change(&self) -> Option<f64> {
        (!self.percent_change.is_nan()).then_some(self.percent_change)
    }
}

/// Outcome of a KPI computation
///
/// `NoData` is a valid state (empty window, no zones) and is distinct from a
/// computed set whose figures are undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "kpis", rename_all = "snake_case")]
pub enum KpiReport {
    NoData,
    Computed(KpiSet),
}

impl KpiReport {
    pub fn kpis(&self) -> Option<&KpiSet> {
        match self {
            KpiReport::NoData => None,
            KpiReport::Computed(set) => Some(set),
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, KpiReport::Computed(_))
    }
}

/// Render a KPI figure, with NaN as `n/a`
pub fn display_value(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}", value)
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiReport::NoData => write!(f, "no data"),
            KpiReport::Computed(set) => {
                let change = match set.percent_change() {
                    Some(change) => format!("{:+.2}%", change),
                    None => "n/a".to_string(),
                };
                write!(
                    f,
                    "peak={} trough={} mean={} change={}",
                    display_value(set.peak),
                    display_value(set.trough),
                    display_value(set.mean),
                    change
                )
            },
        }
    }
}

/// `(last - first) / |first| * 100`, or NaN when fewer than two points,
/// either end is missing, or the first value is zero
pub fn percent_change(series: &[Option<f64>]) -> f64 {
    if series.len() < 2 {
        return f64::NAN;
    }
    match (series.first().copied().flatten(), series.last().copied().flatten()) {
        (Some(first), Some(last)) if first != 0.0 => (last - first) / first.abs() * 100.0,
        _ => f64::NAN,
    }
}

/// KPI processor
#[derive(Clone, Copy, Debug)]
pub struct KpiComputer;

impl KpiComputer {
    pub fn new() -> Self {
        Self
    }

    /// Compute KPIs over a time-ordered series
    ///
    /// Missing entries are left out of peak, trough and mean. Only an empty
    /// series yields [`KpiReport::NoData`]; entries that are all missing give
    /// a set of NaN figures.
    pub fn compute(&self, series: &[Option<f64>]) -> KpiReport {
        if series.is_empty() {
            return KpiReport::NoData;
        }

        let present: Vec<f64> = series.iter().flatten().copied().collect();
        let (peak, trough, mean) = if present.is_empty() {
            debug!("KPI series has no values ({} entries)", series.len());
            (f64::NAN, f64::NAN, f64::NAN)
        } else {
            (
                present.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                present.iter().cloned().fold(f64::INFINITY, f64::min),
                present.iter().sum::<f64>() / present.len() as f64,
            )
        };

        KpiReport::Computed(KpiSet {
            peak,
            trough,
            mean,
            percent_change: percent_change(series),
        })
    }
}

impl Default for KpiComputer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_basic_kpis() {
        let report = KpiComputer::new().compute(&[Some(100.0), Some(150.0), Some(50.0), Some(120.0)]);
        let set = report.kpis().unwrap();

        assert_eq!(set.peak, 150.0);
        assert_eq!(set.trough, 50.0);
        assert_eq!(set.mean, 105.0);
        assert_eq!(set.percent_change(), Some(20.0));
    }

    #[test]
    fn test_empty_series_is_no_data() {
        assert_eq!(KpiComputer::new().compute(&[]), KpiReport::NoData);
    }

    #[test]
    fn test_all_missing_series_is_computed_undefined() {
        let report = KpiComputer::new().compute(&[None, None, None]);
        let set = report.kpis().unwrap();
        assert!(report.is_computed());
        assert!(set.peak.is_nan());
        assert!(set.trough.is_nan());
        assert!(set.mean.is_nan());
        assert_eq!(set.percent_change(), None);
        assert_eq!(report.to_string(), "peak=n/a trough=n/a mean=n/a change=n/a");
    }

    #[test]
    fn test_single_point_has_undefined_change() {
        let report = KpiComputer::new().compute(&[Some(42.0)]);
        let set = report.kpis().unwrap();
        assert_eq!(set.peak, 42.0);
        assert_eq!(set.trough, 42.0);
        assert!(set.percent_change.is_nan());
        assert!(report.is_computed());
    }

    #[test]
    fn test_percent_change_rules() {
        assert!(percent_change(&[Some(0.0), Some(10.0)]).is_nan());
        assert!(percent_change(&[None, Some(10.0)]).is_nan());
        assert!(percent_change(&[Some(10.0), None]).is_nan());
        assert_eq!(percent_change(&[Some(-50.0), Some(-25.0)]), 50.0);
        assert_eq!(percent_change(&[Some(200.0), None, Some(150.0)]), -25.0);
    }

    #[test]
    fn test_missing_values_excluded_from_stats() {
        let report = KpiComputer::new().compute(&[Some(10.0), None, Some(30.0)]);
        let set = report.kpis().unwrap();
        assert_eq!(set.mean, 20.0);
        assert_eq!(set.percent_change(), Some(200.0));
    }

    #[test]
    fn test_serialization_shapes() {
        let json = serde_json::to_value(KpiReport::NoData).unwrap();
        assert_eq!(json["status"], "no_data");

        let report = KpiComputer::new().compute(&[Some(5.0)]);
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["status"], "computed");
        assert_eq!(json["kpis"]["peak"], 5.0);
        assert!(json["kpis"]["percent_change"].is_null());
    }

    #[test]
    fn test_display_marks_undefined() {
        let report = KpiComputer::new().compute(&[Some(5.0)]);
        assert!(report.to_string().ends_with("change=n/a"));
        assert_eq!(KpiReport::NoData.to_string(), "no data");
    }
}

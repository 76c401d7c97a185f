//! Target Selection
//!
//! Picks the series that KPIs and grouping charts are computed over.
//!
//! Both policies prefer the system-total zone when the dataset has one, then
//! the user's selection. They differ at the last step: KPIs fall back to the
//! sum of every zone, while grouping needs one named zone and falls back to
//! the first zone in dataset order.

use serde::{Deserialize, Serialize};

use crate::dataset::Record;
use crate::selection::ZoneSelection;

/// Zone that already carries the system-wide total in PJM exports
pub const DEFAULT_SYSTEM_TOTAL_ZONE: &str = "pjm_rto";

/// Which rule produced a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    SystemTotal,
    Selection,
    AllZones,
}

/// Zones whose element-wise sum is the KPI series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiTarget {
    pub source: TargetSource,
    pub zones: Vec<String>,
}

impl KpiTarget {
    /// Element-wise sum over `rows`
    ///
    /// `zones` names the positions of each row's values. Missing values are
    /// skipped; a row with nothing to sum yields `None`.
    pub fn series(&self, zones: &[String], rows: &[Record]) -> Vec<Option<f64>> {
        let indices: Vec<usize> = self
            .zones
            .iter()
            .filter_map(|name| zones.iter().position(|z| z == name))
            .collect();

        rows.iter()
            .map(|row| {
                indices
                    .iter()
                    .filter_map(|&index| row.value(index))
                    .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
            })
            .collect()
    }
}

/// Single zone the daily and hourly views are computed over
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTarget {
    pub source: TargetSource,
    pub zone: String,
}

/// Target policy, parameterized by the system-total zone name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSelector {
    system_total: String,
}

impl TargetSelector {
    pub fn new(system_total: impl Into<String>) -> Self {
        Self {
            system_total: system_total.into(),
        }
    }

    pub fn system_total(&self) -> &str {
        &self.system_total
    }

    /// KPI target for a dataset with `zones` under `selection`
    ///
    /// Returns `None` only when there are no zones at all.
    pub fn kpi_target(&self, zones: &[String], selection: &ZoneSelection) -> Option<KpiTarget> {
        if zones.is_empty() {
            return None;
        }
        if zones.contains(&self.system_total) {
            return Some(KpiTarget {
                source: TargetSource::SystemTotal,
                zones: vec![self.system_total.clone()],
            });
        }

        let selected = selection.resolve(zones);
        if !selected.is_empty() {
            return Some(KpiTarget {
                source: TargetSource::Selection,
                zones: selected.into(),
            });
        }

        Some(KpiTarget {
            source: TargetSource::AllZones,
            zones: zones.to_vec(),
        })
    }

    /// Grouping target; `AllZones` here means the first zone in dataset order
    pub fn group_target(&self, zones: &[String], selection: &ZoneSelection) -> Option<GroupTarget> {
        if zones.contains(&self.system_total) {
            return Some(GroupTarget {
                source: TargetSource::SystemTotal,
                zone: self.system_total.clone(),
            });
        }

        if let Some(first) = selection.iter().find(|name| zones.iter().any(|z| z.as_str() == *name)) {
            return Some(GroupTarget {
                source: TargetSource::Selection,
                zone: first.to_string(),
            });
        }

        zones.first().map(|zone| GroupTarget {
            source: TargetSource::AllZones,
            zone: zone.clone(),
        })
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_TOTAL_ZONE)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::timestamp::parse_timestamp;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    fn row(values: Vec<Option<f64>>) -> Record {
        Record::new(parse_timestamp("2024-01-01 00:00").unwrap(), values)
    }

    #[test]
    fn test_system_total_beats_selection() {
        let zones = names(&["total", "east", "west"]);
        let selector = TargetSelector::new("total");
        let selection = ZoneSelection::new(["east"]);

        let kpi = selector.kpi_target(&zones, &selection).unwrap();
        assert_eq!(kpi.source, TargetSource::SystemTotal);
        assert_eq!(kpi.zones, names(&["total"]));

        let group = selector.group_target(&zones, &selection).unwrap();
        assert_eq!(group.source, TargetSource::SystemTotal);
        assert_eq!(group.zone, "total");
    }

    #[test]
    fn test_selection_used_without_system_total() {
        let zones = names(&["east", "west", "north"]);
        let selector = TargetSelector::default();
        let selection = ZoneSelection::new(["west", "ghost", "east"]);

        let kpi = selector.kpi_target(&zones, &selection).unwrap();
        assert_eq!(kpi.source, TargetSource::Selection);
        assert_eq!(kpi.zones, names(&["west", "east"]));

        let group = selector.group_target(&zones, &selection).unwrap();
        assert_eq!(group.zone, "west");
    }

    #[test]
    fn test_fallbacks_diverge() {
        let zones = names(&["east", "west"]);
        let selector = TargetSelector::default();
        let selection = ZoneSelection::new(["ghost"]);

        let kpi = selector.kpi_target(&zones, &selection).unwrap();
        assert_eq!(kpi.source, TargetSource::AllZones);
        assert_eq!(kpi.zones, zones);

        let group = selector.group_target(&zones, &selection).unwrap();
        assert_eq!(group.source, TargetSource::AllZones);
        assert_eq!(group.zone, "east");
    }

    #[test]
    fn test_no_zones_no_target() {
        let selector = TargetSelector::default();
        let selection = ZoneSelection::new(["east"]);
        assert!(selector.kpi_target(&[], &selection).is_none());
        assert!(selector.group_target(&[], &selection).is_none());
    }

    #[test]
    fn test_sum_skips_missing_values() {
        let zones = names(&["a", "b", "c"]);
        let target = KpiTarget {
            source: TargetSource::Selection,
            zones: names(&["a", "c"]),
        };
        let rows = vec![
            row(vec![Some(1.0), Some(100.0), Some(2.0)]),
            row(vec![None, Some(100.0), Some(5.0)]),
            row(vec![None, Some(100.0), None]),
        ];
        assert_eq!(
            target.series(&zones, &rows),
            vec![Some(3.0), Some(5.0), None]
        );
    }
}

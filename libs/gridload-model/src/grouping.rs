//! Group Aggregator
//!
//! Daily means and the hour-of-day load profile for one target zone, both
//! computed over window-filtered records rather than the resampled series.

use chrono::{NaiveDate, Timelike};
use serde::Serialize;
use tracing::debug;

use crate::dataset::Record;
use crate::resample::{ResampleRule, Resampler};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub mean: Option<f64>,
}

/// One mean per calendar day, ascending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub zone: String,
    pub points: Vec<DailyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub hour: u32,
    pub mean: Option<f64>,
}

/// Mean load per clock hour, pooled across days
///
/// Only hours that have at least one record appear, ordered 0 to 23.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPattern {
    pub zone: String,
    pub points: Vec<HourlyPoint>,
}

impl HourlyPattern {
    pub fn mean_at(&self, hour: u32) -> Option<f64> {
        self.points.iter().find(|p| p.hour == hour).and_then(|p| p.mean)
    }
}

/// Daily and hourly grouping processor
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupAggregator {
    resampler: Resampler,
}

impl GroupAggregator {
    pub fn new() -> Self {
        Self {
            resampler: Resampler::new(),
        }
    }

    /// Daily means of `zone`; `None` when the zone is not in `zones`
    pub fn daily(&self, records: &[Record], zones: &[String], zone: &str) -> Option<DailySeries> {
        let index = zones.iter().position(|z| z == zone)?;
        let series = self.resampler.resample(records, zones, ResampleRule::Daily);

        let points = series
            .buckets()
            .iter()
            .map(|bucket| DailyPoint {
                date: bucket.timestamp.date(),
                mean: bucket.value(index),
            })
            .collect();

        Some(DailySeries {
            zone: zone.to_string(),
            points,
        })
    }

    /// Hour-of-day profile of `zone`; `None` when the zone is not in `zones`
    ///
    /// An hour that has records but no value for the zone is kept with a
    /// missing mean.
    pub fn hourly(&self, records: &[Record], zones: &[String], zone: &str) -> Option<HourlyPattern> {
        let index = zones.iter().position(|z| z == zone)?;

        let mut seen = [false; 24];
        let mut sums = [0.0_f64; 24];
        let mut counts = [0_usize; 24];

        for record in records {
            let hour = record.timestamp.hour() as usize;
            seen[hour] = true;
            if let Some(value) = record.value(index) {
                sums[hour] += value;
                counts[hour] += 1;
            }
        }

        let points: Vec<HourlyPoint> = (0..24)
            .filter(|&hour| seen[hour])
            .map(|hour| HourlyPoint {
                hour: hour as u32,
                mean: (counts[hour] > 0).then(|| sums[hour] / counts[hour] as f64),
            })
            .collect();

        debug!("Hourly pattern for '{}': {} hours covered", zone, points.len());

        Some(HourlyPattern {
            zone: zone.to_string(),
            points,
        })
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::timestamp::parse_timestamp;
    use chrono::Duration;

    fn zones() -> Vec<String> {
        vec!["east".to_string(), "west".to_string()]
    }

    fn record(text: &str, east: Option<f64>, west: Option<f64>) -> Record {
        Record::new(parse_timestamp(text).unwrap(), vec![east, west])
    }

    #[test]
    fn test_daily_means() {
        let records = vec![
            record("2024-03-01 00:00", Some(10.0), None),
            record("2024-03-01 12:00", Some(20.0), None),
            record("2024-03-02 06:00", Some(40.0), Some(1.0)),
        ];
        let daily = GroupAggregator::new().daily(&records, &zones(), "east").unwrap();

        assert_eq!(daily.zone, "east");
        assert_eq!(daily.points.len(), 2);
        assert_eq!(daily.points[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(daily.points[0].mean, Some(15.0));
        assert_eq!(daily.points[1].mean, Some(40.0));

        let west = GroupAggregator::new().daily(&records, &zones(), "west").unwrap();
        assert_eq!(west.points[0].mean, None);
    }

    #[test]
    fn test_unknown_zone_yields_none() {
        let records = vec![record("2024-03-01 00:00", Some(1.0), None)];
        assert!(GroupAggregator::new().daily(&records, &zones(), "north").is_none());
        assert!(GroupAggregator::new().hourly(&records, &zones(), "north").is_none());
    }

    #[test]
    fn test_hourly_pools_across_days() {
        let records = vec![
            record("2024-03-01 08:00", Some(10.0), None),
            record("2024-03-02 08:30", Some(30.0), None),
            record("2024-03-01 17:00", Some(5.0), None),
        ];
        let pattern = GroupAggregator::new().hourly(&records, &zones(), "east").unwrap();

        let hours: Vec<u32> = pattern.points.iter().map(|p| p.hour).collect();
        assert_eq!(hours, vec![8, 17]);
        assert_eq!(pattern.mean_at(8), Some(20.0));
        assert_eq!(pattern.mean_at(17), Some(5.0));
        assert_eq!(pattern.mean_at(3), None);
    }

    #[test]
    fn test_hour_without_values_kept_as_missing() {
        let records = vec![record("2024-03-01 04:00", Some(1.0), None)];
        let pattern = GroupAggregator::new().hourly(&records, &zones(), "west").unwrap();
        assert_eq!(pattern.points, vec![HourlyPoint { hour: 4, mean: None }]);
    }

    #[test]
    fn test_fixed_daily_shape_is_reproduced() {
        let start = parse_timestamp("2024-06-01 00:00").unwrap();
        let shape = |h: i64| 1000.0 + 50.0 * (h as f64);
        let records: Vec<Record> = (0..72)
            .map(|i| Record::new(start + Duration::hours(i), vec![Some(shape(i % 24)), None]))
            .collect();

        let pattern = GroupAggregator::new().hourly(&records, &zones(), "east").unwrap();
        assert_eq!(pattern.points.len(), 24);
        for point in &pattern.points {
            assert_eq!(point.mean, Some(shape(point.hour as i64)));
        }
    }

    #[test]
    fn test_empty_records() {
        let pattern = GroupAggregator::new().hourly(&[], &zones(), "east").unwrap();
        assert!(pattern.points.is_empty());
        let daily = GroupAggregator::new().daily(&[], &zones(), "east").unwrap();
        assert!(daily.points.is_empty());
    }
}

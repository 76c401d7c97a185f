//! Time Window
//!
//! Inclusive `[start, end]` bounds and the filter that applies them.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::dataset::{Dataset, Record};
use crate::error::{ModelError, Result};

/// Inclusive time bounds with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(ModelError::validation(format!(
                "Window start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Window covering the whole dataset
    pub fn covering(dataset: &Dataset) -> Option<Self> {
        let (start, end) = dataset.time_bounds()?;
        Some(Self { start, end })
    }

    /// The last `days` days of the dataset, never starting before its first record
    ///
    /// Spans too long for chrono clamp to the first record.
    pub fn trailing_days(dataset: &Dataset, days: i64) -> Option<Self> {
        let (min, max) = dataset.time_bounds()?;
        let start = Duration::try_days(days.max(0))
            .and_then(|span| max.checked_sub_signed(span))
            .map_or(min, |start| start.max(min));
        Some(Self { start, end: max })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Records of a time-sorted slice that fall inside `window`
///
/// Both bounds are located by binary search, so the result is the contiguous
/// run of records with `start <= timestamp <= end`; it may be empty.
pub fn filter_records<'a>(records: &'a [Record], window: &TimeWindow) -> &'a [Record] {
    let lower = records.partition_point(|r| r.timestamp < window.start);
    let upper = records.partition_point(|r| r.timestamp <= window.end);
    if lower >= upper {
        return &records[0..0];
    }
    &records[lower..upper]
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::timestamp::parse_timestamp;

    fn ts(text: &str) -> NaiveDateTime {
        parse_timestamp(text).unwrap()
    }

    fn hourly_dataset(hours: u32) -> Dataset {
        let start = ts("2024-01-01 00:00");
        let records = (0..hours)
            .map(|h| Record::new(start + Duration::hours(h as i64), vec![Some(h as f64)]))
            .collect();
        Dataset::from_records(vec!["load".to_string()], records).unwrap()
    }

    #[test]
    fn test_window_rejects_inverted_bounds() {
        assert!(TimeWindow::new(ts("2024-01-02 00:00"), ts("2024-01-01 00:00")).is_err());
        assert!(TimeWindow::new(ts("2024-01-01 00:00"), ts("2024-01-01 00:00")).is_ok());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let ds = hourly_dataset(10);
        let window = TimeWindow::new(ts("2024-01-01 02:00"), ts("2024-01-01 05:00")).unwrap();
        let slice = ds.window(&window);

        let values: Vec<f64> = slice.iter().filter_map(|r| r.value(0)).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_window_between_records_is_empty() {
        let ds = hourly_dataset(10);
        let window = TimeWindow::new(ts("2024-01-01 02:10"), ts("2024-01-01 02:50")).unwrap();
        assert!(ds.window(&window).is_empty());
    }

    #[test]
    fn test_window_outside_dataset_is_empty() {
        let ds = hourly_dataset(3);
        let window = TimeWindow::new(ts("2025-01-01 00:00"), ts("2025-01-02 00:00")).unwrap();
        assert!(ds.window(&window).is_empty());
    }

    #[test]
    fn test_trailing_days_clamped_to_first_record() {
        let ds = hourly_dataset(10);
        let window = TimeWindow::trailing_days(&ds, 3).unwrap();
        assert_eq!(window.start(), ts("2024-01-01 00:00"));
        assert_eq!(window.end(), ts("2024-01-01 09:00"));
    }

    #[test]
    fn test_trailing_days_on_long_dataset() {
        let ds = hourly_dataset(24 * 7);
        let window = TimeWindow::trailing_days(&ds, 3).unwrap();
        assert_eq!(window.end(), ts("2024-01-07 23:00"));
        assert_eq!(window.start(), ts("2024-01-04 23:00"));
        assert_eq!(ds.window(&window).len(), 73);
    }

    #[test]
    fn test_trailing_days_beyond_chrono_range() {
        let ds = hourly_dataset(10);
        let window = TimeWindow::trailing_days(&ds, i64::MAX).unwrap();
        assert_eq!(window.start(), ts("2024-01-01 00:00"));
        assert_eq!(window.end(), ts("2024-01-01 09:00"));
        assert_eq!(ds.window(&window).len(), 10);
    }

    #[test]
    fn test_covering_window_keeps_everything() {
        let ds = hourly_dataset(5);
        let window = TimeWindow::covering(&ds).unwrap();
        assert_eq!(ds.window(&window).len(), 5);
    }
}

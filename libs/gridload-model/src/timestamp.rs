//! Timestamp Resolution
//!
//! Picks the canonical time column of a [`RawTable`] and parses it.
//!
//! Column selection is an ordered list of named [`TimestampDetector`]
//! strategies; the first one that returns a column wins. The standard order:
//!
//! 1. `interval-start-local` - a column whose name contains "interval",
//!    "start" and "local" (case-insensitive)
//! 2. `first-parseable` - the first column whose every non-empty cell parses
//!    as a date/time
//! 3. `first-column` - the first column, parseable or not
//!
//! [`TimestampResolver::with_explicit_column`] puts a configured column name
//! in front of that list. Whatever column wins, every cell must parse:
//! a bad cell is a [`ModelError::TimestampParse`], never a silent gap.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info, warn};

use crate::error::{ModelError, Result};
use crate::table::{RawTable, RawValue};

/// Date-time layouts tried in order after RFC 3339
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, read as midnight
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse date/time text into a naive local timestamp
///
/// Offset-bearing RFC 3339 input keeps its local wall-clock reading.
///
/// # Examples
/// ```
/// use gridload_model::parse_timestamp;
///
/// assert!(parse_timestamp("2024-07-01 13:00").is_some());
/// assert!(parse_timestamp("7/1/2024 1:00:00 PM").is_some());
/// assert!(parse_timestamp("not a date").is_none());
/// ```
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

fn is_date_like(value: &RawValue) -> bool {
    value.as_text().and_then(parse_timestamp).is_some()
}

/// A named strategy for locating the timestamp column
pub trait TimestampDetector: Send + Sync {
    /// Short stable name, used in logs
    fn name(&self) -> &'static str;

    /// Column index this strategy nominates, if any
    fn detect(&self, table: &RawTable) -> Option<usize>;
}

/// Nominates a configured column by exact name
#[derive(Debug, Clone)]
pub struct ExplicitColumn {
    column: String,
}

impl ExplicitColumn {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl TimestampDetector for ExplicitColumn {
    fn name(&self) -> &'static str {
        "explicit-column"
    }

    fn detect(&self, table: &RawTable) -> Option<usize> {
        table.column_index(&self.column)
    }
}

/// Nominates an interval-start, local-time column by name
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalStartLocal;

impl TimestampDetector for IntervalStartLocal {
    fn name(&self) -> &'static str {
        "interval-start-local"
    }

    fn detect(&self, table: &RawTable) -> Option<usize> {
        table.columns().iter().position(|name| {
            let name = name.to_lowercase();
            ["interval", "start", "local"]
                .iter()
                .all(|needle| name.contains(needle))
        })
    }
}

/// Nominates the first column whose non-empty cells all parse as date/time
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstParseableColumn;

impl TimestampDetector for FirstParseableColumn {
    fn name(&self) -> &'static str {
        "first-parseable"
    }

    fn detect(&self, table: &RawTable) -> Option<usize> {
        (0..table.columns().len()).find(|&index| {
            let mut non_empty = table.column_values(index).filter(|v| !v.is_empty());
            let mut seen = false;
            let all_dates = non_empty.all(|v| {
                seen = true;
                is_date_like(v)
            });
            seen && all_dates
        })
    }
}

/// Nominates the first column unconditionally
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstColumn;

impl TimestampDetector for FirstColumn {
    fn name(&self) -> &'static str {
        "first-column"
    }

    fn detect(&self, table: &RawTable) -> Option<usize> {
        if table.columns().is_empty() {
            None
        } else {
            Some(0)
        }
    }
}

/// Outcome of column resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub detector: &'static str,
}

/// Ordered detector list plus the parsing step
pub struct TimestampResolver {
    detectors: Vec<Box<dyn TimestampDetector>>,
}

impl TimestampResolver {
    /// Standard order: interval-start-local, first-parseable, first-column
    pub fn new() -> Self {
        Self::with_detectors(vec![
            Box::new(IntervalStartLocal),
            Box::new(FirstParseableColumn),
            Box::new(FirstColumn),
        ])
    }

    /// Standard order preceded by an explicit column name
    pub fn with_explicit_column(column: impl Into<String>) -> Self {
        let mut resolver = Self::new();
        resolver
            .detectors
            .insert(0, Box::new(ExplicitColumn::new(column)));
        resolver
    }

    /// Custom detector list, tried in the given order
    pub fn with_detectors(detectors: Vec<Box<dyn TimestampDetector>>) -> Self {
        Self { detectors }
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// First detector that nominates an existing column
    ///
    /// A nomination past the last column is skipped.
    pub fn resolve_column(&self, table: &RawTable) -> Option<ResolvedColumn> {
        self.detectors.iter().find_map(|detector| {
            let index = detector.detect(table)?;
            let Some(name) = table.columns().get(index) else {
                warn!(
                    "Detector {} nominated column {} of {}, skipping",
                    detector.name(),
                    index,
                    table.columns().len()
                );
                return None;
            };
            debug!("Detector {} nominated column '{}'", detector.name(), name);
            Some(ResolvedColumn {
                index,
                detector: detector.name(),
            })
        })
    }

    /// Parse every cell of `index`; rows are numbered from 0
    pub fn parse_column(&self, table: &RawTable, index: usize) -> Result<Vec<NaiveDateTime>> {
        let column = table
            .columns()
            .get(index)
            .ok_or_else(|| ModelError::table(format!("No column at index {}", index)))?;

        table
            .column_values(index)
            .enumerate()
            .map(|(row, cell)| {
                cell.as_text().and_then(parse_timestamp).ok_or_else(|| {
                    ModelError::TimestampParse {
                        column: column.clone(),
                        row,
                        value: match cell {
                            RawValue::Empty => String::new(),
                            RawValue::Number(n) => n.to_string(),
                            RawValue::Text(t) => t.clone(),
                        },
                    }
                })
            })
            .collect()
    }

    /// Resolve and parse in one go
    pub fn resolve(&self, table: &RawTable) -> Result<(ResolvedColumn, Vec<NaiveDateTime>)> {
        let resolved = self.resolve_column(table).ok_or_else(|| {
            ModelError::empty_source("No column could serve as the timestamp")
        })?;

        let column = &table.columns()[resolved.index];
        if resolved.detector == FirstColumn.name() {
            warn!(
                "No date-like column found, falling back to first column '{}'",
                column
            );
        } else {
            info!(
                "Timestamp column '{}' chosen by {}",
                column, resolved.detector
            );
        }

        let timestamps = self.parse_column(table, resolved.index)?;
        Ok((resolved, timestamps))
    }
}

impl Default for TimestampResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TimestampResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampResolver")
            .field("detectors", &self.detector_names())
            .finish()
    }
}

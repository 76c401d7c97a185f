//! Dataset
//!
//! The typed, time-sorted table every downstream computation reads.
//! Zone names are fixed when the dataset is built and values are stored
//! positionally, so no stage has to inspect column types again.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ModelError, Result};
use crate::table::{RawTable, TableLoader};
use crate::timestamp::TimestampResolver;
use crate::window::TimeWindow;

/// One normalized row: a timestamp plus one optional value per zone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub timestamp: NaiveDateTime,
    values: Vec<Option<f64>>,
}

impl Record {
    pub fn new(timestamp: NaiveDateTime, values: Vec<Option<f64>>) -> Self {
        Self { timestamp, values }
    }

    /// Value of the zone at `index`; missing and out-of-range both read as `None`
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// Immutable, time-sorted zone load table
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    time_column: String,
    zones: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Build from a raw table
    ///
    /// Fails when the table is structurally empty, when no column can serve
    /// as the timestamp, or when any timestamp cell does not parse.
    pub fn from_table(table: &RawTable, resolver: &TimestampResolver) -> Result<Self> {
        if table.columns().is_empty() {
            return Err(ModelError::empty_source("Source has no columns"));
        }
        if table.row_count() == 0 {
            return Err(ModelError::empty_source("Source has no data rows"));
        }

        let (resolved, timestamps) = resolver.resolve(table)?;

        let zone_columns: Vec<usize> = (0..table.columns().len())
            .filter(|&index| index != resolved.index)
            .filter(|&index| table.column_values(index).all(|v| v.is_numeric_or_empty()))
            .collect();

        let zones: Vec<String> = zone_columns
            .iter()
            .map(|&index| table.columns()[index].clone())
            .collect();

        let dropped = table.columns().len() - zone_columns.len() - 1;
        if dropped > 0 {
            debug!("Dropped {} non-numeric columns", dropped);
        }

        let records = table
            .rows()
            .iter()
            .zip(timestamps)
            .map(|(row, timestamp)| {
                let values = zone_columns
                    .iter()
                    .map(|&index| row[index].as_number())
                    .collect();
                Record::new(timestamp, values)
            })
            .collect();

        let dataset = Self::assemble(table.columns()[resolved.index].clone(), zones, records)?;
        info!(
            "Dataset built: {} records, {} zones, time column '{}'",
            dataset.len(),
            dataset.zones.len(),
            dataset.time_column
        );
        Ok(dataset)
    }

    /// Load a table through `loader` and build from it
    pub fn load(
        path: &Path,
        loader: &dyn TableLoader,
        resolver: &TimestampResolver,
    ) -> Result<Self> {
        let table = loader.load(path)?;
        Self::from_table(&table, resolver)
    }

    /// Build from already-typed records; they are sorted by timestamp
    pub fn from_records(zones: Vec<String>, records: Vec<Record>) -> Result<Self> {
        if let Some((row, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.values.len() != zones.len())
        {
            return Err(ModelError::table(format!(
                "Record {} at {} has {} values, expected {}",
                row,
                record.timestamp,
                record.values.len(),
                zones.len()
            )));
        }
        Self::assemble("timestamp".to_string(), zones, records)
    }

    fn assemble(time_column: String, zones: Vec<String>, mut records: Vec<Record>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(zones.len());
        if let Some(duplicate) = zones.iter().find(|z| !seen.insert(z.as_str())) {
            return Err(ModelError::table(format!(
                "Duplicate zone column '{}'",
                duplicate
            )));
        }

        // Stable: rows sharing a timestamp keep source order
        records.sort_by_key(|r| r.timestamp);

        Ok(Self {
            time_column,
            zones,
            records,
        })
    }

    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    pub fn zone_index(&self, name: &str) -> Option<usize> {
        self.zones.iter().position(|z| z == name)
    }

    pub fn has_zone(&self, name: &str) -> bool {
        self.zone_index(name).is_some()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest timestamps
    pub fn time_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.records.first()?.timestamp, self.records.last()?.timestamp))
    }

    /// Records inside `window`, as a contiguous slice
    pub fn window(&self, window: &TimeWindow) -> &[Record] {
        crate::window::filter_records(&self.records, window)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::table::RawValue;

    fn table(columns: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table
                .push_row(row.iter().map(|c| RawValue::from_cell(c)).collect())
                .unwrap();
        }
        table
    }

    #[test]
    fn test_zones_are_numeric_columns_only() {
        let t = table(
            &["interval_start_local", "pjm_rto", "area", "dom", "blank"],
            &[
                &["2024-01-01 01:00", "100", "east", "10", ""],
                &["2024-01-01 00:00", "90", "east", "", ""],
            ],
        );
        let ds = Dataset::from_table(&t, &TimestampResolver::new()).unwrap();

        assert_eq!(ds.zones(), &["pjm_rto", "dom", "blank"]);
        assert_eq!(ds.time_column(), "interval_start_local");
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn test_records_sorted_and_missing_preserved() {
        let t = table(
            &["interval_start_local", "pjm_rto", "dom"],
            &[
                &["2024-01-01 01:00", "100", "10"],
                &["2024-01-01 00:00", "90", ""],
            ],
        );
        let ds = Dataset::from_table(&t, &TimestampResolver::new()).unwrap();

        let first = &ds.records()[0];
        assert_eq!(first.value(0), Some(90.0));
        assert_eq!(first.value(1), None);
        assert!(ds.records()[0].timestamp < ds.records()[1].timestamp);
    }

    #[test]
    fn test_equal_timestamps_keep_source_order() {
        let t = table(
            &["when", "load"],
            &[
                &["2024-01-01 00:00", "2"],
                &["2024-01-01 00:00", "1"],
            ],
        );
        let ds = Dataset::from_table(&t, &TimestampResolver::new()).unwrap();
        assert_eq!(ds.records()[0].value(0), Some(2.0));
        assert_eq!(ds.records()[1].value(0), Some(1.0));
    }

    #[test]
    fn test_no_numeric_columns_is_valid() {
        let t = table(&["when", "note"], &[&["2024-01-01 00:00", "hello"]]);
        let ds = Dataset::from_table(&t, &TimestampResolver::new()).unwrap();
        assert!(ds.zones().is_empty());
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_empty_sources_rejected() {
        let resolver = TimestampResolver::new();
        assert!(matches!(
            Dataset::from_table(&RawTable::default(), &resolver),
            Err(ModelError::EmptySource(_))
        ));
        let header_only = RawTable::new(vec!["when".to_string()]);
        assert!(matches!(
            Dataset::from_table(&header_only, &resolver),
            Err(ModelError::EmptySource(_))
        ));
    }

    #[test]
    fn test_duplicate_zone_rejected() {
        let t = table(
            &["when", "dom", "dom"],
            &[&["2024-01-01 00:00", "1", "2"]],
        );
        let err = Dataset::from_table(&t, &TimestampResolver::new()).unwrap_err();
        assert!(matches!(err, ModelError::Table(_)));
    }

    #[test]
    fn test_from_records_checks_width() {
        let ts = crate::timestamp::parse_timestamp("2024-01-01 00:00").unwrap();
        let err = Dataset::from_records(
            vec!["a".to_string(), "b".to_string()],
            vec![Record::new(ts, vec![Some(1.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Table(_)));
    }

    #[test]
    fn test_time_bounds() {
        let t = table(
            &["when", "load"],
            &[
                &["2024-01-03 00:00", "1"],
                &["2024-01-01 00:00", "1"],
                &["2024-01-02 00:00", "1"],
            ],
        );
        let ds = Dataset::from_table(&t, &TimestampResolver::new()).unwrap();
        let (min, max) = ds.time_bounds().unwrap();
        assert_eq!(min.to_string(), "2024-01-01 00:00:00");
        assert_eq!(max.to_string(), "2024-01-03 00:00:00");
    }
}

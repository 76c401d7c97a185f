//! Raw Table
//!
//! Untyped tabular input as it comes out of a spreadsheet or CSV export:
//! ordered column names plus rows of loosely-typed cells. Nothing here knows
//! about timestamps or zones; that happens in [`crate::dataset`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{ModelError, Result};

/// One cell of the source table
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Classify a textual cell: blank, numeric, or free text
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return RawValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => RawValue::Number(value),
            Err(_) => RawValue::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawValue::Empty)
    }

    /// Numeric value, with NaN treated as missing
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(value) if !value.is_nan() => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this cell is compatible with a numeric column
    pub fn is_numeric_or_empty(&self) -> bool {
        matches!(self, RawValue::Empty | RawValue::Number(_))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(cell: &str) -> Self {
        RawValue::from_cell(cell)
    }
}

/// Ordered column names plus rows of raw cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; its width must match the header
    pub fn push_row(&mut self, row: Vec<RawValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ModelError::table(format!(
                "Row {} has {} cells, expected {}",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder-style helper used by tests and in-memory loaders
    pub fn with_row(mut self, row: Vec<RawValue>) -> Result<Self> {
        self.push_row(row)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<RawValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column, top to bottom
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &RawValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// No columns or no data rows
    pub fn is_structurally_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    /// Read a headed CSV stream
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut table = RawTable::new(columns);
        for result in csv_reader.records() {
            let record = result?;
            let row = record.iter().map(RawValue::from_cell).collect();
            table.push_row(row)?;
        }

        Ok(table)
    }

    /// Read a headed CSV file
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| ModelError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_csv_reader(BufReader::new(file))
    }
}

/// Source of raw tables, keyed by path
///
/// The spreadsheet reader is a collaborator; implement this trait to plug
/// one in. [`CsvTableLoader`] is the built-in implementation.
pub trait TableLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<RawTable>;
}

/// Loads headed CSV files
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvTableLoader;

impl TableLoader for CsvTableLoader {
    fn load(&self, path: &Path) -> Result<RawTable> {
        RawTable::from_csv_path(path)
    }
}

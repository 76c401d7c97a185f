//! Model Layer Error Types

use thiserror::Error;

/// Result type for gridload-model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Model layer errors
///
/// Only dataset construction and parameter validation can fail. Every
/// computation over a built [`crate::Dataset`] is total.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// Source table could not be read
    #[error("IO error: {0}")]
    Io(String),

    /// Source table is malformed (ragged rows, duplicate zone columns, bad CSV)
    #[error("Table error: {0}")]
    Table(String),

    /// Source has no columns or no data rows
    #[error("Empty source: {0}")]
    EmptySource(String),

    /// A cell of the resolved timestamp column is not a date/time
    #[error("Timestamp parse error in column '{column}' at row {row}: '{value}'")]
    TimestampParse {
        column: String,
        row: usize,
        value: String,
    },

    /// Invalid view parameter
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err.to_string())
    }
}

impl From<csv::Error> for ModelError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            ModelError::Io(err.to_string())
        } else {
            ModelError::Table(err.to_string())
        }
    }
}

// Helper methods
impl ModelError {
    pub fn table(msg: impl Into<String>) -> Self {
        ModelError::Table(msg.into())
    }

    pub fn empty_source(msg: impl Into<String>) -> Self {
        ModelError::EmptySource(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ModelError::Validation(msg.into())
    }

    /// Whether this error happened while building a dataset (terminal for the pipeline)
    pub fn is_load_failure(&self) -> bool {
        !matches!(self, ModelError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_parse_message() {
        let err = ModelError::TimestampParse {
            column: "when".to_string(),
            row: 3,
            value: "soon".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Timestamp parse error in column 'when' at row 3: 'soon'"
        );
        assert!(err.is_load_failure());
    }

    #[test]
    fn test_validation_is_not_load_failure() {
        assert!(!ModelError::validation("top_n out of range").is_load_failure());
        assert!(ModelError::empty_source("no rows").is_load_failure());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: ModelError = io.into();
        assert!(matches!(err, ModelError::Io(_)));
    }
}

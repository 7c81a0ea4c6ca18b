//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while assembling or preparing the dataset.
#[derive(Debug, Error)]
pub enum DataError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error while building the HTTP client
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A column the step depends on is not in the frame
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A column has no values to derive a fill from
    #[error("Column {0} has no non-missing values")]
    EmptyColumn(String),

    /// Missing values survived into a column that must be complete
    #[error("Column {column} still has {count} missing values")]
    ResidualNulls {
        /// Column name
        column: String,
        /// Number of missing values
        count: usize,
    },

    /// A feature column is not numeric
    #[error("Column {0} is not numeric")]
    NonNumeric(String),

    /// Feature matrix and target disagree in shape
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),
}

//! Error types for the epicast library.

use thiserror::Error;

/// Result type alias for modelling operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while building series, decomposing or forecasting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// NaN or infinite values where finite data is required.
    #[error("missing values detected in data")]
    MissingValues,

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

/// Errors raised while reading a case-count file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// The CSV structure is malformed.
    #[error("malformed CSV: {0}")]
    Csv(String),

    /// A requested or required column is absent.
    #[error("column not found: {0}")]
    MissingColumn(String),

    /// A date cell could not be parsed.
    #[error("unparseable date {value:?} on row {row}")]
    DateParse { row: usize, value: String },

    /// A value cell could not be parsed as a number.
    #[error("unparseable value {value:?} on row {row}")]
    ValueParse { row: usize, value: String },

    /// Two rows carry the same date.
    #[error("duplicate date {value} on row {row}")]
    DuplicateDate { row: usize, value: String },

    /// The file contains a header but no records.
    #[error("no records found")]
    Empty,

    /// The parsed rows do not form a valid series.
    #[error(transparent)]
    Series(#[from] ForecastError),
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        LoadError::Csv(err.to_string())
    }
}

use thiserror::Error;

/// Failure to turn a source file into a clean [`Table`](super::model::Table).
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Row {row}, column '{column}': {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
}

/// A filter specification that cannot be evaluated against the schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidFilterError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{0}' is not categorical")]
    NotCategorical(String),

    #[error("Field '{0}' is not numeric")]
    NotNumeric(String),

    #[error("Range for '{field}' is inverted: {min} > {max}")]
    InvertedRange { field: String, min: f64, max: f64 },

    #[error("Range for '{0}' has a non-finite bound")]
    NonFiniteBound(String),
}

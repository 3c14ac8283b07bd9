use thiserror::Error;

use crate::column::PhysicalType;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "parquet")]
    #[error("Parquet error")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[cfg(feature = "parquet")]
    #[error("Arrow error")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("Index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Columns not present in data: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Column \"{column}\" cannot be converted from {found} to {expected}")]
    TypeConversion {
        column: String,
        expected: PhysicalType,
        found: PhysicalType,
    },

    #[error(
        "Column \"{left}\" cannot be merged as it has a different datatype in each frame: \
         left is {left_type}, right (\"{right}\") is {right_type}"
    )]
    MergeTypeMismatch {
        left: String,
        right: String,
        left_type: PhysicalType,
        right_type: PhysicalType,
    },

    #[error("Column \"{0}\" contains nulls but is typed as non-nullable")]
    NullConstraint(String),

    #[error("Column \"{0}\" contains duplicates but is typed as unique")]
    UniquenessViolation(String),

    #[error("either 'on' or 'left_on' and 'right_on' must be given")]
    MissingJoinKeys,

    #[error("Join key lists differ in length: left has {left}, right has {right}")]
    JoinKeyLengthMismatch { left: usize, right: usize },

    #[error(
        "Cardinality of {0} is not valid. must be one of \
         'many-to-many', 'one-to-many', 'many-to-one' or 'one-to-one'"
    )]
    InvalidCardinality(String),

    #[error("Type of column {column} is invalid for a {side} join (must be unique and non-nullable)")]
    CardinalityViolation { column: String, side: &'static str },

    #[error("Cast error: {0}")]
    Cast(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Format error: {0}")]
    Format(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

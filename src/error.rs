//! Error types for the dsfdr library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum DsfdrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown statistical method '{0}'")]
    UnknownMethod(String),

    #[error("Unknown transform '{0}'")]
    UnknownTransform(String),

    #[error("Unknown FDR method '{0}'")]
    UnknownFdrMethod(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid labels: {0}")]
    InvalidLabels(String),

    #[error("Invalid value {value} at row {row}, column {col}")]
    InvalidValue { row: usize, col: usize, value: f64 },

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, DsfdrError>;

//! Error types for volta

use thiserror::Error;

/// Result type alias for volta operations
pub type Result<T> = std::result::Result<T, VoltaError>;

/// Main error type for volta
#[derive(Error, Debug)]
pub enum VoltaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

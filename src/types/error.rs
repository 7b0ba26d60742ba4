use std::path::PathBuf;

use thiserror::Error;

/// olistdash error types
#[derive(Error, Debug)]
pub enum OlistError {
    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A dataset file could not be read or deserialized
    #[error("csv error in {}: {source}", file.display())]
    Csv {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Failed to parse a value (timestamps, JSON)
    #[error("parse error: {0}")]
    Parse(String),

    /// Boundary document fetch or decode failed
    #[error("boundary error: {0}")]
    Boundary(String),

    /// Cache operation failed
    #[error("cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for olistdash
pub type Result<T> = std::result::Result<T, OlistError>;

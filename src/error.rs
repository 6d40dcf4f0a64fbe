//! Error types for the aggregation pipeline.
//!
//! Every variant is fatal: the run aborts before the output file is written.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AggregateError>;

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // Variants end with "Error" by convention
pub enum AggregateError {
    /// A mandatory input file is absent.
    #[error("Missing mandatory input file: {}", .0.display())]
    MissingFileError(PathBuf),

    /// A required column is missing or a row could not be parsed.
    #[error("Bad file format in {}: {reason}", .path.display())]
    FileFormatError { path: PathBuf, reason: String },

    /// Start/end pair that does not describe a valid range.
    #[error("Invalid address range {start} - {end}: {reason}")]
    InvalidRangeError {
        start: String,
        end: String,
        reason: String,
    },

    /// Network string lacking the prefix separator or with unparsable parts.
    #[error("Malformed network '{network}': {reason}")]
    MalformedNetworkError { network: String, reason: String },

    /// Country name without an entry in the geo registry.
    #[error("Country '{country}' not found in {}", .path.display())]
    UnknownCountryError { country: String, path: PathBuf },

    /// The same base address survived de-duplication twice.
    #[error("Duplicate network after de-duplication: {0}")]
    DuplicateNetworkError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error on {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl AggregateError {
    pub(crate) fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AggregateError::FileFormatError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AggregateError::IoError {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(network: &str, reason: impl Into<String>) -> Self {
        AggregateError::MalformedNetworkError {
            network: network.to_string(),
            reason: reason.into(),
        }
    }
}

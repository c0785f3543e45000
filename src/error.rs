// src/error.rs

use thiserror::Error;

/// File-level ingestion failures. None of these escape the dataset builder;
/// they are logged and counted in the build report.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The region id could not be decoded from the file name.
    #[error("cannot decode a region id from file name `{file}`")]
    Naming { file: String },

    /// Structural failure while parsing one file.
    #[error("failed to parse `{file}`: {reason}")]
    Parse { file: String, reason: String },

    #[error("failed to read `{file}`: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

/// Caller-supplied query parameters rejected before any computation.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("percentage must lie in (0, 100], got {0}")]
    PercentOutOfRange(f64),

    #[error("region id must lie in 1..=25, got {0}")]
    RegionOutOfRange(i64),

    #[error("{0} selection must not be empty")]
    EmptySelection(&'static str),

    #[error("malformed {what}: `{input}`")]
    Malformed { what: &'static str, input: String },
}

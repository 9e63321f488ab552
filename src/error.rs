//! Error handling
//!
//! Insufficient data and missing optional fields are never errors in this crate;
//! they come back as empty results or neutral values. What remains here is
//! collaborator failure, IO, and caller misuse.

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Failure reported by an event source collaborator
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("event source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed event data: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("feature layout mismatch: expected v{expected_version} ({expected_hash:08x}), got v{actual_version} ({actual_hash:08x})")]
    LayoutMismatch {
        expected_version: u8,
        expected_hash: u32,
        actual_version: u8,
        actual_hash: u32,
    },

    #[error("feature width mismatch for '{hypothesis}': expected {expected}, got {actual}")]
    FeatureWidth {
        hypothesis: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

//! Error types for the instruction-capture pipeline.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the instruction-capture pipeline.
///
/// Messages never contain a raw account number or a record body; failures are
/// identified by `trade_id` and field names only.
#[derive(Error, Debug)]
pub enum Error {
    /// A field failed validation (bad security id, unsupported trade type).
    /// The record is dropped; the batch continues.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A field could not be parsed (malformed amount or timestamp). The
    /// record is rejected; the batch continues.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Transport-level publish failure. The trade stays pending for retry.
    #[error("Publish failed for trade {trade_id}")]
    Publish { trade_id: Uuid },

    /// Publish completion did not resolve within the configured deadline.
    /// Counts as a failure for retry accounting.
    #[error("Publish timed out for trade {trade_id}")]
    PublishTimeout { trade_id: Uuid },

    /// The pending store is at capacity and configured to reject new inserts.
    #[error("Pending store full (capacity {capacity})")]
    StoreFull { capacity: usize },

    /// Upload has no usable filename.
    #[error("Missing file name")]
    MissingFilename,

    /// Upload file has no content (or no header line).
    #[error("Empty file")]
    EmptyFile,

    /// Upload file extension is not a supported format.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Structured document is neither an object nor a list of objects.
    #[error("Unsupported document structure")]
    UnsupportedShape,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a publish error carrying only the trade id.
    pub fn publish(trade_id: Uuid) -> Self {
        Error::Publish { trade_id }
    }

    /// Create a publish-timeout error carrying only the trade id.
    pub fn publish_timeout(trade_id: Uuid) -> Self {
        Error::PublishTimeout { trade_id }
    }

    /// True for the per-record failures that skip one record without
    /// aborting the batch.
    pub fn is_record_level(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Parse(_))
    }
}

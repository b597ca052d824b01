//! Sink trait and error types

use crate::record::Record;
use thiserror::Error;

/// Errors that can occur while persisting a record
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for finished records
///
/// The engine treats any error as "log and continue"; implementations must
/// not assume a failed insert will be retried.
pub trait RecordSink {
    /// Persists one record
    fn insert(&mut self, record: &Record) -> SinkResult<()>;
}

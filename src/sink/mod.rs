//! Record persistence
//!
//! The engine hands each finished [`crate::record::Record`] to a
//! [`RecordSink`] exactly once per checkpoint lifetime. A sink failure is
//! logged and never retried.

mod sqlite;
mod traits;

pub use sqlite::SqliteSink;
pub use traits::{RecordSink, SinkError, SinkResult};

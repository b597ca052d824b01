//! Crawl engine
//!
//! The top-level state machine: paginated discovery, per-item detail
//! extraction, enrichment, persistence, and crash-resumable checkpointing.

mod coordinator;
mod progress;
mod state;

pub use coordinator::CrawlEngine;
pub use progress::{CrawlProgress, ProgressStore};
pub use state::CrawlState;

//! PyPI Harvester: a resumable package-index scraper
//!
//! This crate implements a crawler that walks the PyPI search index page by
//! page, extracts structured metadata from each project's detail page,
//! enriches records with repository statistics from the GitHub API, and
//! persists the results to a SQLite database. Progress is checkpointed after
//! every page so an interrupted run resumes where it left off.

pub mod config;
pub mod engine;
pub mod enrich;
pub mod extract;
pub mod fetch;
pub mod record;
pub mod sink;

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Classified failure of a single HTTP fetch
///
/// The retry layer dispatches on these variants: a 404 status or a transport
/// failure aborts retries, a 403 triggers a rate-limit cooldown, and a
/// timeout or any other status falls through to exponential backoff.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP status {code} for {url}")]
    Status { url: String, code: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use engine::{CrawlEngine, CrawlProgress, CrawlState, ProgressStore};
pub use record::{Record, RepoStats};
pub use sink::{RecordSink, SqliteSink};

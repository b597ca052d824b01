use serde::Deserialize;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvester: HarvesterConfig,
    #[serde(default)]
    pub github: GithubConfig,
    pub output: OutputConfig,
}

/// Index-crawling behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarvesterConfig {
    /// Search URL template; the engine appends `&page=N`
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Base URL for resolving project detail links
    #[serde(rename = "index-base-url")]
    pub index_base_url: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum fetch attempts per URL
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base delay for exponential retry backoff, in seconds
    #[serde(rename = "backoff-base-secs", default = "default_backoff_base")]
    pub backoff_base_secs: u64,

    /// Fixed cooldown after a remote rate-limit response, in seconds
    #[serde(rename = "cooldown-secs", default = "default_cooldown")]
    pub cooldown_secs: u64,

    /// Lower bound of the request jitter range, in seconds
    #[serde(rename = "jitter-min-secs", default = "default_jitter_min")]
    pub jitter_min_secs: f64,

    /// Upper bound of the request jitter range, in seconds
    #[serde(rename = "jitter-max-secs", default = "default_jitter_max")]
    pub jitter_max_secs: f64,

    /// Response cache expiry in seconds
    #[serde(rename = "cache-expiry-secs", default = "default_cache_expiry")]
    pub cache_expiry_secs: u64,

    /// Index rate quota: calls per window
    #[serde(rename = "rate-limit-calls", default = "default_rate_limit_calls")]
    pub rate_limit_calls: u32,

    /// Index rate quota: window length in seconds
    #[serde(
        rename = "rate-limit-period-secs",
        default = "default_rate_limit_period"
    )]
    pub rate_limit_period_secs: u64,
}

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    /// API base URL (overridable for tests)
    #[serde(rename = "api-base-url", default = "default_api_base_url")]
    pub api_base_url: String,

    /// Hourly quota when a token is configured
    #[serde(
        rename = "rate-limit-calls-authenticated",
        default = "default_github_calls_authenticated"
    )]
    pub rate_limit_calls_authenticated: u32,

    /// Hourly quota without a token
    #[serde(
        rename = "rate-limit-calls-unauthenticated",
        default = "default_github_calls_unauthenticated"
    )]
    pub rate_limit_calls_unauthenticated: u32,

    /// Quota window length in seconds
    #[serde(
        rename = "rate-limit-period-secs",
        default = "default_github_rate_limit_period"
    )]
    pub rate_limit_period_secs: u64,

    /// Access token; falls back to the GITHUB_TOKEN environment variable
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            rate_limit_calls_authenticated: default_github_calls_authenticated(),
            rate_limit_calls_unauthenticated: default_github_calls_unauthenticated(),
            rate_limit_period_secs: default_github_rate_limit_period(),
            token: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the progress checkpoint file
    #[serde(rename = "checkpoint-path", default = "default_checkpoint_path")]
    pub checkpoint_path: String,
}

fn default_request_timeout() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    1
}

fn default_cooldown() -> u64 {
    60
}

fn default_jitter_min() -> f64 {
    3.0
}

fn default_jitter_max() -> f64 {
    6.0
}

fn default_cache_expiry() -> u64 {
    3600
}

fn default_rate_limit_calls() -> u32 {
    15
}

fn default_rate_limit_period() -> u64 {
    60
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_calls_authenticated() -> u32 {
    5000
}

fn default_github_calls_unauthenticated() -> u32 {
    60
}

fn default_github_rate_limit_period() -> u64 {
    3600
}

fn default_checkpoint_path() -> String {
    "progress.json".to_string()
}

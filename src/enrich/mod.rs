//! GitHub repository enrichment
//!
//! Resolves a repository URL discovered on a detail page into owner/repo,
//! fetches `GET /repos/{owner}/{repo}` through the retrying fetcher, and
//! maps the JSON body into [`RepoStats`]. Every failure path - unparseable
//! URL, exhausted retries, "Not Found" body, malformed JSON - returns `None`
//! rather than an error: an unenrichable record is still a valid record.
//!
//! The API has its own quota (60/hour unauthenticated, far higher with a
//! token), so the enricher carries its own rate limiter and cache, separate
//! from the index fetcher's.

use crate::config::GithubConfig;
use crate::fetch::{fetch_with_retry, CachingFetcher, RateLimiter, RetryPolicy};
use crate::record::RepoStats;
use std::time::Duration;
use url::Url;

/// Fetches repository statistics for records with a GitHub link
pub struct RepositoryEnricher {
    fetcher: CachingFetcher,
    policy: RetryPolicy,
    api_base_url: String,
}

impl RepositoryEnricher {
    /// Creates an enricher from the GitHub section of the configuration
    ///
    /// The token comes from the config or falls back to the `GITHUB_TOKEN`
    /// environment variable; without one, the unauthenticated quota applies.
    pub fn new(
        config: &GithubConfig,
        cache_expiry: Duration,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Result<Self, reqwest::Error> {
        let token = config
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok());

        let calls = if token.is_some() {
            config.rate_limit_calls_authenticated
        } else {
            tracing::warn!(
                "No GitHub token configured, using unauthenticated rate limit of {} calls/hour",
                config.rate_limit_calls_unauthenticated
            );
            config.rate_limit_calls_unauthenticated
        };

        let limiter = RateLimiter::new(calls, Duration::from_secs(config.rate_limit_period_secs));
        let fetcher =
            CachingFetcher::for_github_api(limiter, cache_expiry, timeout, token.as_deref())?;

        Ok(Self {
            fetcher,
            policy,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches statistics for the repository behind `repo_url`
    pub async fn enrich(&mut self, repo_url: &str) -> Option<RepoStats> {
        let (owner, repo) = match parse_owner_repo(repo_url) {
            Some(parts) => parts,
            None => {
                tracing::warn!("Invalid GitHub URL: {}", repo_url);
                return None;
            }
        };

        let api_url = format!("{}/repos/{}/{}", self.api_base_url, owner, repo);
        let body = match fetch_with_retry(&mut self.fetcher, &api_url, &self.policy).await {
            Some(body) => body,
            None => {
                tracing::error!("Failed to fetch GitHub API for {}", repo_url);
                return None;
            }
        };

        parse_repo_stats(&body, repo_url)
    }
}

/// Extracts owner and repo from a GitHub URL
///
/// Takes the first two non-empty path segments and strips a trailing `.git`
/// from the repo segment. Fewer than two segments means the URL points at a
/// user or the site root, not a repository.
pub fn parse_owner_repo(repo_url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(repo_url).ok()?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());

    let owner = segments.next()?.to_string();
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo).to_string();

    Some((owner, repo))
}

/// Maps an API response body into [`RepoStats`]
///
/// A "Not Found" message body or a JSON parse failure yields `None`; parse
/// failures are never propagated to the caller.
fn parse_repo_stats(body: &str, repo_url: &str) -> Option<RepoStats> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to parse JSON response for {}: {}", repo_url, e);
            return None;
        }
    };

    if value.get("message").and_then(|m| m.as_str()) == Some("Not Found") {
        tracing::warn!("Repository not found: {}", repo_url);
        return None;
    }

    match serde_json::from_value(value) {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::error!("Unexpected repository payload for {}: {}", repo_url, e);
            None
        }
    }
}

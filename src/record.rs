//! Data model for harvested projects
//!
//! A [`Record`] is built once per project during detail extraction, enriched
//! at most once with repository statistics, then handed to the sink and
//! dropped. The enrichment sub-structure is all-or-nothing: `repo` is either
//! `None` (no repository link found, or enrichment failed) or fully populated
//! from a single successful API response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel used when a project page has no title markup
pub const UNKNOWN_TITLE: &str = "N/A";

/// Sentinel used when a project page has no summary markup
pub const NO_DESCRIPTION: &str = "No description available";

/// Sentinel used when a project page has no maintainer markup
pub const UNKNOWN_MAINTAINER: &str = "Unknown";

/// One harvested project record
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Project title (sentinel: [`UNKNOWN_TITLE`])
    pub title: String,

    /// Project summary (sentinel: [`NO_DESCRIPTION`])
    pub description: String,

    /// Maintainer name (sentinel: [`UNKNOWN_MAINTAINER`])
    pub maintainer: String,

    /// First `mailto:` address found on the detail page
    pub maintainer_email: Option<String>,

    /// First GitHub link found on the detail page
    pub repo_url: Option<String>,

    /// Repository statistics from the GitHub API
    pub repo: Option<RepoStats>,
}

/// Repository statistics as returned by `GET /repos/{owner}/{repo}`
///
/// Deserialized straight from the API response body; unknown fields are
/// ignored, missing counts default to zero, missing strings to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoStats {
    pub name: Option<String>,

    pub description: Option<String>,

    pub html_url: Option<String>,

    #[serde(default)]
    pub stargazers_count: u64,

    #[serde(default)]
    pub forks_count: u64,

    #[serde(default)]
    pub open_issues_count: u64,

    pub language: Option<String>,

    pub created_at: Option<DateTime<Utc>>,

    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub watchers_count: u64,
}

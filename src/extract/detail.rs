//! Detail-page extraction
//!
//! Pulls the structured fields out of a project page. Each field resolves
//! locally: title, summary, and maintainer fall back to their sentinels,
//! the email and repository link scans return `None` when nothing matches.

use crate::record::{NO_DESCRIPTION, UNKNOWN_MAINTAINER, UNKNOWN_TITLE};
use scraper::{Html, Selector};

/// Structured fields extracted from a project detail page
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDetails {
    pub title: String,
    pub description: String,
    pub maintainer: String,
    pub maintainer_email: Option<String>,
    pub repo_url: Option<String>,
}

/// Extracts project fields from a detail page
///
/// Never fails: missing subtrees yield sentinels or `None`.
pub fn extract_project_details(html: &str) -> ProjectDetails {
    let document = Html::parse_document(html);

    ProjectDetails {
        title: select_text(&document, "h1.package-header__name")
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        description: select_text(&document, "p.package-description__summary")
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        maintainer: select_text(&document, "span.sidebar-section__maintainer a")
            .unwrap_or_else(|| UNKNOWN_MAINTAINER.to_string()),
        maintainer_email: find_mailto(&document),
        repo_url: find_repo_link(&document),
    }
}

/// Trimmed text of the first element matching `selector`, if non-empty
fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First `mailto:` address among all anchors, in document order
fn find_mailto(document: &Html) -> Option<String> {
    let selector = Selector::parse("a[href]").ok()?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .find_map(|href| href.strip_prefix("mailto:"))
        .map(str::to_string)
}

/// First GitHub link, preferring the project-links sidebar
///
/// Scans the sidebar tab anchors first; if that region yields nothing,
/// falls back to every anchor on the page.
fn find_repo_link(document: &Html) -> Option<String> {
    for selector_str in ["a.vertical-tabs__tabs[href]", "a[href]"] {
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => continue,
        };
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                let href = href.to_lowercase();
                if href.contains("github.com") {
                    return Some(href);
                }
            }
        }
    }
    None
}

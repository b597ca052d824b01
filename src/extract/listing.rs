//! Listing-page extraction
//!
//! A search results page carries one card anchor per project. An empty
//! result is the page-exhausted signal, distinct from a fetch failure which
//! the caller sees before extraction runs.

use scraper::{Html, Selector};

/// Extracts project links from a search results page, in document order
pub fn extract_project_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("a.package-snippet") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

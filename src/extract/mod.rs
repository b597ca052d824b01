//! HTML extraction for listing and detail pages
//!
//! Both modes are tolerant of missing markup: absent fields resolve to a
//! sentinel or `None` locally, never to an error.

mod detail;
mod listing;

pub use detail::{extract_project_details, ProjectDetails};
pub use listing::extract_project_links;

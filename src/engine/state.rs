//! Engine state machine states

/// Lifecycle of a crawl run
///
/// `Idle -> Paging(n) -> Paging(n+1) -> ... -> Exhausted`. The engine starts
/// at the checkpointed page, not page 1, and only an empty or failed listing
/// page reaches `Exhausted` - the crawl is open-ended and self-terminating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Engine constructed, run not started
    Idle,

    /// Working through listing page `n`
    Paging(u32),

    /// Listing exhausted, run finished
    Exhausted,
}

impl CrawlState {
    /// The page being worked, if paging
    pub fn page(&self) -> Option<u32> {
        match self {
            CrawlState::Paging(n) => Some(*n),
            _ => None,
        }
    }
}

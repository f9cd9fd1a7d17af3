/// Crawl phase definitions for tracking coordinator progress
///
/// A crawl moves strictly forward through its phases; `Failed` can be
/// entered from any phase that has not finished yet.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Coordinator built, fetcher session not opened yet
    NotStarted,

    /// Listing pages are being discovered one after another
    Crawling,

    /// Deferred page units and author enrichment are running
    Draining,

    /// The landing page is being fetched for the tag cloud
    FetchingTags,

    // ===== Terminal States =====
    /// Snapshot taken, session closed
    Done,

    /// An unrecovered error aborted the run
    Failed,
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        match (self, next) {
            (Self::NotStarted, Self::Crawling) => true,
            (Self::Crawling, Self::Draining) => true,
            (Self::Draining, Self::FetchingTags) => true,
            (Self::FetchingTags, Self::Done) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Short lowercase label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Crawling => "crawling",
            Self::Draining => "draining",
            Self::FetchingTags => "fetching_tags",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns all phases in their forward order
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::NotStarted,
            Self::Crawling,
            Self::Draining,
            Self::FetchingTags,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

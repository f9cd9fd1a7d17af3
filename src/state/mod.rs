//! State module for tracking crawl progress
//!
//! - `CrawlPhase`: the coordinator's lifecycle, from `NotStarted` to `Done` or `Failed`

mod crawl_phase;

pub use crawl_phase::CrawlPhase;

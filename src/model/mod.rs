//! Data model for harvested records
//!
//! - `Tag` / `Quote`: immutable records extracted from listing pages
//! - `Biography` / `AuthorRecord`: author data as it leaves the registry
//! - `CrawlResult`: the final snapshot handed to persistence

mod author;
mod quote;

pub use author::{AuthorMap, AuthorRecord, Biography};
pub use quote::{Quote, Tag};

use serde::Serialize;

/// Immutable snapshot of a finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlResult {
    pub authors: AuthorMap,
    pub top_tags: Vec<Tag>,
}

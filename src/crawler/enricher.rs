//! Author enrichment
//!
//! Fetches an author's detail page and replaces the author's biography in
//! the registry with the parsed fields.

use crate::crawler::context::CrawlContext;
use crate::crawler::fetcher::FetchResult;
use crate::crawler::parser::parse_author_details;
use crate::model::Biography;
use crate::HarvestError;

/// What happened to one enrichment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// Biography replaced in the registry
    Updated,

    /// Author page returned a non-success status; biography left as is
    FetchFailed { status_code: u16 },

    /// Author page lacked the biography elements; biography left as is
    Unparseable,

    /// The author was not in the registry
    UnknownAuthor,
}

/// Fetches `url` and merges its biography fields into the author `name`
///
/// Only transport errors and cancellation are returned as `Err`; a failed
/// or unparseable page is logged and reported through [`EnrichOutcome`].
pub async fn enrich_author(
    ctx: &CrawlContext,
    name: &str,
    url: &str,
) -> Result<EnrichOutcome, HarvestError> {
    let body = match ctx.fetcher.fetch(url).await? {
        FetchResult::Success { body, .. } => body,
        FetchResult::HttpError { status_code } => {
            tracing::warn!("Failed to load author data: {} (HTTP {})", name, status_code);
            ctx.counters.record_enrichment_failure();
            return Ok(EnrichOutcome::FetchFailed { status_code });
        }
    };

    let Some(details) = parse_author_details(&body)? else {
        tracing::warn!("Author page for {} is missing biography fields", name);
        ctx.counters.record_unparseable();
        return Ok(EnrichOutcome::Unparseable);
    };

    let biography = Biography {
        born_date: details.born_date,
        born_location: details.born_location,
        description: details.description,
        url: url.to_string(),
    };

    if !ctx.registry.update_biography(name, biography) {
        tracing::debug!("Author {} is not registered; skipping update", name);
        return Ok(EnrichOutcome::UnknownAuthor);
    }

    ctx.counters.record_enriched();
    tracing::info!("Author information {} has been successfully updated.", name);
    Ok(EnrichOutcome::Updated)
}

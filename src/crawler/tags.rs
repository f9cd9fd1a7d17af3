//! Top tag listing from the landing page

use crate::crawler::context::CrawlContext;
use crate::crawler::fetcher::FetchResult;
use crate::crawler::parser::parse_top_tags;
use crate::model::Tag;
use crate::HarvestError;

/// Fetches the landing page and extracts its tag cloud in document order
///
/// A failed fetch or a missing tag cloud is logged and yields an empty
/// list; only transport errors and cancellation are returned as `Err`.
pub async fn fetch_top_tags(ctx: &CrawlContext) -> Result<Vec<Tag>, HarvestError> {
    let body = match ctx.fetcher.fetch(&ctx.root_url()).await? {
        FetchResult::Success { body, .. } => body,
        FetchResult::HttpError { status_code } => {
            tracing::error!("Failed to load data for popular tags (HTTP {}).", status_code);
            return Ok(Vec::new());
        }
    };

    match parse_top_tags(&body, &ctx.site.base_url)? {
        Some(tags) => {
            tracing::info!("Popular tags loaded successfully ({} tags).", tags.len());
            Ok(tags)
        }
        None => {
            tracing::error!("The tag block could not be found.");
            Ok(Vec::new())
        }
    }
}

//! Quote extraction for one listing page
//!
//! Each quote block is registered under its author right away, in document
//! order. Enrichment of the block's author is spawned as a separate task;
//! the page counts as processed only once all of those tasks are done.

use crate::crawler::context::CrawlContext;
use crate::crawler::enricher::{enrich_author, EnrichOutcome};
use crate::crawler::parser::{parse_quote_blocks, QuoteBlock};
use crate::model::Quote;
use crate::HarvestError;
use tokio::task::JoinSet;

/// A fetched listing page waiting to be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUnit {
    /// 1-based page number
    pub number: u32,
    pub body: String,
}

/// Result of processing one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub number: u32,

    /// Quote blocks registered from this page
    pub quotes: usize,

    /// One entry per enrichment task, in completion order
    pub enrichments: Vec<EnrichOutcome>,
}

/// Extracts every quote of a page and enriches each quote's author
///
/// # Returns
///
/// * `Ok(PageOutcome)` - all blocks registered and all enrichment tasks finished
/// * `Err(HarvestError)` - an enrichment fetch failed at the transport level
pub async fn process_page(ctx: CrawlContext, unit: PageUnit) -> Result<PageOutcome, HarvestError> {
    let blocks = parse_quote_blocks(&unit.body, &ctx.site.base_url)?;
    let quotes = blocks.len();

    let mut enrichments = JoinSet::new();
    for block in blocks {
        let (author_name, author_url) = register_quote(&ctx, block);

        let ctx = ctx.clone();
        enrichments.spawn(async move {
            tracing::info!("Loading information about the author: {}", author_name);
            enrich_author(&ctx, &author_name, &author_url).await
        });
    }

    let mut outcomes = Vec::with_capacity(quotes);
    while let Some(joined) = enrichments.join_next().await {
        outcomes.push(joined??);
    }

    tracing::info!(
        "The quotes page {} has been processed ({} quotes).",
        unit.number,
        quotes
    );

    Ok(PageOutcome {
        number: unit.number,
        quotes,
        enrichments: outcomes,
    })
}

/// Appends the block's quote to its author and returns the author's name and page URL
fn register_quote(ctx: &CrawlContext, block: QuoteBlock) -> (String, String) {
    let QuoteBlock {
        text,
        tags,
        author_name,
        author_url,
    } = block;

    ctx.registry.append_quote(&author_name, Quote::new(text, tags));
    (author_name, author_url)
}

//! Listing page discovery
//!
//! Discovery is split in two phases:
//!
//! 1. [`PageDiscoverer::collect_pages`] requests `/page/1/`, `/page/2/`, ...
//!    strictly one after another until a page contains the end sentinel.
//!    Pages are not parsed here, only queued as [`PageUnit`]s.
//! 2. [`PageDiscoverer::process_all`] launches every queued unit at once
//!    and waits until all of them, including their author enrichment, are
//!    finished.
//!
//! A listing page answered with a non-success status has no body and is
//! not queued. Since such a page cannot prove that pagination is exhausted,
//! discovery keeps going but gives up after a configured number of failures
//! in a row. An optional page cap bounds discovery as well.

use crate::config::CrawlerConfig;
use crate::crawler::context::CrawlContext;
use crate::crawler::extractor::{process_page, PageUnit};
use crate::crawler::fetcher::FetchResult;
use crate::HarvestError;
use std::fmt;
use tokio::task::JoinSet;

/// Why page discovery stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page contained the end sentinel
    EndSentinel,

    /// The configured page cap was reached
    PageLimit,

    /// Too many listing pages failed in a row
    TooManyFailures,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::EndSentinel => "end of pages reached",
            Self::PageLimit => "page limit reached",
            Self::TooManyFailures => "too many consecutive page failures",
        };
        write!(f, "{}", label)
    }
}

/// Ordered worklist produced by the sequential phase
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Deferred page units in page order
    pub worklist: Vec<PageUnit>,

    /// Listing pages requested, including the sentinel page and failures
    pub pages_requested: u32,

    /// Listing pages answered with a non-success status
    pub pages_failed: u32,

    pub stop_reason: StopReason,
}

/// Summary of both discovery phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub pages_requested: u32,
    pub pages_failed: u32,
    pub pages_processed: usize,
    pub quotes: usize,
    pub stop_reason: StopReason,
}

/// Walks the listing pages of the site
pub struct PageDiscoverer {
    ctx: CrawlContext,
    max_pages: u32,
    max_consecutive_failures: u32,
}

impl PageDiscoverer {
    pub fn new(ctx: CrawlContext, config: &CrawlerConfig) -> Self {
        Self {
            ctx,
            max_pages: config.max_pages,
            max_consecutive_failures: config.max_consecutive_page_failures.max(1),
        }
    }

    /// Requests listing pages one at a time and queues them for processing
    ///
    /// Transport errors and cancellation abort discovery with `Err`.
    pub async fn collect_pages(&self) -> Result<Discovery, HarvestError> {
        let sentinel = self.ctx.site.end_sentinel.as_str();
        let mut worklist = Vec::new();
        let mut pages_requested = 0u32;
        let mut pages_failed = 0u32;
        let mut failed_in_a_row = 0u32;

        let stop_reason = loop {
            if self.max_pages > 0 && pages_requested >= self.max_pages {
                tracing::warn!(
                    "Stopping discovery at the page limit ({} pages)",
                    self.max_pages
                );
                break StopReason::PageLimit;
            }

            pages_requested += 1;
            let number = pages_requested;
            tracing::info!("Loading quotes page {}", number);

            match self.ctx.fetcher.fetch(&self.ctx.page_url(number)).await? {
                FetchResult::Success { body, .. } => {
                    failed_in_a_row = 0;
                    if body.contains(sentinel) {
                        tracing::info!("End of quotes reached.");
                        break StopReason::EndSentinel;
                    }
                    worklist.push(PageUnit { number, body });
                }
                FetchResult::HttpError { status_code } => {
                    pages_failed += 1;
                    failed_in_a_row += 1;
                    tracing::warn!(
                        "Quotes page {} failed with HTTP {} ({} in a row)",
                        number,
                        status_code,
                        failed_in_a_row
                    );
                    if failed_in_a_row >= self.max_consecutive_failures {
                        tracing::warn!(
                            "Stopping discovery after {} consecutive page failures",
                            failed_in_a_row
                        );
                        break StopReason::TooManyFailures;
                    }
                }
            }
        };

        Ok(Discovery {
            worklist,
            pages_requested,
            pages_failed,
            stop_reason,
        })
    }

    /// Processes every queued page concurrently and waits for all of them
    ///
    /// Returns the number of quote blocks registered. The first unit to
    /// fail aborts the remaining ones.
    pub async fn process_all(&self, worklist: Vec<PageUnit>) -> Result<usize, HarvestError> {
        tracing::info!(
            "Processing of {} pages with quotes has begun.",
            worklist.len()
        );

        let mut units = JoinSet::new();
        for unit in worklist {
            units.spawn(process_page(self.ctx.clone(), unit));
        }

        let mut quotes = 0;
        while let Some(joined) = units.join_next().await {
            let outcome = joined??;
            quotes += outcome.quotes;
        }

        tracing::info!("Quote loading is complete.");
        Ok(quotes)
    }
}

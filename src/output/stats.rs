//! Crawl statistics
//!
//! Collected by the coordinator at the end of a successful run and printed
//! by the command-line tool.

use crate::crawler::{DiscoveryReport, FetchStats, PipelineCounts, StopReason};
use crate::model::CrawlResult;
use chrono::{DateTime, Utc};

/// Summary numbers for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Listing pages requested, including failed ones
    pub pages_requested: u32,

    /// Listing pages that returned a non-success status
    pub pages_failed: u32,

    /// Listing pages handed to quote extraction
    pub pages_processed: usize,

    /// Why page discovery stopped
    pub stop_reason: StopReason,

    pub authors: usize,
    pub quotes: usize,
    pub top_tags: usize,

    /// Author pages fetched and merged into the registry
    pub authors_enriched: u64,

    /// Author page fetches that returned a non-success status
    pub enrichment_failures: u64,

    /// Author pages fetched but missing biography elements
    pub enrichment_unparseable: u64,

    pub fetch: FetchStats,
}

impl CrawlStatistics {
    /// Assembles statistics from the pieces the coordinator holds at the end of a run
    pub fn collect(
        started_at: DateTime<Utc>,
        discovery: &DiscoveryReport,
        counts: PipelineCounts,
        fetch: FetchStats,
        result: &CrawlResult,
    ) -> Self {
        Self {
            started_at,
            finished_at: Utc::now(),
            pages_requested: discovery.pages_requested,
            pages_failed: discovery.pages_failed,
            pages_processed: discovery.pages_processed,
            stop_reason: discovery.stop_reason,
            authors: result.authors.len(),
            quotes: result.authors.total_quotes(),
            top_tags: result.top_tags.len(),
            authors_enriched: counts.authors_enriched,
            enrichment_failures: counts.enrichment_failures,
            enrichment_unparseable: counts.enrichment_unparseable,
            fetch,
        }
    }

    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as f64
            / 1000.0
    }

    /// Percentage of enrichment fetches that updated an author
    pub fn enrichment_success_rate(&self) -> f64 {
        let attempts =
            self.authors_enriched + self.enrichment_failures + self.enrichment_unparseable;
        if attempts == 0 {
            0.0
        } else {
            (self.authors_enriched as f64 / attempts as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Pages:");
    println!("  Requested: {}", stats.pages_requested);
    println!("  Processed: {}", stats.pages_processed);
    println!("  Failed: {}", stats.pages_failed);
    println!("  Stopped because: {}", stats.stop_reason);
    println!();

    println!("Records:");
    println!("  Authors: {}", stats.authors);
    println!("  Quotes: {}", stats.quotes);
    println!("  Top tags: {}", stats.top_tags);
    println!();

    println!("Enrichment:");
    println!("  Updated: {}", stats.authors_enriched);
    println!("  Fetch failures: {}", stats.enrichment_failures);
    println!("  Unparseable pages: {}", stats.enrichment_unparseable);
    println!("  Success rate: {:.1}%", stats.enrichment_success_rate());
    println!();

    println!("Requests:");
    println!("  Sent: {}", stats.fetch.requests);
    println!("  Non-success responses: {}", stats.fetch.http_errors);
    println!("  Peak in flight: {}", stats.fetch.peak_in_flight);
    println!();

    println!("Duration: {:.2} seconds", stats.duration_seconds());
}

//! State shared by every task of one crawl run

use crate::config::SiteConfig;
use crate::crawler::fetcher::BoundedFetcher;
use crate::crawler::registry::AuthorRegistry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handles a spawned crawl task needs
///
/// Cloning is cheap: every field is reference counted.
#[derive(Debug, Clone)]
pub struct CrawlContext {
    pub fetcher: BoundedFetcher,
    pub registry: AuthorRegistry,
    pub site: Arc<SiteConfig>,
    pub counters: Arc<PipelineCounters>,
}

impl CrawlContext {
    /// Builds the context; trailing slashes are removed from the base URL
    pub fn new(fetcher: BoundedFetcher, registry: AuthorRegistry, mut site: SiteConfig) -> Self {
        // Page, author and tag URLs are built by appending paths to the base
        let trimmed_len = site.base_url.trim_end_matches('/').len();
        site.base_url.truncate(trimmed_len);

        Self {
            fetcher,
            registry,
            site: Arc::new(site),
            counters: Arc::new(PipelineCounters::default()),
        }
    }

    /// URL of a numbered listing page
    pub fn page_url(&self, number: u32) -> String {
        format!("{}/page/{}/", self.site.base_url, number)
    }

    /// URL of the landing page
    pub fn root_url(&self) -> String {
        format!("{}/", self.site.base_url)
    }
}

/// Enrichment counters updated from concurrent tasks
#[derive(Debug, Default)]
pub struct PipelineCounters {
    authors_enriched: AtomicU64,
    enrichment_failures: AtomicU64,
    enrichment_unparseable: AtomicU64,
}

/// Point-in-time copy of [`PipelineCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineCounts {
    pub authors_enriched: u64,
    pub enrichment_failures: u64,
    pub enrichment_unparseable: u64,
}

impl PipelineCounters {
    pub fn record_enriched(&self) {
        self.authors_enriched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enrichment_failure(&self) {
        self.enrichment_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unparseable(&self) {
        self.enrichment_unparseable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineCounts {
        PipelineCounts {
            authors_enriched: self.authors_enriched.load(Ordering::Relaxed),
            enrichment_failures: self.enrichment_failures.load(Ordering::Relaxed),
            enrichment_unparseable: self.enrichment_unparseable.load(Ordering::Relaxed),
        }
    }
}

//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator owns the fetcher session and drives a run through its
//! phases:
//! - `Crawling`: sequential listing page discovery
//! - `Draining`: concurrent quote extraction and author enrichment
//! - `FetchingTags`: landing page tag cloud
//! - `Done`: snapshot taken and, optionally, handed to a sink
//!
//! Any unrecovered error moves the run to `Failed`. The fetcher session is
//! closed on every exit path.

use crate::config::Config;
use crate::crawler::cancel::CancelToken;
use crate::crawler::context::CrawlContext;
use crate::crawler::discovery::{DiscoveryReport, PageDiscoverer};
use crate::crawler::fetcher::BoundedFetcher;
use crate::crawler::registry::AuthorRegistry;
use crate::crawler::tags::fetch_top_tags;
use crate::model::CrawlResult;
use crate::output::{CrawlStatistics, ResultSink};
use crate::state::CrawlPhase;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    ctx: CrawlContext,
    cancel: CancelToken,
    phase: CrawlPhase,
    statistics: Option<CrawlStatistics>,
}

/// Keeps the fetcher session open for as long as it lives
struct Session {
    fetcher: BoundedFetcher,
}

impl Session {
    fn open(fetcher: &BoundedFetcher) -> Result<Self, HarvestError> {
        fetcher.open()?;
        Ok(Self {
            fetcher: fetcher.clone(),
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.fetcher.close();
    }
}

impl Coordinator {
    /// Creates a coordinator with its own cancellation token
    pub fn new(config: Config) -> Self {
        Self::with_cancel(config, CancelToken::new())
    }

    /// Creates a coordinator that stops fetching once `cancel` is triggered
    pub fn with_cancel(config: Config, cancel: CancelToken) -> Self {
        let fetcher = BoundedFetcher::new(&config.crawler, &config.user_agent, cancel.clone());
        let ctx = CrawlContext::new(fetcher, AuthorRegistry::new(), config.site.clone());

        Self {
            config: Arc::new(config),
            ctx,
            cancel,
            phase: CrawlPhase::NotStarted,
            statistics: None,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Returns true while the fetcher session is open
    pub fn is_session_open(&self) -> bool {
        self.ctx.fetcher.is_open()
    }

    /// Statistics of the last successful run
    pub fn statistics(&self) -> Option<&CrawlStatistics> {
        self.statistics.as_ref()
    }

    /// Runs the full crawl and returns the snapshot
    ///
    /// A coordinator runs once; calling this again returns
    /// `HarvestError::InvalidTransition`.
    pub async fn run(&mut self) -> Result<CrawlResult, HarvestError> {
        self.execute(None).await
    }

    /// Runs the full crawl and hands the snapshot to `sink`
    ///
    /// The run only reaches `Done` once the sink has stored the snapshot.
    pub async fn run_and_store(
        &mut self,
        sink: &dyn ResultSink,
    ) -> Result<CrawlResult, HarvestError> {
        self.execute(Some(sink)).await
    }

    async fn execute(&mut self, sink: Option<&dyn ResultSink>) -> Result<CrawlResult, HarvestError> {
        self.transition(CrawlPhase::Crawling)?;
        let started_at = Utc::now();
        tracing::info!(
            "Start collecting all data from {} (up to {} concurrent requests)",
            self.ctx.site.base_url,
            self.ctx.fetcher.limit()
        );

        let outcome = match self.run_session(started_at).await {
            Ok(result) => persist(sink, result),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => {
                self.transition(CrawlPhase::Done)?;
                tracing::info!(
                    "All data collection is complete: {} authors, {} quotes, {} top tags.",
                    result.authors.len(),
                    result.authors.total_quotes(),
                    result.top_tags.len()
                );
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Crawl failed while {}: {}", self.phase, e);
                self.statistics = None;
                self.fail();
                Err(e)
            }
        }
    }

    async fn run_session(&mut self, started_at: DateTime<Utc>) -> Result<CrawlResult, HarvestError> {
        let _session = Session::open(&self.ctx.fetcher)?;

        let discoverer = PageDiscoverer::new(self.ctx.clone(), &self.config.crawler);
        let discovery = discoverer.collect_pages().await?;

        self.transition(CrawlPhase::Draining)?;
        let pages_processed = discovery.worklist.len();
        let quotes = discoverer.process_all(discovery.worklist).await?;

        self.transition(CrawlPhase::FetchingTags)?;
        let top_tags = fetch_top_tags(&self.ctx).await?;

        let result = CrawlResult {
            authors: self.ctx.registry.snapshot(),
            top_tags,
        };

        let report = DiscoveryReport {
            pages_requested: discovery.pages_requested,
            pages_failed: discovery.pages_failed,
            pages_processed,
            quotes,
            stop_reason: discovery.stop_reason,
        };
        self.statistics = Some(CrawlStatistics::collect(
            started_at,
            &report,
            self.ctx.counters.snapshot(),
            self.ctx.fetcher.stats(),
            &result,
        ));

        Ok(result)
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Crawl phase: {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    fn fail(&mut self) {
        if self.phase.can_transition_to(CrawlPhase::Failed) {
            self.phase = CrawlPhase::Failed;
        }
    }
}

fn persist(sink: Option<&dyn ResultSink>, result: CrawlResult) -> Result<CrawlResult, HarvestError> {
    if let Some(sink) = sink {
        sink.store(&result)?;
        tracing::info!("Result stored to {}", sink.destination());
    }
    Ok(result)
}

/// Runs a crawl with `config` and stores the snapshot in `sink`
///
/// # Example
///
/// ```no_run
/// use quote_harvester::config::Config;
/// use quote_harvester::crawler::run_and_store;
/// use quote_harvester::output::JsonFileSink;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sink = JsonFileSink::new("result.json");
/// run_and_store(Config::default(), &sink).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_and_store(
    config: Config,
    sink: &dyn ResultSink,
) -> Result<CrawlResult, HarvestError> {
    let mut coordinator = Coordinator::new(config);
    coordinator.run_and_store(sink).await
}

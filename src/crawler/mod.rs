//! Crawler module for quote and author collection
//!
//! This module contains the core crawling logic, including:
//! - Bounded, cancellable HTTP fetching
//! - HTML extraction of quotes, biographies and tags
//! - Sequential page discovery followed by a concurrent drain
//! - The shared author registry
//! - Overall crawl coordination

mod cancel;
mod context;
mod coordinator;
mod discovery;
mod enricher;
mod extractor;
mod fetcher;
mod parser;
mod registry;
mod tags;

pub use cancel::CancelToken;
pub use context::{CrawlContext, PipelineCounters, PipelineCounts};
pub use coordinator::{run_and_store, Coordinator};
pub use discovery::{Discovery, DiscoveryReport, PageDiscoverer, StopReason};
pub use enricher::{enrich_author, EnrichOutcome};
pub use extractor::{process_page, PageOutcome, PageUnit};
pub use fetcher::{build_http_client, BoundedFetcher, FetchResult, FetchStats};
pub use parser::{
    parse_author_details, parse_quote_blocks, parse_top_tags, AuthorDetails, QuoteBlock,
};
pub use registry::{AuthorHandle, AuthorRegistry};
pub use tags::fetch_top_tags;

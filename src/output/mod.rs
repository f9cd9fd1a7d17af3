//! Output module for persisting crawl results
//!
//! This module handles:
//! - The `ResultSink` interface the coordinator's snapshot is handed to
//! - Writing the snapshot as a JSON file
//! - Crawl statistics for the end-of-run report

mod json;
pub mod stats;
mod traits;

pub use json::{format_json_result, write_json_result, JsonFileSink};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{MemorySink, OutputError, OutputResult, ResultSink};

//! Output sink trait and types
//!
//! This module defines the interface that receives the final crawl
//! snapshot, plus an in-memory sink.

use crate::model::CrawlResult;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for a finished crawl snapshot
pub trait ResultSink: Send + Sync {
    /// Persists the snapshot
    fn store(&self, result: &CrawlResult) -> OutputResult<()>;

    /// Human-readable destination used in log lines
    fn destination(&self) -> String;
}

/// Sink that keeps the last stored snapshot in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    stored: Mutex<Option<CrawlResult>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last stored snapshot, if any
    pub fn stored(&self) -> Option<CrawlResult> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultSink for MemorySink {
    fn store(&self, result: &CrawlResult) -> OutputResult<()> {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(result.clone());
        Ok(())
    }

    fn destination(&self) -> String {
        "memory".to_string()
    }
}

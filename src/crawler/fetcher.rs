//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a proper user agent string
//! - Scoping the client to an explicit open/close session
//! - Bounding in-flight requests with one shared semaphore
//! - Turning non-success statuses into a tagged result

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::cancel::CancelToken;
use crate::HarvestError;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Result of a fetch that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// 2xx response with its body
    Success {
        /// Page body content
        body: String,
        /// HTTP status code
        status_code: u16,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },
}

impl FetchResult {
    /// Returns the body for a successful fetch
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Success { body, .. } => Some(body),
            Self::HttpError { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { status_code, .. } | Self::HttpError { status_code } => *status_code,
        }
    }
}

/// Request counters for one fetcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Requests that were actually sent
    pub requests: u64,

    /// Responses with a non-success status
    pub http_errors: u64,

    /// Highest number of requests observed in flight at once
    pub peak_in_flight: usize,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use quote_harvester::config::{CrawlerConfig, UserAgentConfig};
/// use quote_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default(), &UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version
    let user_agent = format!("{}/{}", user_agent.crawler_name, user_agent.crawler_version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher that bounds concurrent requests across every caller
///
/// Clones share the same session, limiter and counters. Requests are only
/// allowed between [`BoundedFetcher::open`] and [`BoundedFetcher::close`].
#[derive(Debug, Clone)]
pub struct BoundedFetcher {
    inner: Arc<FetcherInner>,
}

#[derive(Debug)]
struct FetcherInner {
    crawler: CrawlerConfig,
    user_agent: UserAgentConfig,
    session: Mutex<Option<Client>>,
    limiter: Semaphore,
    limit: usize,
    cancel: CancelToken,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    requests: AtomicU64,
    http_errors: AtomicU64,
}

impl BoundedFetcher {
    /// Creates a closed fetcher allowing `crawler.max_concurrent_requests` requests in flight
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig, cancel: CancelToken) -> Self {
        let limit = crawler.max_concurrent_requests.max(1) as usize;

        Self {
            inner: Arc::new(FetcherInner {
                crawler: crawler.clone(),
                user_agent: user_agent.clone(),
                session: Mutex::new(None),
                limiter: Semaphore::new(limit),
                limit,
                cancel,
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                requests: AtomicU64::new(0),
                http_errors: AtomicU64::new(0),
            }),
        }
    }

    /// Maximum number of requests allowed in flight
    pub fn limit(&self) -> usize {
        self.inner.limit
    }

    /// Opens the session by building the HTTP client
    ///
    /// Opening an already open session keeps the existing client.
    pub fn open(&self) -> Result<(), HarvestError> {
        let mut session = self.lock_session();
        if session.is_none() {
            *session = Some(build_http_client(
                &self.inner.crawler,
                &self.inner.user_agent,
            )?);
            tracing::debug!("Fetcher session opened (limit {})", self.inner.limit);
        }
        Ok(())
    }

    /// Closes the session and drops the client with its connection pool
    ///
    /// Closing a closed session does nothing.
    pub fn close(&self) {
        if self.lock_session().take().is_some() {
            tracing::debug!("Fetcher session closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.lock_session().is_some()
    }

    /// Returns a snapshot of the request counters
    pub fn stats(&self) -> FetchStats {
        FetchStats {
            requests: self.inner.requests.load(Ordering::Relaxed),
            http_errors: self.inner.http_errors.load(Ordering::Relaxed),
            peak_in_flight: self.inner.peak_in_flight.load(Ordering::Relaxed),
        }
    }

    /// Fetches a URL under the shared concurrency limit
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResult::Success)` - 2xx response and its body
    /// * `Ok(FetchResult::HttpError)` - the server answered with another status
    /// * `Err(HarvestError::Lifecycle)` - the session is not open
    /// * `Err(HarvestError::Cancelled)` - the crawl was cancelled before or during the request
    /// * `Err(HarvestError::Http)` - connection, timeout or body read failure
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, HarvestError> {
        let client = self.client()?;
        let cancel = &self.inner.cancel;

        if cancel.is_cancelled() {
            return Err(HarvestError::Cancelled);
        }

        let _permit = tokio::select! {
            permit = self.inner.limiter.acquire() => permit
                .map_err(|_| HarvestError::Lifecycle("request limiter closed".to_string()))?,
            _ = cancel.cancelled() => return Err(HarvestError::Cancelled),
        };

        let _in_flight = InFlight::enter(&self.inner);

        tokio::select! {
            result = self.send(&client, url) => result.map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            }),
            _ = cancel.cancelled() => Err(HarvestError::Cancelled),
        }
    }

    async fn send(&self, client: &Client, url: &str) -> Result<FetchResult, reqwest::Error> {
        tracing::debug!("GET {}", url);
        self.inner.requests.fetch_add(1, Ordering::Relaxed);

        let response = client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            self.inner.http_errors.fetch_add(1, Ordering::Relaxed);
            tracing::error!("Error {} - code {}", url, status.as_u16());
            return Ok(FetchResult::HttpError {
                status_code: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(FetchResult::Success {
            body,
            status_code: status.as_u16(),
        })
    }

    fn client(&self) -> Result<Client, HarvestError> {
        // reqwest::Client is an Arc internally; cloning is cheap
        self.lock_session()
            .clone()
            .ok_or_else(|| HarvestError::Lifecycle("session is not started yet".to_string()))
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<Client>> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Tracks one request in flight for the peak counter
struct InFlight<'a> {
    inner: &'a FetcherInner,
}

impl<'a> InFlight<'a> {
    fn enter(inner: &'a FetcherInner) -> Self {
        let now = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        inner.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        Self { inner }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

use serde::Deserialize;

/// Main configuration structure for Quote-Harvester
///
/// Every section falls back to its defaults, so an empty file (or no file
/// at all) yields a working configuration for the public quotes site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Source site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root URL of the site, without a trailing slash
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Marker text that appears on the first page past the last one
    #[serde(rename = "end-sentinel")]
    pub end_sentinel: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://quotes.toscrape.com".to_string(),
            end_sentinel: "No quotes found!".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of requests in flight at once, shared by every fetch
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Maximum number of listing pages to request (0 means unlimited)
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Discovery stops after this many listing pages fail in a row
    #[serde(rename = "max-consecutive-page-failures")]
    pub max_consecutive_page_failures: u32,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 10,
            max_pages: 0,
            max_consecutive_page_failures: 3,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "QuoteHarvester".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON result file
    #[serde(rename = "result-path")]
    pub result_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result_path: "result.json".to_string(),
        }
    }
}

use crate::crawler::DEFAULT_MAX_BODY_BYTES;
use serde::Deserialize;

/// Main configuration structure for Linkcheck
///
/// Every section is optional; a missing file or section yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub skip: Vec<SkipEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Capacity of the dispatcher -> workers channel
    #[serde(rename = "work-queue-capacity")]
    pub work_queue_capacity: usize,

    /// Capacity of the workers -> dispatcher discoveries channel
    #[serde(rename = "discovery-queue-capacity")]
    pub discovery_queue_capacity: usize,

    /// Capacity of the workers -> dispatcher completions channel
    #[serde(rename = "completion-queue-capacity")]
    pub completion_queue_capacity: usize,

    /// Bodies smaller than this are implausible for an on-site page (bytes)
    #[serde(rename = "min-body-bytes")]
    pub min_body_bytes: usize,

    /// Largest in-site HTML body read for link extraction; the rest is ignored (bytes)
    #[serde(rename = "max-body-bytes")]
    pub max_body_bytes: usize,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum redirects the transport follows for one request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            work_queue_capacity: 1000,
            discovery_queue_capacity: 1000,
            completion_queue_capacity: 100,
            min_body_bytes: 32,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Skip-list entry: exactly one of `prefix` or `domain`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkipEntry {
    /// URL prefix (e.g., "mailto:" or "https://example.com/private/")
    pub prefix: Option<String>,

    /// Domain pattern (e.g., "example.com" or "*.example.com")
    pub domain: Option<String>,
}

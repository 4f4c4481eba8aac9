//! HTTP fetcher implementation
//!
//! This module performs one network round trip per work item and, only for
//! in-site HTML pages with a successful status, one parse pass. It handles:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Skip-list and scheme checks that avoid the network entirely
//! - Outcome classification into the status taxonomy
//! - Bounded body reads: only pages that will be parsed are read past the
//!   minimum body size
//! - Link extraction for pages the crawl should follow

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::parser::extract_links;
use crate::crawler::{DiscoveredLink, FetchOutcome, FetchedPage, WorkItem};
use crate::state::Status;
use crate::url::{is_asset_path, is_http_scheme, Site, SkipList};
use crate::FetchError;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, Response};
use std::future::Future;
use std::time::Duration;

/// Default cap on the HTML read for link extraction
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Media types parsed for links
const HTML_MEDIA_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Anything that can turn a work item into an outcome plus discovered links
///
/// The worker pool is generic over this so the crawl engine can run against
/// an in-memory site as well as the network.
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetches one work item. Never fails: every problem becomes an outcome.
    fn fetch(&self, item: &WorkItem) -> impl Future<Output = FetchedPage> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use linkcheck::config::{CrawlerConfig, UserAgentConfig};
/// use linkcheck::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default(), &UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(crawler.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches work items over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    site: Site,
    skip_list: SkipList,
    min_body_bytes: usize,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Creates a fetcher for the given site
    pub fn new(client: Client, site: Site, skip_list: SkipList, min_body_bytes: usize) -> Self {
        Self {
            client,
            site,
            skip_list,
            min_body_bytes,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Sets the largest HTML body read for link extraction
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Fetches a URL and classifies the result
    ///
    /// # Request Flow
    ///
    /// | Step | Condition | Outcome |
    /// |------|-----------|---------|
    /// | 1 | URL on skip list | 299, no request |
    /// | 2 | scheme not http(s) | 900, no request |
    /// | 3 | DNS/connect/TLS/timeout | 999 |
    /// | 4 | status outside 200-299 | literal status, body not read |
    /// | 5 | body below minimum, final URL in site | 888 |
    /// | 5 | body below minimum, final URL off site | 901, not an error |
    /// | 6 | URL or final URL off site | 901, not parsed |
    /// | 7 | asset extension or non-HTML content type | literal status, not parsed |
    /// | 8 | otherwise | literal status, links extracted |
    ///
    /// Only step 8 reads the body past `min_body_bytes`, and never past
    /// `max_body_bytes`. The response is owned by this function and released
    /// on every return.
    pub async fn fetch_url(&self, item: &WorkItem) -> FetchedPage {
        let url = &item.url;

        if self.skip_list.matches(url) {
            tracing::debug!("Skipping {} (skip list)", url);
            return FetchedPage::without_links(FetchOutcome::new(
                url.clone(),
                Status::Skipped,
                Some(FetchError::Skipped),
            ));
        }

        if !is_http_scheme(url) {
            return FetchedPage::without_links(FetchOutcome::new(
                url.clone(),
                Status::UnsupportedScheme,
                Some(FetchError::UnsupportedScheme {
                    scheme: url.scheme().to_string(),
                    referrer: item.referrer.clone(),
                }),
            ));
        }

        let mut response = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                return FetchedPage::without_links(transport_failure(url, &e));
            }
        };

        let status_code = response.status().as_u16();
        if !(200..=299).contains(&status_code) {
            return FetchedPage::without_links(FetchOutcome::new(
                url.clone(),
                Status::Http(status_code),
                Some(FetchError::NonSuccessStatus(status_code)),
            ));
        }

        let final_url = response.url().clone();
        let final_in_site = self.site.contains(&final_url);
        let in_site = final_in_site && self.site.contains(url);
        let parse = in_site && !is_asset_path(&final_url) && is_html_response(&response);

        let limit = if parse {
            self.max_body_bytes.max(self.min_body_bytes)
        } else {
            self.min_body_bytes
        };
        let (body, truncated) = match read_body(&mut response, limit).await {
            Ok(read) => read,
            Err(e) => {
                tracing::warn!("Failed to read body of {}: {}", url, e);
                return FetchedPage::without_links(transport_failure(url, &e));
            }
        };

        if body.len() < self.min_body_bytes {
            return FetchedPage::without_links(if final_in_site {
                FetchOutcome::new(
                    url.clone(),
                    Status::ContentTooSmall,
                    Some(FetchError::ContentTooSmall {
                        bytes: body.len(),
                        minimum: self.min_body_bytes,
                    }),
                )
            } else {
                tracing::debug!("Tiny off-site body from {}, treating as benign", final_url);
                FetchOutcome::new(url.clone(), Status::OffSite, None)
            });
        }

        if !in_site {
            let detail = (final_url != *url).then(|| FetchError::OffSiteRedirect {
                final_url: final_url.to_string(),
            });
            return FetchedPage::without_links(FetchOutcome::new(
                url.clone(),
                Status::OffSite,
                detail,
            ));
        }

        let outcome = FetchOutcome::success(url.clone(), status_code);
        if !parse {
            tracing::debug!("{} -> {} (not parsed)", url, status_code);
            return FetchedPage::without_links(outcome);
        }
        if truncated {
            tracing::warn!(
                "Only the first {} bytes of {} were scanned for links",
                limit,
                url
            );
        }

        let html = String::from_utf8_lossy(&body);
        let links = extract_links(&html, &final_url)
            .into_iter()
            .map(|target| DiscoveredLink {
                source_url: url.to_string(),
                target_url: target.to_string(),
            })
            .collect::<Vec<_>>();
        tracing::debug!("{} -> {} ({} links)", url, status_code, links.len());

        FetchedPage { outcome, links }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, item: &WorkItem) -> FetchedPage {
        self.fetch_url(item).await
    }
}

/// Returns true if the response declares an HTML media type, or none at all
fn is_html_response(response: &Response) -> bool {
    match response.headers().get(CONTENT_TYPE) {
        Some(value) => value.to_str().map(is_html_content_type).unwrap_or(false),
        None => true,
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    HTML_MEDIA_TYPES.contains(&media_type.as_str())
}

/// Reads at most `limit` bytes of the body
///
/// Returns the bytes read and whether more data was left unread.
async fn read_body(response: &mut Response, limit: usize) -> Result<(Vec<u8>, bool), reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit.saturating_sub(body.len());
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            return Ok((body, true));
        }
        body.extend_from_slice(&chunk);
    }
    Ok((body, false))
}

/// Classifies a reqwest failure as a transport error outcome
fn transport_failure(url: &url::Url, error: &reqwest::Error) -> FetchOutcome {
    let message = if error.is_timeout() {
        format!("request timeout: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_redirect() {
        format!("redirect error: {}", error)
    } else {
        error.to_string()
    };

    FetchOutcome::new(
        url.clone(),
        Status::TransportError,
        Some(FetchError::Transport(message)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn fetcher(skip_list: SkipList) -> HttpFetcher {
        let client =
            build_http_client(&CrawlerConfig::default(), &UserAgentConfig::default()).unwrap();
        let site = Site::from_seed(&Url::parse("https://example.com/").unwrap());
        HttpFetcher::new(client, site, skip_list, 32)
    }

    fn item(url: &str) -> WorkItem {
        WorkItem {
            referrer: "https://example.com/".to_string(),
            url: Url::parse(url).unwrap(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&CrawlerConfig::default(), &UserAgentConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_skip_list_wins_before_network() {
        let f = fetcher(SkipList::new().with_domain("unreachable.invalid"));
        let page = f.fetch(&item("https://unreachable.invalid/page")).await;

        assert_eq!(page.outcome.status, Status::Skipped);
        assert_eq!(page.outcome.error, Some(FetchError::Skipped));
        assert!(page.links.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let f = fetcher(SkipList::new());
        let page = f.fetch(&item("mailto:team@example.com")).await;

        assert_eq!(page.outcome.status, Status::UnsupportedScheme);
        assert_eq!(
            page.outcome.error,
            Some(FetchError::UnsupportedScheme {
                scheme: "mailto".to_string(),
                referrer: "https://example.com/".to_string(),
            })
        );
        assert_eq!(
            page.outcome.error.unwrap().to_string(),
            "mailto on page https://example.com/"
        );
    }

    #[test]
    fn test_html_content_types() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("Text/HTML"));
        assert!(is_html_content_type("application/xhtml+xml"));

        assert!(!is_html_content_type("application/octet-stream"));
        assert!(!is_html_content_type("text/plain"));
        assert!(!is_html_content_type("video/mp4"));
        assert!(!is_html_content_type(""));
    }

    #[tokio::test]
    async fn test_skip_list_applies_to_other_schemes() {
        let f = fetcher(SkipList::new().with_prefix("mailto:"));
        let page = f.fetch(&item("mailto:team@example.com")).await;
        assert_eq!(page.outcome.status, Status::Skipped);
    }
}

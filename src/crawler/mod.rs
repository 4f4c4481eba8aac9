//! Crawler module: the concurrent crawl engine
//!
//! This module contains:
//! - The frontier, which deduplicates URLs and keeps one record per URL
//! - The dispatcher, the single owner of the frontier and the termination detector
//! - The worker pool, a fixed number of tasks pulling work from a bounded queue
//! - The fetcher and HTML link extraction
//!
//! Components talk only through messages: workers send [`DiscoveredLink`]s and
//! [`FetchOutcome`]s to the dispatcher, the dispatcher sends [`WorkItem`]s to
//! the workers.

mod dispatcher;
mod fetcher;
mod frontier;
mod parser;
mod pool;

pub use dispatcher::{run_crawl, run_crawl_until, CrawlRun};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher, DEFAULT_MAX_BODY_BYTES};
pub use frontier::{AdmissionResult, Frontier, FrontierEntry};
pub use parser::extract_links;
pub use pool::WorkerPool;

use crate::state::Status;
use crate::FetchError;
use url::Url;

/// A link found on a parsed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// The page the link was found on
    pub source_url: String,
    /// The absolute link target, not yet normalized
    pub target_url: String,
}

/// A unit of work for the pool; `url` is normalized and deduplicated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub referrer: String,
    pub url: Url,
}

/// The classified result of fetching one work item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// The normalized URL from the work item
    pub url: Url,
    pub status: Status,
    pub error: Option<FetchError>,
}

impl FetchOutcome {
    pub fn new(url: Url, status: Status, error: Option<FetchError>) -> Self {
        Self { url, status, error }
    }

    /// A real HTTP status with no error attached
    pub fn success(url: Url, status_code: u16) -> Self {
        Self::new(url, Status::Http(status_code), None)
    }
}

/// Everything a fetch produces: the outcome plus links to crawl next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub outcome: FetchOutcome,
    pub links: Vec<DiscoveredLink>,
}

impl FetchedPage {
    pub fn without_links(outcome: FetchOutcome) -> Self {
        Self {
            outcome,
            links: Vec::new(),
        }
    }
}

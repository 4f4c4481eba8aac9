//! Linkcheck: a broken-link finder for a single website
//!
//! This crate crawls every resource reachable from a seed URL, fetches each
//! normalized URL exactly once with a fixed pool of workers, and reports the
//! outcomes that need a site maintainer's attention.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Errors raised by the crawl engine's own bookkeeping
#[derive(Debug, Error)]
pub enum LinkcheckError {
    #[error("No frontier entry for {url}")]
    UnknownEntry { url: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),
}

/// Why a single URL's fetch did not end in a plain success
///
/// These are recorded on the URL's frontier entry and printed in the report.
/// None of them aborts the crawl.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("failed to parse URL \"{url}\": {reason}")]
    UrlParse { url: String, reason: String },

    #[error("{scheme} on page {referrer}")]
    UnsupportedScheme { scheme: String, referrer: String },

    #[error("{0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    NonSuccessStatus(u16),

    #[error("response body is {bytes} bytes, expected at least {minimum}")]
    ContentTooSmall { bytes: usize, minimum: usize },

    #[error("redirected outside the site to {final_url}")]
    OffSiteRedirect { final_url: String },

    #[error("matched the skip list")]
    Skipped,
}

// Re-export commonly used types
pub use config::Config;
pub use state::Status;
pub use crate::url::{normalize_url, resolve_link, Site, SkipList};

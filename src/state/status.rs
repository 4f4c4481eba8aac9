//! Status taxonomy for checked URLs
//!
//! Real HTTP status codes are passed through unchanged. Outcomes that never
//! produced a usable HTTP status are given sentinel codes outside the ranges
//! a server would send for that situation.
use reqwest::StatusCode;
use std::fmt;

/// Code reported for an entry whose fetch has not completed
pub const UNINITIATED: u16 = 0;
/// Code reported for a URL that matched the skip list
pub const SKIPPED: u16 = 299;
/// Code reported for an on-site response with an implausibly small body
pub const CONTENT_TOO_SMALL: u16 = 888;
/// Code reported for a URL with a non-HTTP scheme
pub const UNSUPPORTED_SCHEME: u16 = 900;
/// Code reported for a URL that resolved outside the seed's site
pub const OFF_SITE: u16 = 901;
/// Code reported when no HTTP response was obtained
pub const TRANSPORT_ERROR: u16 = 999;

/// The recorded outcome class of a single URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    /// Entry created, fetch not yet completed
    #[default]
    Uninitiated,

    /// A real HTTP status code as returned by the server
    Http(u16),

    /// URL matched the configured skip list; no request was made
    Skipped,

    /// On-site response body below the minimum plausible size
    ContentTooSmall,

    /// Non-HTTP scheme such as `mailto:` or `irc:`
    UnsupportedScheme,

    /// Resolved outside the seed's site after redirects
    OffSite,

    /// DNS, connect, TLS, timeout or body read failure
    TransportError,
}

impl Status {
    /// Returns the numeric code used in reports and tallies
    pub fn code(&self) -> u16 {
        match self {
            Self::Uninitiated => UNINITIATED,
            Self::Http(code) => *code,
            Self::Skipped => SKIPPED,
            Self::ContentTooSmall => CONTENT_TOO_SMALL,
            Self::UnsupportedScheme => UNSUPPORTED_SCHEME,
            Self::OffSite => OFF_SITE,
            Self::TransportError => TRANSPORT_ERROR,
        }
    }

    /// Returns true once a fetch outcome has been recorded
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Uninitiated)
    }

    /// Returns true for a real 2xx response
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Http(code) if (200..=299).contains(code))
    }

    /// Returns true for outcomes that are neither checked nor broken
    pub fn is_benign_skip(&self) -> bool {
        matches!(self, Self::Skipped | Self::OffSite)
    }

    /// Returns true if this outcome counts towards the exit code
    pub fn is_error(&self) -> bool {
        match self {
            Self::Http(code) => !(200..=299).contains(code),
            Self::ContentTooSmall | Self::UnsupportedScheme | Self::TransportError => true,
            Self::Uninitiated | Self::Skipped | Self::OffSite => false,
        }
    }

    /// Short human-readable explanation for the final tally
    pub fn explanation(&self) -> &'static str {
        match self {
            Self::Uninitiated => "not checked (crawl interrupted)",
            Self::Skipped => "skipped (matched skip list)",
            Self::ContentTooSmall => "response body too small",
            Self::UnsupportedScheme => "unsupported URL scheme",
            Self::OffSite => "outside the site (links not followed)",
            Self::TransportError => "no response (DNS, connect, TLS or timeout)",
            Self::Http(code) => StatusCode::from_u16(*code)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("unknown HTTP status"),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

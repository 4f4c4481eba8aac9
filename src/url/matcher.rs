use crate::config::SkipEntry;
use url::Url;

/// URLs the crawl records as skipped without making a request
///
/// An entry matches either by URL prefix (`mailto:`, `https://example.com/private/`)
/// or by wildcard domain pattern (`example.com`, `*.example.com`).
#[derive(Debug, Clone, Default)]
pub struct SkipList {
    prefixes: Vec<String>,
    domains: Vec<String>,
}

impl SkipList {
    /// Creates an empty skip list
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a skip list from configuration entries plus extra prefixes
    pub fn from_entries<'a>(
        entries: &[SkipEntry],
        extra_prefixes: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut list = Self::new();
        for entry in entries {
            if let Some(prefix) = &entry.prefix {
                list = list.with_prefix(prefix);
            }
            if let Some(domain) = &entry.domain {
                list = list.with_domain(domain);
            }
        }
        for prefix in extra_prefixes {
            list = list.with_prefix(prefix);
        }
        list
    }

    /// Adds a URL prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefixes.push(prefix.to_string());
        self
    }

    /// Adds a domain pattern, optionally starting with `*.`
    pub fn with_domain(mut self, pattern: &str) -> Self {
        self.domains.push(pattern.to_lowercase());
        self
    }

    /// Returns true if nothing would ever match
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.domains.is_empty()
    }

    /// Checks whether a URL is on the skip list
    pub fn matches(&self, url: &Url) -> bool {
        if self.prefixes.iter().any(|p| url.as_str().starts_with(p)) {
            return true;
        }

        match url.host_str() {
            Some(host) => {
                let host = host.to_lowercase();
                self.domains.iter().any(|p| matches_wildcard(p, &host))
            }
            None => false,
        }
    }
}

/// Checks if a domain matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches:
///    - "example.com" (the bare domain)
///    - "blog.example.com" (single subdomain)
///    - "api.v2.example.com" (nested subdomains)
///
/// # Examples
///
/// ```
/// use linkcheck::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(!matches_wildcard("example.com", "other.com"));
///
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
/// assert!(!matches_wildcard("*.example.com", "example.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

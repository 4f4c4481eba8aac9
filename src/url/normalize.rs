use crate::UrlError;
use url::Url;

/// Normalizes a URL into its crawl identity
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Remove the query string
/// 3. Remove the fragment
///
/// The scheme is not checked here: `mailto:` and friends are admitted like any
/// other resource so the fetcher can record them with their own status.
///
/// Two URLs that normalize to the same string are the same resource.
///
/// # Examples
///
/// ```
/// use linkcheck::url::normalize_url;
///
/// let url = normalize_url("https://example.com/page?id=3#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    strip_identity_noise(&mut url);
    Ok(url)
}

/// Resolves a link against the page's current base and returns it absolute
///
/// Absolute links are returned as-is; relative links are joined onto `base`.
pub fn resolve_link(base: &Url, href: &str) -> Result<Url, UrlError> {
    base.join(href.trim())
        .map_err(|e| UrlError::Parse(e.to_string()))
}

/// Normalizes an already parsed URL in place
pub(crate) fn strip_identity_noise(url: &mut Url) {
    url.set_query(None);
    url.set_fragment(None);
}

//! URL handling module for Linkcheck
//!
//! This module provides URL normalization, link resolution, the seed site
//! scope, and skip-list matching.

mod matcher;
mod normalize;
mod site;

pub use matcher::{matches_wildcard, SkipList};
pub use normalize::{normalize_url, resolve_link};
pub use site::Site;

/// Schemes the fetcher will make a request for
pub const HTTP_SCHEMES: &[&str] = &["http", "https"];

/// Returns true if the URL uses a scheme the fetcher can request
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkcheck::url::is_http_scheme;
///
/// assert!(is_http_scheme(&Url::parse("https://example.com/").unwrap()));
/// assert!(!is_http_scheme(&Url::parse("mailto:a@example.com").unwrap()));
/// ```
pub fn is_http_scheme(url: &::url::Url) -> bool {
    HTTP_SCHEMES.contains(&url.scheme())
}

/// File extensions that mark a resource as a non-HTML asset
const ASSET_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "bmp", "avif",
    // scripts and stylesheets
    "js", "mjs", "css",
    // fonts
    "woff", "woff2", "ttf", "otf", "eot",
    // documents and archives
    "pdf", "zip", "gz",
];

/// Returns true if the URL's path suggests a non-HTML asset
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkcheck::url::is_asset_path;
///
/// assert!(is_asset_path(&Url::parse("https://example.com/logo.PNG").unwrap()));
/// assert!(!is_asset_path(&Url::parse("https://example.com/about").unwrap()));
/// ```
pub fn is_asset_path(url: &::url::Url) -> bool {
    let last_segment = url.path().rsplit('/').next().unwrap_or("");
    match last_segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            ASSET_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

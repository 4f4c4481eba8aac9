//! HTML link extraction
//!
//! Tags are visited in document order:
//! - `<base href>` replaces the resolution base for every later tag on the page
//! - `<a href>` and `<link href>` contribute their `href`
//! - `<img src>` and `<script src>` contribute their `src`
//!
//! The HTML parser never fails; malformed or truncated markup simply yields
//! the links found before the damage.

use crate::url::resolve_link;
use scraper::{Html, Selector};
use url::Url;

/// Tags that can carry a link or change the base, in one selector so matches
/// come back in document order
const LINK_TAGS: &str = "base[href], a[href], link[href], img[src], script[src]";

/// Extracts every link on a page as absolute URLs
///
/// Candidates that fail to resolve are logged and skipped.
///
/// # Example
///
/// ```
/// use linkcheck::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/about">About</a><img src="logo.png">"#;
/// let page = Url::parse("https://example.com/docs/").unwrap();
/// let links = extract_links(html, &page);
/// assert_eq!(links[0].as_str(), "https://example.com/about");
/// assert_eq!(links[1].as_str(), "https://example.com/docs/logo.png");
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse(LINK_TAGS) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Invalid link selector: {:?}", e);
            return Vec::new();
        }
    };

    let mut base = page_url.clone();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let tag = element.value().name();
        let attr = match tag {
            "base" | "a" | "link" => "href",
            "img" | "script" => "src",
            _ => continue,
        };
        let Some(value) = element.value().attr(attr) else {
            continue;
        };

        match resolve_link(&base, value) {
            Ok(resolved) if tag == "base" => {
                tracing::trace!("Base for {} is now {}", page_url, resolved);
                base = resolved;
            }
            Ok(resolved) => links.push(resolved),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unparsable {} \"{}\" on {}: {}",
                    attr,
                    value,
                    page_url,
                    e
                );
            }
        }
    }

    links
}

use crate::url::normalize::strip_identity_noise;
use url::Url;

/// The site under test, derived from the seed URL
///
/// The site is identified by a prefix: the normalized seed truncated after its
/// last `/`. A URL belongs to the site when its normalized form starts with
/// that prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    prefix: String,
}

impl Site {
    /// Derives the site from a seed URL
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use linkcheck::url::Site;
    ///
    /// let seed = Url::parse("https://example.com/docs/index.html").unwrap();
    /// let site = Site::from_seed(&seed);
    /// assert_eq!(site.prefix(), "https://example.com/docs/");
    /// ```
    pub fn from_seed(seed: &Url) -> Self {
        let mut normalized = seed.clone();
        strip_identity_noise(&mut normalized);

        let full = normalized.as_str();
        // Without query and fragment the serialization ends with the path
        let path_start = full.len() - normalized.path().len();
        let prefix = match full.rfind('/') {
            Some(idx) if idx >= path_start => full[..=idx].to_string(),
            _ => full.to_string(),
        };

        Self { prefix }
    }

    /// Returns the prefix every in-site URL starts with
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Checks whether a URL lies within the site
    pub fn contains(&self, url: &Url) -> bool {
        let mut normalized = url.clone();
        strip_identity_noise(&mut normalized);
        normalized.as_str().starts_with(&self.prefix)
    }
}

//! The deduplicating URL registry
//!
//! The frontier holds exactly one [`FrontierEntry`] per normalized URL for the
//! lifetime of a crawl. Entries are created on first discovery, updated on
//! rediscovery and when their fetch completes, and never removed. Only the
//! dispatcher loop mutates the frontier, so admission needs no locking.

use crate::crawler::FetchOutcome;
use crate::state::Status;
use crate::{FetchError, LinkcheckError};
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// The permanent record for one normalized URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized URL
    pub url: String,

    /// Outcome of the fetch, `Uninitiated` until it completes
    pub status: Status,

    /// Error detail recorded with the outcome
    pub last_error: Option<FetchError>,

    /// Referring page URL -> number of times it linked here
    pub referrers: BTreeMap<String, u32>,

    /// Total number of discovery events for this URL
    pub discovery_count: u32,
}

impl FrontierEntry {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            status: Status::Uninitiated,
            last_error: None,
            referrers: BTreeMap::new(),
            discovery_count: 0,
        }
    }

    fn count_discovery(&mut self, referrer: &str) {
        self.discovery_count += 1;
        *self.referrers.entry(referrer.to_string()).or_insert(0) += 1;
    }
}

/// Result of offering a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionResult {
    /// True only for the first discovery of the URL
    pub is_new: bool,
}

/// The deduplicating URL registry
#[derive(Debug, Default)]
pub struct Frontier {
    entries: HashMap<String, FrontierEntry>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a discovery of `url` from `referrer`
    ///
    /// The first discovery creates the entry and reports `is_new`; every
    /// discovery, including the first, bumps the discovery and referrer
    /// counters. Counters stay live after the fetch has completed.
    pub fn admit(&mut self, referrer: &str, url: &Url) -> AdmissionResult {
        let key = url.as_str();
        let mut is_new = false;
        let entry = self.entries.entry(key.to_string()).or_insert_with(|| {
            is_new = true;
            FrontierEntry::new(key)
        });
        entry.count_discovery(referrer);

        AdmissionResult { is_new }
    }

    /// Stores a completed fetch outcome on its existing entry
    ///
    /// # Errors
    ///
    /// Returns `LinkcheckError::UnknownEntry` if the URL was never admitted,
    /// which means a fetch was dispatched without going through the frontier.
    pub fn record_outcome(&mut self, outcome: FetchOutcome) -> Result<(), LinkcheckError> {
        let entry = self
            .entries
            .get_mut(outcome.url.as_str())
            .ok_or_else(|| LinkcheckError::UnknownEntry {
                url: outcome.url.to_string(),
            })?;

        entry.status = outcome.status;
        entry.last_error = outcome.error;
        Ok(())
    }

    /// Looks up the entry for a normalized URL
    pub fn get(&self, url: &str) -> Option<&FrontierEntry> {
        self.entries.get(url)
    }

    /// Number of distinct URLs seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was ever admitted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in no particular order
    pub fn entries(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.entries.values()
    }

    /// Consumes the frontier, returning its entries sorted by URL
    pub fn into_sorted_entries(self) -> Vec<FrontierEntry> {
        let mut entries: Vec<_> = self.entries.into_values().collect();
        entries.sort_by(|a, b| a.url.cmp(&b.url));
        entries
    }
}

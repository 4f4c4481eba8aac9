//! Outcome statistics for a finished crawl
//!
//! Groups every frontier entry by its status code and counts the errors that
//! make up the process exit code.

use crate::crawler::FrontierEntry;
use crate::state::Status;
use std::collections::BTreeMap;

/// One line of the final tally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyRow {
    pub status: Status,
    pub count: u64,
}

impl TallyRow {
    pub fn code(&self) -> u16 {
        self.status.code()
    }

    pub fn explanation(&self) -> &'static str {
        self.status.explanation()
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Total number of distinct URLs seen
    pub total_urls: u64,

    /// Status code -> entries with that code
    pub by_code: BTreeMap<u16, TallyRow>,

    /// Entries whose outcome counts as an error
    pub errors: u64,

    /// Sum of discovery events over all entries
    pub total_links: u64,
}

impl CrawlStatistics {
    /// Computes statistics over a set of frontier entries
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a FrontierEntry>) -> Self {
        let mut stats = Self::default();

        for entry in entries {
            stats.total_urls += 1;
            stats.total_links += u64::from(entry.discovery_count);
            if entry.status.is_error() {
                stats.errors += 1;
            }

            stats
                .by_code
                .entry(entry.status.code())
                .or_insert(TallyRow {
                    status: entry.status,
                    count: 0,
                })
                .count += 1;
        }

        stats
    }

    /// Tally rows in ascending code order
    pub fn tally(&self) -> impl Iterator<Item = &TallyRow> {
        self.by_code.values()
    }

    /// Number of entries with the given code
    pub fn count_for(&self, code: u16) -> u64 {
        self.by_code.get(&code).map(|row| row.count).unwrap_or(0)
    }

    /// Entries that never completed, non-zero only for an interrupted crawl
    pub fn unchecked(&self) -> u64 {
        self.count_for(Status::Uninitiated.code())
    }
}

//! The end-of-crawl report
//!
//! Built from the frontier once the crawl has stopped. Lists every entry whose
//! outcome is an error together with who linked to it, then a tally of all
//! outcomes by status code.

use crate::crawler::{CrawlRun, Frontier, FrontierEntry};
use crate::output::stats::CrawlStatistics;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Highest exit code used for an error count; 255 is reserved for usage errors
pub const MAX_ERROR_EXIT_CODE: u64 = 254;

/// Referrer label printed for the seed
const SEED_REFERRER: &str = "(seed)";

/// A finished crawl, ready to render
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub seed: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config_hash: Option<String>,
    pub cancelled: bool,

    /// All entries sorted by URL
    pub entries: Vec<FrontierEntry>,

    pub stats: CrawlStatistics,
}

impl CrawlReport {
    /// Builds a report from a frontier snapshot
    pub fn from_frontier(
        seed: &str,
        frontier: Frontier,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        config_hash: Option<String>,
        cancelled: bool,
    ) -> Self {
        let entries = frontier.into_sorted_entries();
        let stats = CrawlStatistics::from_entries(&entries);

        Self {
            seed: seed.to_string(),
            started_at,
            finished_at,
            config_hash,
            cancelled,
            entries,
            stats,
        }
    }

    /// Builds a report from a finished crawl run
    pub fn from_run(run: CrawlRun, config_hash: Option<String>) -> Self {
        Self::from_frontier(
            &run.seed,
            run.frontier,
            run.started_at,
            run.finished_at,
            config_hash,
            run.cancelled,
        )
    }

    /// Entries whose outcome counts as an error, sorted by URL
    pub fn error_entries(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.entries.iter().filter(|e| e.status.is_error())
    }

    pub fn error_count(&self) -> u64 {
        self.stats.errors
    }

    /// The process exit code: the error count, clamped to fit
    pub fn exit_code(&self) -> i32 {
        self.error_count().min(MAX_ERROR_EXIT_CODE) as i32
    }

    /// Wall-clock duration in seconds
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Renders the plain-text report printed to stdout
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Checked {}", self.seed);
        let _ = writeln!(
            out,
            "Started {}, took {:.1}s",
            self.started_at.to_rfc3339(),
            self.duration_secs()
        );
        if let Some(hash) = &self.config_hash {
            let _ = writeln!(out, "Config {}", hash);
        }
        if self.cancelled {
            let _ = writeln!(
                out,
                "Crawl interrupted: {} urls were not checked",
                self.stats.unchecked()
            );
        }
        out.push('\n');

        for entry in self.error_entries() {
            let _ = writeln!(
                out,
                " - {} ({}): {}",
                entry.status, entry.discovery_count, entry.url
            );
            if let Some(error) = &entry.last_error {
                let _ = writeln!(out, "\t{}", error);
            }
            for (referrer, count) in &entry.referrers {
                let _ = writeln!(out, "\t\t{} times from {}", count, referrer_label(referrer));
            }
        }

        let _ = writeln!(out, "\nFound {} unique urls", self.stats.total_urls);
        for row in self.stats.tally() {
            let _ = writeln!(
                out,
                "Status {} : {} ({})",
                row.code(),
                row.count,
                row.explanation()
            );
        }
        let _ = writeln!(out, "Errors: {}", self.error_count());

        out
    }
}

/// Display form of a referrer key
pub(crate) fn referrer_label(referrer: &str) -> &str {
    if referrer.is_empty() {
        SEED_REFERRER
    } else {
        referrer
    }
}

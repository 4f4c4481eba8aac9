//! Output module for rendering crawl results
//!
//! This module handles:
//! - Grouping outcomes by status code and counting errors
//! - The plain-text report printed when a crawl ends
//! - An optional Markdown summary file

mod markdown;
mod report;
pub mod stats;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::{CrawlReport, MAX_ERROR_EXIT_CODE};
pub use stats::{CrawlStatistics, TallyRow};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

//! Markdown summary generation
//!
//! Writes the same content as the text report as a Markdown document, for
//! attaching to CI runs or issue trackers.

use crate::output::report::{referrer_label, CrawlReport};
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the Markdown form of a report to `output_path`
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Link Check Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        report.duration_secs()
    ));
    md.push_str(&format!(
        "- **Status**: {}\n",
        if report.cancelled {
            "interrupted"
        } else {
            "completed"
        }
    ));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Unique URLs**: {}\n", report.stats.total_urls));
    md.push_str(&format!("- **Links Followed**: {}\n", report.stats.total_links));
    md.push_str(&format!("- **Errors**: {}\n\n", report.error_count()));

    // Status breakdown
    md.push_str("## Status Breakdown\n\n");
    md.push_str("| Status | Count | Meaning |\n");
    md.push_str("|--------|-------|---------|\n");
    for row in report.stats.tally() {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            row.code(),
            row.count,
            row.explanation()
        ));
    }
    md.push('\n');

    // Broken links
    if report.error_count() > 0 {
        md.push_str("## Broken Links\n\n");
        for entry in report.error_entries() {
            md.push_str(&format!(
                "### {} `{}`\n\n",
                entry.status,
                escape_code_span(&entry.url)
            ));
            if let Some(error) = &entry.last_error {
                md.push_str(&format!("{}\n\n", error));
            }
            md.push_str("| Linked From | Times |\n");
            md.push_str("|-------------|-------|\n");
            for (referrer, count) in &entry.referrers {
                md.push_str(&format!(
                    "| {} | {} |\n",
                    escape_table_cell(referrer_label(referrer)),
                    count
                ));
            }
            md.push('\n');
        }
    }

    md
}

fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

fn escape_code_span(s: &str) -> String {
    s.replace('`', "'")
}

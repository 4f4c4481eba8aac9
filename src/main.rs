//! Linkcheck main entry point
//!
//! This is the command-line interface for the Linkcheck broken-link finder.
//! The report goes to stdout, logs go to stderr, and the exit code is the
//! number of broken links found.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use linkcheck::config::{load_config_with_hash, validate, Config};
use linkcheck::crawler::{build_http_client, run_crawl_until, Frontier, HttpFetcher};
use linkcheck::output::{write_markdown_report, CrawlReport};
use linkcheck::url::{normalize_url, Site, SkipList};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exit code for command-line usage errors
const USAGE_EXIT_CODE: i32 = 255;

/// Linkcheck: finds broken links on a website
///
/// Crawls every page under the seed URL, checks every link and resource
/// those pages reference, and exits with the number of errors found.
#[derive(Parser, Debug)]
#[command(name = "linkcheck")]
#[command(version)]
#[command(about = "Finds broken links on a website", long_about = None)]
struct Cli {
    /// Seed URL; pages under its directory are crawled
    #[arg(value_name = "SEED", env = "LINKCHECK_SEED")]
    seed: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of concurrent fetch workers
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Skip URLs starting with this prefix (repeatable)
    #[arg(short, long = "skip", value_name = "PREFIX")]
    skip: Vec<String>,

    /// Also write a Markdown summary to this file
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { USAGE_EXIT_CODE } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    setup_logging(cli.verbose, cli.quiet);

    let Some(seed) = cli.seed.clone() else {
        eprintln!("error: no seed URL given (pass SEED or set LINKCHECK_SEED)");
        std::process::exit(USAGE_EXIT_CODE);
    };

    let code = match run(cli, seed) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            USAGE_EXIT_CODE
        }
    };
    std::process::exit(code);
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkcheck=info,warn"),
            1 => EnvFilter::new("linkcheck=debug,info"),
            _ => EnvFilter::new("linkcheck=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads configuration, applies command-line overrides and validates the result
fn load_settings(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    validate(&config).context("invalid settings")?;

    Ok((config, hash))
}

/// Runs one crawl and returns the process exit code
fn run(cli: Cli, seed: String) -> anyhow::Result<i32> {
    let (config, config_hash) = load_settings(&cli)?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let report = runtime.block_on(check_site(&config, &cli.skip, &seed, config_hash))?;

    print!("{}", report.render_text());

    if let Some(path) = &cli.summary {
        write_markdown_report(&report, path)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        tracing::info!("Summary written to {}", path.display());
    }

    Ok(report.exit_code())
}

/// Crawls the site under `seed` until done or interrupted with Ctrl-C
async fn check_site(
    config: &Config,
    extra_skips: &[String],
    seed: &str,
    config_hash: Option<String>,
) -> anyhow::Result<CrawlReport> {
    let seed_url = match normalize_url(seed) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Seed {} is not a usable URL: {}", seed, e);
            let now = Utc::now();
            return Ok(CrawlReport::from_frontier(
                seed,
                Frontier::new(),
                now,
                now,
                config_hash,
                false,
            ));
        }
    };

    let site = Site::from_seed(&seed_url);
    tracing::info!("Checking pages under {}", site.prefix());

    let skip_list = SkipList::from_entries(&config.skip, extra_skips.iter().map(String::as_str));
    let client = build_http_client(&config.crawler, &config.user_agent)
        .context("failed to build HTTP client")?;
    let fetcher = HttpFetcher::new(client, site, skip_list, config.crawler.min_body_bytes)
        .with_max_body_bytes(config.crawler.max_body_bytes);

    let interrupted = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Ctrl-C handler unavailable, crawl cannot be interrupted");
            std::future::pending::<()>().await;
        }
    };

    let run = run_crawl_until(seed, Arc::new(fetcher), &config.crawler, interrupted).await;
    Ok(CrawlReport::from_run(run, config_hash))
}

//! Dispatcher and termination detection
//!
//! The dispatcher is the only code that touches the frontier. It runs a single
//! event loop that:
//! - admits discovered links into the frontier and queues new URLs as work
//! - records completed fetches on their frontier entries
//! - feeds queued work to the pool without ever blocking on it
//!
//! `in_flight` counts URLs admitted but not yet completed. The crawl is over
//! when both inbound channels have been drained and `in_flight` is zero.
//! Workers send a page's links before its outcome, so a zero count observed
//! after draining cannot miss links still in transit.

use crate::config::CrawlerConfig;
use crate::crawler::{
    DiscoveredLink, FetchOutcome, Frontier, PageFetcher, WorkItem, WorkerPool,
};
use crate::url::normalize_url;
use crate::FetchError;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Completed fetches between progress log lines
const PROGRESS_INTERVAL: usize = 50;

/// The result of one crawl: the final frontier plus run metadata
#[derive(Debug)]
pub struct CrawlRun {
    /// The seed as given
    pub seed: String,

    /// Every URL seen, with its outcome
    pub frontier: Frontier,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// True if the crawl was stopped before reaching quiescence
    pub cancelled: bool,
}

/// Crawls from `seed` until no work remains
///
/// An unparsable seed is not an error: the crawl ends at once with an empty
/// frontier.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use linkcheck::config::Config;
/// use linkcheck::crawler::{build_http_client, run_crawl, HttpFetcher};
/// use linkcheck::url::{Site, SkipList};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let seed = url::Url::parse("https://example.com/")?;
/// let client = build_http_client(&config.crawler, &config.user_agent)?;
/// let fetcher = HttpFetcher::new(client, Site::from_seed(&seed), SkipList::new(), 32);
///
/// let run = run_crawl(seed.as_str(), Arc::new(fetcher), &config.crawler).await;
/// println!("{} unique urls", run.frontier.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl<F: PageFetcher>(
    seed: &str,
    fetcher: Arc<F>,
    config: &CrawlerConfig,
) -> CrawlRun {
    run_crawl_until(seed, fetcher, config, std::future::pending()).await
}

/// Crawls from `seed` until no work remains or `shutdown` resolves
///
/// On shutdown, in-progress requests are abandoned and their entries stay
/// `Uninitiated`.
pub async fn run_crawl_until<F, S>(
    seed: &str,
    fetcher: Arc<F>,
    config: &CrawlerConfig,
    shutdown: S,
) -> CrawlRun
where
    F: PageFetcher,
    S: Future<Output = ()>,
{
    let started_at = Utc::now();
    tracing::info!("Starting crawl of {} with {} workers", seed, config.workers);

    let (work_tx, work_rx) = mpsc::channel(config.work_queue_capacity);
    let (disc_tx, mut disc_rx) = mpsc::channel(config.discovery_queue_capacity);
    let (done_tx, mut done_rx) = mpsc::channel(config.completion_queue_capacity);
    let mut pool = WorkerPool::spawn(config.workers, fetcher, work_rx, disc_tx, done_tx);

    let mut dispatcher = Dispatcher::new();
    dispatcher.admit(DiscoveredLink {
        source_url: String::new(),
        target_url: seed.to_string(),
    });

    tokio::pin!(shutdown);
    let mut cancelled = false;

    loop {
        dispatcher.drain(&mut disc_rx, &mut done_rx);
        if dispatcher.in_flight == 0 {
            break;
        }
        if !dispatcher.flush_pending(&work_tx) {
            tracing::error!("Work queue closed with {} URLs in flight", dispatcher.in_flight);
            cancelled = true;
            break;
        }

        tokio::select! {
            biased;

            _ = &mut shutdown => {
                tracing::warn!("Crawl interrupted with {} URLs in flight", dispatcher.in_flight);
                cancelled = true;
                break;
            }

            link = disc_rx.recv() => match link {
                Some(link) => dispatcher.admit(link),
                None => {
                    tracing::error!("All workers hung up");
                    cancelled = true;
                    break;
                }
            },

            outcome = done_rx.recv() => match outcome {
                Some(outcome) => dispatcher.complete(outcome),
                None => {
                    tracing::error!("All workers hung up");
                    cancelled = true;
                    break;
                }
            },

            permit = work_tx.reserve(), if !dispatcher.pending.is_empty() => match permit {
                Ok(permit) => {
                    if let Some(item) = dispatcher.pending.pop_front() {
                        permit.send(item);
                    }
                }
                Err(_) => {
                    tracing::error!("Work queue closed with {} URLs in flight", dispatcher.in_flight);
                    cancelled = true;
                    break;
                }
            },

            exited = pool.join_next(), if !pool.is_empty() => {
                if let Some(Err(e)) = exited {
                    tracing::error!("Worker failed mid-crawl: {}", e);
                } else {
                    tracing::error!("Worker exited mid-crawl");
                }
                cancelled = true;
                break;
            }
        }
    }

    drop(work_tx);
    if cancelled {
        pool.abort().await;
    } else {
        pool.join().await;
    }

    let finished_at = Utc::now();
    tracing::info!(
        "Crawl finished: {} unique URLs, {} fetched in {:.1}s",
        dispatcher.frontier.len(),
        dispatcher.completed,
        (finished_at - started_at).num_milliseconds() as f64 / 1000.0
    );

    CrawlRun {
        seed: seed.to_string(),
        frontier: dispatcher.frontier,
        started_at,
        finished_at,
        cancelled,
    }
}

/// Single-writer state of the event loop
struct Dispatcher {
    frontier: Frontier,
    /// Admitted work not yet accepted by the work queue
    pending: VecDeque<WorkItem>,
    in_flight: usize,
    completed: usize,
}

impl Dispatcher {
    fn new() -> Self {
        Self {
            frontier: Frontier::new(),
            pending: VecDeque::new(),
            in_flight: 0,
            completed: 0,
        }
    }

    /// Normalizes and registers a discovered link, queueing it if new
    fn admit(&mut self, link: DiscoveredLink) {
        let url = match normalize_url(&link.target_url) {
            Ok(url) => url,
            Err(e) => {
                let error = FetchError::UrlParse {
                    url: link.target_url,
                    reason: e.to_string(),
                };
                tracing::warn!("Dropping link from {}: {}", link.source_url, error);
                return;
            }
        };

        if self.frontier.admit(&link.source_url, &url).is_new {
            tracing::trace!("Admitted {}", url);
            self.in_flight += 1;
            self.pending.push_back(WorkItem {
                referrer: link.source_url,
                url,
            });
        }
    }

    /// Records a finished fetch and retires it from the in-flight count
    fn complete(&mut self, outcome: FetchOutcome) {
        tracing::debug!("{} {}", outcome.status, outcome.url);
        if let Err(e) = self.frontier.record_outcome(outcome) {
            tracing::error!("{}", e);
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        self.completed += 1;

        if self.completed % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {} fetched, {} in flight, {} unique URLs",
                self.completed,
                self.in_flight,
                self.frontier.len()
            );
        }
    }

    /// Processes every message already waiting on either channel
    ///
    /// Returns only after a pass in which both channels were empty.
    fn drain(
        &mut self,
        disc_rx: &mut mpsc::Receiver<DiscoveredLink>,
        done_rx: &mut mpsc::Receiver<FetchOutcome>,
    ) {
        loop {
            let mut progressed = false;
            while let Ok(link) = disc_rx.try_recv() {
                self.admit(link);
                progressed = true;
            }
            while let Ok(outcome) = done_rx.try_recv() {
                self.complete(outcome);
                progressed = true;
            }
            if !progressed {
                return;
            }
        }
    }

    /// Moves pending work into the queue until it is full
    ///
    /// Never waits. Returns false if the queue has been closed.
    fn flush_pending(&mut self, work_tx: &mpsc::Sender<WorkItem>) -> bool {
        while !self.pending.is_empty() {
            match work_tx.try_reserve() {
                Ok(permit) => {
                    if let Some(item) = self.pending.pop_front() {
                        permit.send(item);
                    }
                }
                Err(TrySendError::Full(())) => break,
                Err(TrySendError::Closed(())) => return false,
            }
        }
        true
    }
}

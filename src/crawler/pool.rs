//! Fixed-size worker pool
//!
//! Every worker loops: take a work item from the shared queue, fetch it, send
//! the discovered links and then the outcome back to the dispatcher. Links go
//! first so that by the time the dispatcher counts a fetch as complete, every
//! link it produced is already waiting in the discoveries channel.

use crate::crawler::{DiscoveredLink, FetchOutcome, PageFetcher, WorkItem};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// A fixed number of interchangeable fetch workers
pub struct WorkerPool {
    workers: JoinSet<()>,
}

impl WorkerPool {
    /// Spawns `size` workers sharing one work queue
    ///
    /// Workers exit when the work queue is closed and drained, or when the
    /// dispatcher stops listening.
    pub fn spawn<F: PageFetcher>(
        size: usize,
        fetcher: Arc<F>,
        work_rx: mpsc::Receiver<WorkItem>,
        discoveries: mpsc::Sender<DiscoveredLink>,
        completions: mpsc::Sender<FetchOutcome>,
    ) -> Self {
        let work_rx = Arc::new(Mutex::new(work_rx));
        let mut workers = JoinSet::new();

        for id in 0..size {
            workers.spawn(worker_loop(
                id,
                Arc::clone(&fetcher),
                Arc::clone(&work_rx),
                discoveries.clone(),
                completions.clone(),
            ));
        }

        tracing::debug!("Spawned {} workers", size);
        Self { workers }
    }

    /// Number of workers still running
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Returns true once every worker has been joined
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Waits for the next worker to exit, returning `None` if none are left
    pub async fn join_next(&mut self) -> Option<Result<(), tokio::task::JoinError>> {
        self.workers.join_next().await
    }

    /// Waits for every worker to exit
    ///
    /// Call after closing the work queue. A panicked worker is logged.
    pub async fn join(mut self) {
        while let Some(result) = self.workers.join_next().await {
            if let Err(e) = result {
                tracing::error!("Worker task failed: {}", e);
            }
        }
    }

    /// Cancels every worker, including ones in the middle of a request
    pub async fn abort(mut self) {
        self.workers.shutdown().await;
    }
}

async fn worker_loop<F: PageFetcher>(
    id: usize,
    fetcher: Arc<F>,
    work_rx: Arc<Mutex<mpsc::Receiver<WorkItem>>>,
    discoveries: mpsc::Sender<DiscoveredLink>,
    completions: mpsc::Sender<FetchOutcome>,
) {
    loop {
        // Only the receive happens under the lock, never the fetch
        let next = work_rx.lock().await.recv().await;
        let Some(item) = next else {
            break;
        };

        tracing::trace!("Worker {} fetching {}", id, item.url);
        let page = fetcher.fetch(&item).await;

        for link in page.links {
            if discoveries.send(link).await.is_err() {
                return;
            }
        }
        if completions.send(page.outcome).await.is_err() {
            return;
        }
    }
    tracing::trace!("Worker {} exiting", id);
}

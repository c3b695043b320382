//! Worker pool and single-writer result aggregation.
//!
//! A [`DownloadManager`] owns three pieces of concurrency:
//!
//! - a bounded submission queue feeding a pool of worker tasks,
//! - the worker tasks, each fetching one item at a time,
//! - one aggregation task, the only code that writes the [`Registry`].
//!
//! Producers call [`DownloadManager::submit`]; items whose identity is
//! already recorded (or currently queued) are dropped without fetching.
//! [`DownloadManager::close`] drains everything that was accepted and
//! flushes the registry before returning.
//!
//! # Example
//!
//! ```no_run
//! use errdownload_core::download::DownloadManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut manager = DownloadManager::open("downloaded.csv")?;
//! manager.start(4)?;
//! // manager.submit(item).await?;
//! let summary = manager.close().await?;
//! println!("succeeded: {}, failed: {}", summary.succeeded, summary.failed);
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;

use dashmap::DashSet;
use futures_util::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::error::ManagerError;
use super::result::FetchResult;
use super::stats::{DownloadStats, RunSummary};
use crate::item::{FetchError, WorkItem};
use crate::registry::{Registry, RegistryIndex};

/// Minimum allowed worker count.
pub const MIN_WORKERS: usize = 1;

/// Maximum allowed worker count.
pub const MAX_WORKERS: usize = 100;

/// Default worker count if not specified.
pub const DEFAULT_WORKERS: usize = 1;

/// Capacity of the submission queue. Producers block once it is full.
const SUBMISSION_QUEUE_CAPACITY: usize = 1;

/// Capacity of the result stream between workers and the aggregator.
const RESULT_QUEUE_CAPACITY: usize = 1;

type BoxedItem = Box<dyn WorkItem>;
type SharedQueue = Arc<Mutex<mpsc::Receiver<BoxedItem>>>;

/// What happened to a submitted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted into the submission queue.
    Queued,
    /// Identity is already in the registry; nothing was queued.
    AlreadyDownloaded,
    /// Identity is queued or being fetched right now; nothing was queued.
    AlreadyQueued,
}

/// Concurrent fetch orchestration backed by a persistent registry.
///
/// Must be created inside a Tokio runtime. Producers must not submit
/// before [`start`](Self::start): with no workers the queue fills and
/// `submit` waits indefinitely.
pub struct DownloadManager {
    submissions: mpsc::Sender<BoxedItem>,
    queue: SharedQueue,
    results: mpsc::Sender<FetchResult>,
    index: RegistryIndex,
    in_flight: Arc<DashSet<String>>,
    stats: Arc<DownloadStats>,
    workers: Vec<JoinHandle<()>>,
    aggregator: JoinHandle<Registry>,
}

impl std::fmt::Debug for DownloadManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadManager")
            .field("workers", &self.workers.len())
            .field("recorded", &self.index.len())
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl DownloadManager {
    /// Opens the registry at `path` and spawns the aggregation task.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Registry`] if the registry cannot be opened.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ManagerError> {
        let registry = Registry::open(path)?;
        Ok(Self::with_registry(registry))
    }

    /// Builds a manager around an already opened registry.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn with_registry(registry: Registry) -> Self {
        let (submissions, queue) = mpsc::channel(SUBMISSION_QUEUE_CAPACITY);
        let (results, result_rx) = mpsc::channel(RESULT_QUEUE_CAPACITY);
        let index = registry.index();
        let in_flight = Arc::new(DashSet::new());
        let stats = Arc::new(DownloadStats::new());

        debug!(path = %registry.path().display(), "starting result aggregation");

        let aggregator = {
            let in_flight = Arc::clone(&in_flight);
            let stats = Arc::clone(&stats);
            tokio::task::spawn_blocking(move || aggregate(result_rx, registry, &in_flight, &stats))
        };

        Self {
            submissions,
            queue: Arc::new(Mutex::new(queue)),
            results,
            index,
            in_flight,
            stats,
            workers: Vec::new(),
            aggregator,
        }
    }

    /// Launches `worker_count` workers pulling from the submission queue.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::InvalidWorkerCount`] outside
    /// `MIN_WORKERS..=MAX_WORKERS` and [`ManagerError::AlreadyStarted`] on
    /// a second call.
    pub fn start(&mut self, worker_count: usize) -> Result<(), ManagerError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&worker_count) {
            return Err(ManagerError::InvalidWorkerCount {
                value: worker_count,
            });
        }
        if !self.workers.is_empty() {
            return Err(ManagerError::AlreadyStarted);
        }

        info!(workers = worker_count, "starting worker pool");
        self.workers = (0..worker_count)
            .map(|id| {
                let queue = Arc::clone(&self.queue);
                let results = self.results.clone();
                tokio::spawn(run_worker(id, queue, results))
            })
            .collect();
        Ok(())
    }

    /// Returns true once the worker pool is running.
    #[must_use]
    pub fn is_started(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Returns true if `key` is recorded in the registry.
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.index.exists(key)
    }

    /// Returns a read-only view of recorded keys.
    #[must_use]
    pub fn index(&self) -> RegistryIndex {
        self.index.clone()
    }

    /// Returns the live counters for this run.
    #[must_use]
    pub fn stats(&self) -> RunSummary {
        self.stats.snapshot()
    }

    /// Enqueues `item` unless its identity is recorded or already queued.
    ///
    /// Waits while the submission queue is full. Dropping the returned
    /// future while it waits leaves no trace; the item can be submitted again.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::QueueClosed`] if the queue no longer
    /// accepts items.
    pub async fn submit<I>(&self, item: I) -> Result<SubmitOutcome, ManagerError>
    where
        I: WorkItem + 'static,
    {
        self.submit_boxed(Box::new(item)).await
    }

    /// Type-erased form of [`submit`](Self::submit).
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::QueueClosed`] if the queue no longer
    /// accepts items.
    #[instrument(level = "debug", skip_all, fields(key = item.identity(), kind = item.kind()))]
    pub async fn submit_boxed(&self, item: Box<dyn WorkItem>) -> Result<SubmitOutcome, ManagerError> {
        // Wait for queue capacity before claiming the key. Everything after
        // the reservation is synchronous, so a cancelled submit never leaves
        // a stale claim behind.
        let permit = self
            .submissions
            .reserve()
            .await
            .map_err(|_| ManagerError::QueueClosed)?;
        let key = item.identity().to_string();

        // Claim the key before the registry check; the aggregator releases it
        // only after the registry write, so one of the two checks always hits.
        if !self.in_flight.insert(key.clone()) {
            debug!("already queued, skipping");
            self.stats.increment_skipped();
            return Ok(SubmitOutcome::AlreadyQueued);
        }
        if self.index.exists(&key) {
            self.in_flight.remove(&key);
            debug!("already downloaded, skipping");
            self.stats.increment_skipped();
            return Ok(SubmitOutcome::AlreadyDownloaded);
        }

        permit.send(item);
        self.stats.increment_queued();
        debug!("queued");
        Ok(SubmitOutcome::Queued)
    }

    /// Drains every accepted item, flushes the registry and returns the
    /// run counters.
    ///
    /// If the pool was never started, one worker is started so accepted
    /// items are still processed.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::AggregatorFailed`] if the aggregation task
    /// panicked and [`ManagerError::Registry`] if the final flush fails.
    pub async fn close(mut self) -> Result<RunSummary, ManagerError> {
        if self.workers.is_empty() {
            warn!("closing a manager that was never started, draining with one worker");
            self.start(MIN_WORKERS)?;
        }

        let Self {
            submissions,
            queue,
            results,
            workers,
            aggregator,
            stats,
            ..
        } = self;

        drop(submissions);
        drop(queue);
        debug!(workers = workers.len(), "waiting for workers to drain queue");
        for handle in workers {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task panicked");
            }
        }

        drop(results);
        let registry = aggregator
            .await
            .map_err(|e| ManagerError::AggregatorFailed {
                reason: e.to_string(),
            })?;
        registry.close()?;

        let summary = stats.snapshot();
        info!(
            queued = summary.queued,
            skipped = summary.skipped,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "download run finished"
        );
        Ok(summary)
    }
}

async fn run_worker(id: usize, queue: SharedQueue, results: mpsc::Sender<FetchResult>) {
    debug!(worker = id, "worker started");
    loop {
        let next = queue.lock().await.recv().await;
        let Some(item) = next else {
            break;
        };

        let result = process_item(id, item.as_ref()).await;
        if results.send(result).await.is_err() {
            warn!(worker = id, "result stream closed, worker stopping");
            break;
        }
    }
    debug!(worker = id, "worker finished");
}

async fn process_item(worker: usize, item: &dyn WorkItem) -> FetchResult {
    let key = item.identity().to_string();
    debug!(worker, key = %key, kind = item.kind(), "fetch started");

    let outcome = match AssertUnwindSafe(item.fetch()).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => Err(FetchError::panicked(&key, panic_message(payload.as_ref()))),
    };
    FetchResult::new(key, outcome)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Consumes results until every sender is gone, then hands the registry back.
fn aggregate(
    mut results: mpsc::Receiver<FetchResult>,
    mut registry: Registry,
    in_flight: &DashSet<String>,
    stats: &DownloadStats,
) -> Registry {
    while let Some(result) = results.blocking_recv() {
        let (key, outcome) = result.into_parts();
        let recorded = match outcome {
            Ok(path) => match registry.add(&key, &path) {
                Ok(true) => {
                    info!(key = %key, path = %path.display(), "download recorded");
                    true
                }
                Ok(false) => {
                    debug!(key = %key, "download already recorded");
                    true
                }
                Err(e) => {
                    error!(key = %key, error = %e, "download finished but could not be recorded");
                    false
                }
            },
            Err(e) => {
                warn!(key = %key, error = %e, "download failed");
                false
            }
        };
        // Counters move only after the key is released.
        in_flight.remove(&key);
        if recorded {
            stats.increment_succeeded();
        } else {
            stats.increment_failed();
        }
    }
    debug!("result stream drained");
    registry
}

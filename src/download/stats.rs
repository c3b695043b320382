//! Counters for one manager run.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Live counters, updated by the submit path and the aggregation task.
#[derive(Debug, Default)]
pub struct DownloadStats {
    queued: AtomicUsize,
    skipped: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl DownloadStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> RunSummary {
        RunSummary {
            queued: self.queued.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }

    pub(crate) fn increment_queued(&self) {
        self.queued.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Final counts returned by [`DownloadManager::close`](super::DownloadManager::close).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items accepted into the submission queue.
    pub queued: usize,
    /// Submissions ignored because the item was recorded or already queued.
    pub skipped: usize,
    /// Items fetched and recorded.
    pub succeeded: usize,
    /// Items whose fetch (or recording) failed.
    pub failed: usize,
}

impl RunSummary {
    /// Returns the number of items that produced a result.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

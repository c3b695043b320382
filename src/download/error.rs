//! Error types for the download manager.

use thiserror::Error;

use super::manager::{MAX_WORKERS, MIN_WORKERS};
use crate::registry::RegistryError;

/// Errors from manager lifecycle operations.
///
/// Per-item fetch failures never surface here; they are logged by the
/// aggregation task and counted in the run summary.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Invalid worker count provided to `start`.
    #[error("invalid worker count {value}: must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    InvalidWorkerCount {
        /// The invalid value that was provided.
        value: usize,
    },

    /// `start` was called on a pool that is already running.
    #[error("worker pool already started")]
    AlreadyStarted,

    /// The submission queue no longer accepts items.
    #[error("submission queue closed")]
    QueueClosed,

    /// Registry open or final flush failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The aggregation task ended abnormally.
    #[error("result aggregation task failed: {reason}")]
    AggregatorFailed {
        /// Join error description.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_worker_count_display() {
        let msg = ManagerError::InvalidWorkerCount { value: 0 }.to_string();
        assert!(msg.contains("invalid worker count 0"), "got: {msg}");
        assert!(msg.contains("100"), "got: {msg}");
    }
}

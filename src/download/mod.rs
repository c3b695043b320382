//! Concurrent fetch orchestration.
//!
//! [`DownloadManager`] accepts [`WorkItem`](crate::item::WorkItem)s,
//! fetches them on a bounded worker pool and records every success in the
//! [`Registry`](crate::registry::Registry) from a single aggregation task.

mod error;
mod manager;
mod result;
mod stats;

pub use error::ManagerError;
pub use manager::{DEFAULT_WORKERS, DownloadManager, MAX_WORKERS, MIN_WORKERS, SubmitOutcome};
pub use result::FetchResult;
pub use stats::{DownloadStats, RunSummary};

//! errdownload core library
//!
//! Concurrent download orchestration for archive shows: items are
//! discovered, fetched on a worker pool through an external transfer tool,
//! and every success is recorded in a CSV registry so later runs skip it.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`registry`] - Persistent identity -> output path store (CSV)
//! - [`item`] - The [`WorkItem`] capability and its series/search kinds
//! - [`download`] - [`DownloadManager`]: worker pool and result aggregation
//! - [`stream`] - Stream descriptors and the external [`FetchStrategy`]
//! - [`page`] - Detail page retrieval and descriptor extraction
//! - [`discovery`] - Series and search producers feeding the manager

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod discovery;
pub mod download;
pub mod item;
pub mod page;
pub mod registry;
pub mod stream;
mod user_agent;

// Re-export commonly used types
pub use discovery::{DiscoveryError, DiscoveryReport, SearchDiscovery, fetch_series};
pub use download::{
    DEFAULT_WORKERS, DownloadManager, FetchResult, MAX_WORKERS, MIN_WORKERS, ManagerError,
    RunSummary, SubmitOutcome,
};
pub use item::{FetchError, SearchHit, SearchResult, SeriesEntry, ShowFetcher, WorkItem};
pub use page::{PageClient, PageError};
pub use registry::{Registry, RegistryError, RegistryIndex};
pub use stream::{DEFAULT_RTMPDUMP_BINARY, FetchStrategy, RtmpDump, StreamDescriptor, TransferError};

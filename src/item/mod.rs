//! Work items: things that know their identity and can materialize
//! themselves into a local file.
//!
//! The download manager only sees [`WorkItem`]. Concrete kinds differ only in
//! how they name their output and where their detail page is; both delegate
//! the page -> stream -> transfer steps to a shared [`ShowFetcher`].
//!
//! - [`SeriesEntry`] - an episode link from a series page
//! - [`SearchResult`] - a program returned by the search API

mod error;
mod search;
mod series;
mod show;

pub use error::FetchError;
pub use search::{SearchHit, SearchResult, search_filename};
pub use series::{SeriesEntry, series_filename};
pub use show::{ShowFetcher, ShowSource};

use std::path::PathBuf;

use async_trait::async_trait;

/// A candidate download identified by a stable key.
///
/// Items are created by a producer, never mutated, and consumed by exactly
/// one worker.
#[async_trait]
pub trait WorkItem: Send + Sync {
    /// Canonical source URL; the registry key for this item.
    fn identity(&self) -> &str;

    /// Short label for logs.
    fn kind(&self) -> &'static str {
        "item"
    }

    /// Materializes the item and returns the output path.
    async fn fetch(&self) -> Result<PathBuf, FetchError>;
}

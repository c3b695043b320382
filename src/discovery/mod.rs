//! Producers that discover shows and feed them to the download manager.
//!
//! Two sources exist: a series page listing its episodes
//! ([`fetch_series`]) and the archive search API ([`SearchDiscovery`]).
//! Both submit items one at a time and return a [`DiscoveryReport`].

mod error;
mod search;
mod series;

pub use error::DiscoveryError;
pub use search::{
    DEFAULT_API_BASE, RECENT_WINDOW_DAYS, SearchDiscovery, SearchResponse, api_query,
    build_api_url, select_recent,
};
pub use series::fetch_series;

/// Counts from one discovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Candidates found on the page or in the API response.
    pub found: usize,
    /// Candidates dropped by the recency or include filter.
    pub filtered: usize,
    /// Candidates accepted into the submission queue.
    pub queued: usize,
}

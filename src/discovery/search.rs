//! Archive search API query.

use chrono::{NaiveDateTime, TimeDelta, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use super::{DiscoveryError, DiscoveryReport};
use crate::download::{DownloadManager, SubmitOutcome};
use crate::item::{SearchHit, SearchResult, ShowFetcher};

/// Base URL of the search API.
pub const DEFAULT_API_BASE: &str = "http://etv.err.ee";

/// Host a search URL must point at.
const SEARCH_HOST: &str = "etv.err.ee";

/// Path a search URL must point at.
const SEARCH_PATH: &str = "/search3";

/// Results updated longer ago than this are ignored.
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Timestamp layout of `Updated`; a fractional second part is accepted.
const UPDATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Search API response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SearchResponse {
    /// Number of matches reported by the API.
    pub total_count: u64,
    /// Server-side query time.
    pub elapsed_milliseconds: u64,
    /// Matching programs.
    pub results: Vec<SearchHit>,
}

/// Extracts the API query string from a search page URL.
///
/// The query lives in the fragment after its first character
/// (`#?phrase=x` yields `phrase=x`).
///
/// # Errors
///
/// Returns [`DiscoveryError::UnknownSearchUrl`] unless the URL is an
/// `http(s)://etv.err.ee/search3#...` address.
pub fn api_query(search_url: &str) -> Result<String, DiscoveryError> {
    let url = Url::parse(search_url).map_err(|_| DiscoveryError::unknown_search_url(search_url))?;
    let recognised = matches!(url.scheme(), "http" | "https")
        && url.host_str() == Some(SEARCH_HOST)
        && url.path() == SEARCH_PATH;
    if !recognised {
        return Err(DiscoveryError::unknown_search_url(search_url));
    }

    let fragment = url.fragment().unwrap_or_default();
    let mut chars = fragment.chars();
    chars.next();
    Ok(chars.as_str().to_string())
}

/// Builds the search API call for `query`.
#[must_use]
pub fn build_api_url(api_base: &str, query: &str) -> String {
    format!(
        "{}/api/search/programs?size=200&page=0&{query}&onlyreviewable=true",
        api_base.trim_end_matches('/')
    )
}

/// Keeps hits updated within the recent window whose header matches `include`.
///
/// `now` is naive UTC. Hits with unparsable timestamps are dropped.
#[must_use]
pub fn select_recent(hits: Vec<SearchHit>, include: &Regex, now: NaiveDateTime) -> Vec<SearchHit> {
    let earliest = now - TimeDelta::days(RECENT_WINDOW_DAYS);
    hits.into_iter()
        .filter(|hit| match NaiveDateTime::parse_from_str(&hit.updated, UPDATED_FORMAT) {
            Ok(updated) if updated >= earliest => true,
            Ok(_) => {
                debug!(header = %hit.header, updated = %hit.updated, "too old, skipping");
                false
            }
            Err(_) => {
                debug!(header = %hit.header, updated = %hit.updated, "unparsable timestamp, skipping");
                false
            }
        })
        .filter(|hit| {
            let keep = include.is_match(&hit.header);
            if !keep {
                info!(header = %hit.header, include = include.as_str(), "skipping, does not match include filter");
            }
            keep
        })
        .collect()
}

/// Search discovery settings.
#[derive(Debug, Clone)]
pub struct SearchDiscovery {
    api_base: String,
    include: Regex,
}

impl SearchDiscovery {
    /// Creates a search pass filtering headers with `include`.
    ///
    /// An empty pattern matches every header.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidInclude`] for an invalid pattern.
    pub fn new(include: &str) -> Result<Self, DiscoveryError> {
        let include = Regex::new(include).map_err(|source| DiscoveryError::InvalidInclude {
            pattern: include.to_string(),
            source,
        })?;
        Ok(Self {
            api_base: DEFAULT_API_BASE.to_string(),
            include,
        })
    }

    /// Sends API calls to `api_base` instead of the public host.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Runs the search behind `search_url` and submits every selected hit.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::UnknownSearchUrl`] for a foreign URL,
    /// [`DiscoveryError::Page`] if the API call fails and
    /// [`DiscoveryError::Submit`] if the manager stops accepting items.
    #[instrument(skip(self, fetcher, manager), fields(include = self.include.as_str()))]
    pub async fn run(
        &self,
        search_url: &str,
        fetcher: &ShowFetcher,
        manager: &DownloadManager,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        let query = api_query(search_url)?;
        let api_url = build_api_url(&self.api_base, &query);
        let response: SearchResponse = fetcher.pages().get_json(&api_url).await?;
        info!(
            total = response.total_count,
            returned = response.results.len(),
            elapsed_ms = response.elapsed_milliseconds,
            "search API answered"
        );

        let mut report = DiscoveryReport {
            found: response.results.len(),
            ..DiscoveryReport::default()
        };
        let selected = select_recent(response.results, &self.include, Utc::now().naive_utc());
        report.filtered = report.found - selected.len();

        for hit in selected {
            let item = SearchResult::new(hit, fetcher.clone());
            if manager.submit(item).await? == SubmitOutcome::Queued {
                report.queued += 1;
            }
        }
        Ok(report)
    }
}

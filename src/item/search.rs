//! Items returned by the archive search API.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use super::{FetchError, ShowFetcher, ShowSource, WorkItem};

/// One program entry from the search API response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct SearchHit {
    /// Program id in the archive.
    pub public_id: String,
    /// Last update, `%Y-%m-%dT%H:%M:%S`.
    pub updated: String,
    /// Program title.
    pub header: String,
    /// Short description.
    pub lead: String,
    /// Detail page without scheme, e.g. `etv.err.ee/v/saade`.
    #[serde(rename = "Url")]
    pub show_url: String,
}

impl SearchHit {
    /// Identity of the hit: its detail page URL.
    #[must_use]
    pub fn identity(&self) -> String {
        format!("http://{}", self.show_url)
    }
}

/// A search hit wrapped as a work item.
#[derive(Debug, Clone)]
pub struct SearchResult {
    hit: SearchHit,
    identity: String,
    fetcher: ShowFetcher,
}

impl SearchResult {
    /// Wraps `hit` for download through `fetcher`.
    #[must_use]
    pub fn new(hit: SearchHit, fetcher: ShowFetcher) -> Self {
        let identity = hit.identity();
        Self {
            hit,
            identity,
            fetcher,
        }
    }

    /// Returns the underlying API entry.
    #[must_use]
    pub fn hit(&self) -> &SearchHit {
        &self.hit
    }
}

/// Output filename for a search hit: `<header>-<token basename>`.
///
/// Path separators in the header are replaced so the file stays in the
/// output directory.
#[must_use]
pub fn search_filename(header: &str, remote_token: &str) -> String {
    let header: String = header
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    let base = remote_token
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("stream");
    format!("{header}-{base}")
}

impl ShowSource for SearchResult {
    fn show_url(&self) -> &str {
        &self.identity
    }

    fn filename(&self, remote_token: &str) -> String {
        search_filename(&self.hit.header, remote_token)
    }
}

#[async_trait]
impl WorkItem for SearchResult {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn kind(&self) -> &'static str {
        "search-result"
    }

    async fn fetch(&self) -> Result<PathBuf, FetchError> {
        self.fetcher.fetch_show(self).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_hit_deserializes_api_field_names() {
        let hit: SearchHit = serde_json::from_str(
            r#"{"PublicId":"1234","Updated":"2024-03-01T10:00:00","Header":"Aktuaalne kaamera","Lead":"","Url":"etv.err.ee/v/aktuaalne"}"#,
        )
        .unwrap();
        assert_eq!(hit.header, "Aktuaalne kaamera");
        assert_eq!(hit.show_url, "etv.err.ee/v/aktuaalne");
        assert_eq!(hit.identity(), "http://etv.err.ee/v/aktuaalne");
    }

    #[test]
    fn test_search_hit_tolerates_missing_fields() {
        let hit: SearchHit = serde_json::from_str(r#"{"Header":"x"}"#).unwrap();
        assert_eq!(hit.header, "x");
        assert!(hit.updated.is_empty());
    }

    #[test]
    fn test_search_filename_joins_header_and_basename() {
        assert_eq!(
            search_filename("Aktuaalne kaamera", "/VIDEO/2024/ak_0301.mp4"),
            "Aktuaalne kaamera-ak_0301.mp4"
        );
    }

    #[test]
    fn test_search_filename_replaces_separators_in_header() {
        assert_eq!(search_filename("Ilm 1/2", "/a/b.mp4"), "Ilm 1_2-b.mp4");
    }
}

//! Items discovered on a series page.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use super::{FetchError, ShowFetcher, ShowSource, WorkItem};

/// Fallback name when the identity URL has no usable path segment.
const UNNAMED_SHOW: &str = "show";

/// One episode link found on a series page.
#[derive(Debug, Clone)]
pub struct SeriesEntry {
    url: String,
    fetcher: ShowFetcher,
}

impl SeriesEntry {
    /// Creates an entry for the episode at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, fetcher: ShowFetcher) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }
}

/// Output filename for a series entry: the last path segment of the episode
/// URL plus the remote token's extension.
///
/// `https://arhiiv.err.ee/vaata/foo` + `/AUDIO/a_1.m4a` gives `foo.m4a`.
#[must_use]
pub fn series_filename(identity: &str, remote_token: &str) -> String {
    let path = Url::parse(identity)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| identity.to_string());
    let name = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(UNNAMED_SHOW);

    match Path::new(remote_token).extension() {
        Some(ext) => format!("{name}.{}", ext.to_string_lossy()),
        None => name.to_string(),
    }
}

impl ShowSource for SeriesEntry {
    fn show_url(&self) -> &str {
        &self.url
    }

    fn filename(&self, remote_token: &str) -> String {
        series_filename(&self.url, remote_token)
    }
}

#[async_trait]
impl WorkItem for SeriesEntry {
    fn identity(&self) -> &str {
        &self.url
    }

    fn kind(&self) -> &'static str {
        "series-entry"
    }

    async fn fetch(&self) -> Result<PathBuf, FetchError> {
        self.fetcher.fetch_show(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_filename_uses_last_segment_and_token_extension() {
        assert_eq!(
            series_filename(
                "https://arhiiv.err.ee/vaata/kirjutamata-memuaare",
                "/AUDIO/a_8378_RMARHIIV.m4a"
            ),
            "kirjutamata-memuaare.m4a"
        );
    }

    #[test]
    fn test_series_filename_ignores_trailing_slash_and_query() {
        assert_eq!(
            series_filename("https://arhiiv.err.ee/vaata/saade/?x=1", "/v/clip.mp4"),
            "saade.mp4"
        );
    }

    #[test]
    fn test_series_filename_token_without_extension() {
        assert_eq!(
            series_filename("https://arhiiv.err.ee/vaata/saade", "/VIDEO/raw"),
            "saade"
        );
    }

    #[test]
    fn test_series_filename_root_url_falls_back() {
        assert_eq!(series_filename("https://arhiiv.err.ee/", "/a.m4a"), "show.m4a");
    }

    #[test]
    fn test_series_filename_is_deterministic() {
        let first = series_filename("https://arhiiv.err.ee/vaata/a", "/x/y.flv");
        let second = series_filename("https://arhiiv.err.ee/vaata/a", "/x/y.flv");
        assert_eq!(first, second);
    }
}

//! Series page crawl.

use tracing::{debug, info, instrument};
use url::Url;

use super::{DiscoveryError, DiscoveryReport};
use crate::download::{DownloadManager, SubmitOutcome};
use crate::item::{SeriesEntry, ShowFetcher};
use crate::page::{PageError, find_show_urls};

/// Fetches the series page at `series_url` and submits every linked show.
///
/// Links are resolved against the page URL and submitted once each, in the
/// order they first appear.
///
/// # Errors
///
/// Returns [`DiscoveryError::Page`] if the series page cannot be fetched and
/// [`DiscoveryError::Submit`] if the manager stops accepting items.
#[instrument(skip(fetcher, manager))]
pub async fn fetch_series(
    series_url: &str,
    fetcher: &ShowFetcher,
    manager: &DownloadManager,
) -> Result<DiscoveryReport, DiscoveryError> {
    let base = Url::parse(series_url).map_err(|e| PageError::invalid_url(series_url, e))?;
    let html = fetcher.pages().get_text(series_url).await?;
    let show_urls = find_show_urls(&html, &base);
    info!(shows = show_urls.len(), "series page parsed");

    let mut report = DiscoveryReport::default();
    for show_url in show_urls {
        report.found += 1;
        let outcome = manager
            .submit(SeriesEntry::new(show_url.clone(), fetcher.clone()))
            .await?;
        debug!(show = %show_url, ?outcome, "submitted");
        if outcome == SubmitOutcome::Queued {
            report.queued += 1;
        }
    }
    Ok(report)
}

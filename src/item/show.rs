//! Shared fetch pipeline for show-like items.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, instrument};
use url::Url;

use super::FetchError;
use crate::page::{PageClient, PageError, find_player_url, parse_player_params};
use crate::stream::{FetchStrategy, StreamDescriptor};

/// The naming half of a show item: where its detail page lives and how its
/// output file is called.
pub trait ShowSource: Send + Sync {
    /// Detail page URL (also the item identity).
    fn show_url(&self) -> &str;

    /// Output filename for the stream with `remote_token`.
    ///
    /// Must be a pure function of the item and the token.
    fn filename(&self, remote_token: &str) -> String;
}

/// Detail page -> descriptor -> transfer pipeline shared by all show kinds.
#[derive(Clone)]
pub struct ShowFetcher {
    pages: PageClient,
    strategy: Arc<dyn FetchStrategy>,
    output_dir: Option<PathBuf>,
}

impl std::fmt::Debug for ShowFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShowFetcher")
            .field("strategy", &self.strategy.name())
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

impl ShowFetcher {
    /// Creates a pipeline writing into the current directory.
    #[must_use]
    pub fn new(pages: PageClient, strategy: Arc<dyn FetchStrategy>) -> Self {
        Self {
            pages,
            strategy,
            output_dir: None,
        }
    }

    /// Writes outputs below `output_dir` instead of the current directory.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    /// Returns the page client used for detail pages.
    #[must_use]
    pub fn pages(&self) -> &PageClient {
        &self.pages
    }

    /// Returns the output path for `filename`.
    #[must_use]
    pub fn destination(&self, filename: &str) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(filename),
            None => PathBuf::from(filename),
        }
    }

    /// Fetches the detail page of `show`, extracts its stream and transfers it.
    ///
    /// Returns the output path on success.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Page`] if the page cannot be fetched or carries
    /// no player, [`FetchError::Transfer`] if the strategy fails.
    #[instrument(skip_all, fields(source = show.show_url()))]
    pub async fn fetch_show(&self, show: &dyn ShowSource) -> Result<PathBuf, FetchError> {
        let url = show.show_url();
        let page_url = Url::parse(url).map_err(|e| PageError::invalid_url(url, e))?;

        let html = self.pages.get_text(url).await?;
        let player_url =
            find_player_url(&html).ok_or_else(|| PageError::descriptor_not_found(url))?;
        let params = parse_player_params(&player_url, &page_url)?;

        let destination = self.destination(&show.filename(&params.file));
        let stream = StreamDescriptor::new(url, params.stream, params.file, destination);
        debug!(
            locator = %stream.locator,
            token = %stream.token,
            destination = %stream.destination.display(),
            "stream descriptor extracted"
        );

        self.strategy.fetch(&stream).await?;
        Ok(stream.destination)
    }
}

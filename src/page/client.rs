//! HTTP client for detail pages, series pages and the search API.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::PageError;
use crate::user_agent;

/// Default connect timeout for page requests.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default read timeout for page requests.
pub const READ_TIMEOUT_SECS: u64 = 30;

/// Shared page client; cheap to clone (connection pool is shared).
#[derive(Debug, Clone)]
pub struct PageClient {
    client: Client,
}

impl PageClient {
    /// Creates a client with the default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Client`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, PageError> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit connect/read timeouts in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Client`] if the TLS backend cannot be initialised.
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Result<Self, PageError> {
        let client = Client::builder()
            .user_agent(user_agent::default_user_agent())
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .build()
            .map_err(|source| PageError::Client { source })?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Network`] on transport failure and
    /// [`PageError::HttpStatus`] for non-2xx responses.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_text(&self, url: &str) -> Result<String, PageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PageError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::http_status(url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PageError::network(url, e))?;
        debug!(bytes = body.len(), "page fetched");
        Ok(body)
    }

    /// Fetches `url` and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Same as [`get_text`](Self::get_text), plus [`PageError::Decode`].
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, PageError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| PageError::decode(url, e))
    }
}

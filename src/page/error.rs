//! Error types for page retrieval and descriptor extraction.

use thiserror::Error;

/// Errors that can occur while fetching or reading a page.
#[derive(Debug, Error)]
pub enum PageError {
    /// The HTTP client could not be constructed.
    #[error("failed to build page HTTP client: {source}")]
    Client {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// Network-level error (DNS, connect, TLS, body read).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The page URL.
        url: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The page URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body is not the expected JSON document.
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        /// The requested URL.
        url: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The page URL could not be parsed.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser explanation.
        reason: String,
    },

    /// The detail page has no embedded player.
    #[error("mediaframe not found in {url}")]
    DescriptorNotFound {
        /// The detail page URL.
        url: String,
    },

    /// The player URL is missing the stream parameters.
    #[error("not a valid player url {player_url}: {reason}")]
    InvalidPlayerUrl {
        /// The player URL taken from the page.
        player_url: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl PageError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a JSON decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a descriptor-not-found error.
    pub fn descriptor_not_found(url: impl Into<String>) -> Self {
        Self::DescriptorNotFound { url: url.into() }
    }

    /// Creates an invalid player URL error.
    pub fn invalid_player_url(player_url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPlayerUrl {
            player_url: player_url.into(),
            reason: reason.into(),
        }
    }
}

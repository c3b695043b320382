//! Error types for discovery producers.

use thiserror::Error;

use crate::download::ManagerError;
use crate::page::PageError;

/// Errors that abort a discovery pass.
///
/// Failures of individual items are not discovery errors; they surface
/// through the manager's aggregation task.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Series page or search API could not be retrieved.
    #[error(transparent)]
    Page(#[from] PageError),

    /// The search URL is not an archive search query.
    #[error("unknown URL for a search query: {url}")]
    UnknownSearchUrl {
        /// The rejected URL.
        url: String,
    },

    /// The include filter is not a valid regular expression.
    #[error("invalid include pattern '{pattern}': {source}")]
    InvalidInclude {
        /// The rejected pattern.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The manager stopped accepting submissions.
    #[error(transparent)]
    Submit(#[from] ManagerError),
}

impl DiscoveryError {
    /// Creates an unknown search URL error.
    #[must_use]
    pub fn unknown_search_url(url: impl Into<String>) -> Self {
        Self::UnknownSearchUrl { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_search_url_display() {
        let err = DiscoveryError::unknown_search_url("http://example.com/x");
        assert_eq!(
            err.to_string(),
            "unknown URL for a search query: http://example.com/x"
        );
    }

    #[test]
    fn test_page_error_is_transparent() {
        let err: DiscoveryError = PageError::descriptor_not_found("http://a/b").into();
        assert_eq!(err.to_string(), "mediaframe not found in http://a/b");
    }
}

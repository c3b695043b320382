//! Error type for a single work item fetch.

use thiserror::Error;

use crate::page::PageError;
use crate::stream::TransferError;

/// Why one item could not be materialized.
///
/// Every variant is per-item: the item is not recorded and a later run will
/// attempt it again.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The detail page could not be fetched or had no usable descriptor.
    #[error(transparent)]
    Page(#[from] PageError),

    /// The external transfer failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The fetch panicked; caught by the worker that ran it.
    #[error("fetch of {identity} panicked: {message}")]
    Panicked {
        /// Identity of the item.
        identity: String,
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl FetchError {
    /// Creates a panic error.
    pub fn panicked(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Panicked {
            identity: identity.into(),
            message: message.into(),
        }
    }

    /// Returns true if the page was fetched but carried no stream descriptor.
    #[must_use]
    pub fn is_descriptor_missing(&self) -> bool {
        matches!(
            self,
            Self::Page(PageError::DescriptorNotFound { .. } | PageError::InvalidPlayerUrl { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_error_is_transparent() {
        let error: FetchError = PageError::descriptor_not_found("http://a/1").into();
        assert_eq!(error.to_string(), "mediaframe not found in http://a/1");
        assert!(error.is_descriptor_missing());
    }

    #[test]
    fn test_http_status_is_not_descriptor_missing() {
        let error: FetchError = PageError::http_status("http://a/1", 500).into();
        assert!(!error.is_descriptor_missing());
    }

    #[test]
    fn test_panicked_display() {
        let error = FetchError::panicked("http://a/1", "boom");
        let msg = error.to_string();
        assert!(msg.contains("http://a/1") && msg.contains("boom"), "got: {msg}");
    }
}

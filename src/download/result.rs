//! Outcome of one fetch attempt.

use std::path::{Path, PathBuf};

use crate::item::FetchError;

/// Result of fetching one work item.
///
/// Exactly one of output path / error is present, enforced by holding a
/// `Result`. Produced by one worker, consumed once by the aggregation task.
#[derive(Debug)]
pub struct FetchResult {
    key: String,
    outcome: Result<PathBuf, FetchError>,
}

impl FetchResult {
    /// Creates a result from a fetch outcome.
    #[must_use]
    pub fn new(key: impl Into<String>, outcome: Result<PathBuf, FetchError>) -> Self {
        Self {
            key: key.into(),
            outcome,
        }
    }

    /// Returns the identity of the item.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns true if the fetch produced an output file.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Returns the output path on success.
    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        self.outcome.as_ref().ok().map(PathBuf::as_path)
    }

    /// Returns the failure cause.
    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        self.outcome.as_ref().err()
    }

    /// Splits into key and outcome.
    #[must_use]
    pub fn into_parts(self) -> (String, Result<PathBuf, FetchError>) {
        (self.key, self.outcome)
    }
}

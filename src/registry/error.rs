//! Error types for registry operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while opening or appending to the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry path has an extension no backing store understands.
    #[error("unsupported registry format '{extension}' for {path}: expected a .csv file")]
    UnsupportedFormat {
        /// The registry path that was rejected.
        path: PathBuf,
        /// The extension that was found (empty when there is none).
        extension: String,
    },

    /// The backing file could not be opened, read, flushed or synced.
    #[error("registry IO error on {path}: {source}")]
    Io {
        /// The registry file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded into the backing file.
    #[error("failed to append registry record to {path}: {source}")]
    Write {
        /// The registry file.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

impl RegistryError {
    /// Creates an unsupported-format error.
    pub fn unsupported_format(path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            extension: extension.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a record write error.
    pub fn write(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

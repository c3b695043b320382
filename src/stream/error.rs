//! Error types for external stream transfers.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors reported by a [`FetchStrategy`](super::FetchStrategy).
#[derive(Debug, Error)]
pub enum TransferError {
    /// The transfer binary could not be found or started.
    #[error("cannot run {binary}: {source}")]
    Spawn {
        /// The binary that failed to start.
        binary: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The transfer process exited unsuccessfully.
    #[error("transfer of rtmp://{locator}{token} failed for {source_url}: {status}")]
    Failed {
        /// Transport locator of the stream.
        locator: String,
        /// Remote file token of the stream.
        token: String,
        /// Identity of the item the stream belongs to.
        source_url: String,
        /// Exit status description from the process.
        status: String,
    },

    /// The transfer did not finish within the configured limit.
    #[error("transfer for {source_url} timed out after {}s", .timeout.as_secs())]
    TimedOut {
        /// Identity of the item the stream belongs to.
        source_url: String,
        /// The limit that was exceeded.
        timeout: Duration,
    },
}

impl TransferError {
    /// Creates a spawn error.
    pub fn spawn(binary: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Spawn {
            binary: binary.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timed_out(source_url: impl Into<String>, timeout: Duration) -> Self {
        Self::TimedOut {
            source_url: source_url.into(),
            timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_display_names_stream_and_source() {
        let error = TransferError::Failed {
            locator: "media.err.ee:80/arhiiv/".to_string(),
            token: "/AUDIO/a_1.m4a".to_string(),
            source_url: "https://arhiiv.err.ee/vaata/show".to_string(),
            status: "exit status: 1".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("rtmp://media.err.ee:80/arhiiv//AUDIO/a_1.m4a"), "got: {msg}");
        assert!(msg.contains("https://arhiiv.err.ee/vaata/show"), "got: {msg}");
        assert!(msg.contains("exit status: 1"), "got: {msg}");
    }

    #[test]
    fn test_timed_out_display_names_limit() {
        let error = TransferError::timed_out("http://a/1", Duration::from_secs(90));
        assert!(error.to_string().contains("90s"));
    }
}

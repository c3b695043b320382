//! Stream descriptors and the strategies that turn them into local files.
//!
//! A [`StreamDescriptor`] is built by a worker from an item's detail page and
//! handed to a [`FetchStrategy`], which performs the actual transfer. The
//! strategy is shared by every worker, so implementations must be safe to
//! call concurrently with distinct destinations.
//!
//! - [`RtmpDump`] - runs the external `rtmpdump` binary per stream

mod error;
mod rtmpdump;

pub use error::TransferError;
pub use rtmpdump::{DEFAULT_RTMPDUMP_BINARY, RtmpDump};

use std::path::PathBuf;

use async_trait::async_trait;

/// Everything needed to transfer one item's media stream.
///
/// Owned by the worker processing the item and dropped once the transfer
/// has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Identity of the item this stream belongs to (for logs and errors).
    pub source_url: String,
    /// Transport locator, `host[:port]/app/` (e.g. `media.err.ee:80/arhiiv/`).
    pub locator: String,
    /// Remote file token (e.g. `/AUDIO/a_8378_RMARHIIV.m4a`).
    pub token: String,
    /// Local file the stream is written to.
    pub destination: PathBuf,
}

impl StreamDescriptor {
    /// Creates a new descriptor.
    #[must_use]
    pub fn new(
        source_url: impl Into<String>,
        locator: impl Into<String>,
        token: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            locator: locator.into(),
            token: token.into(),
            destination: destination.into(),
        }
    }
}

/// Transfers a described stream to its destination file.
///
/// Treated as an opaque, potentially slow operation. No retries happen at
/// this layer; a failed transfer fails the item for the current run.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Returns the strategy name (e.g. "rtmpdump").
    fn name(&self) -> &str;

    /// Verifies the transfer mechanism can be used at all.
    ///
    /// Called once at startup; an error here is fatal for the run.
    async fn check_available(&self) -> Result<(), TransferError>;

    /// Transfers `stream` to `stream.destination`.
    async fn fetch(&self, stream: &StreamDescriptor) -> Result<(), TransferError>;
}

//! `rtmpdump` process strategy.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use super::{FetchStrategy, StreamDescriptor, TransferError};

/// Binary name looked up on `PATH` when none is configured.
pub const DEFAULT_RTMPDUMP_BINARY: &str = "rtmpdump";

/// Fetch strategy that runs one `rtmpdump` process per stream.
///
/// The child is killed if the transfer future is dropped, which is how the
/// optional timeout is enforced.
#[derive(Debug, Clone)]
pub struct RtmpDump {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl RtmpDump {
    /// Creates a strategy using an explicit binary path.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Resolves `name` through `PATH` (or as a path when it contains a separator).
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Spawn`] if no executable is found.
    pub fn locate(name: impl AsRef<OsStr>) -> Result<Self, TransferError> {
        let name = name.as_ref();
        which::which(name).map(Self::new).map_err(|e| {
            TransferError::spawn(
                name,
                std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
            )
        })
    }

    /// Sets a limit on each transfer; `None` waits indefinitely.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the binary that will be executed.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Returns the configured per-transfer limit.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Builds the command line for `stream`.
    #[must_use]
    pub fn arguments(stream: &StreamDescriptor) -> Vec<OsString> {
        vec![
            "-R".into(),
            "-r".into(),
            format!("rtmp://{}", stream.locator).into(),
            "-y".into(),
            stream.token.clone().into(),
            "-o".into(),
            stream.destination.clone().into_os_string(),
            "-q".into(),
        ]
    }
}

impl Default for RtmpDump {
    fn default() -> Self {
        Self::new(DEFAULT_RTMPDUMP_BINARY)
    }
}

#[async_trait]
impl FetchStrategy for RtmpDump {
    fn name(&self) -> &'static str {
        "rtmpdump"
    }

    async fn check_available(&self) -> Result<(), TransferError> {
        let status = Command::new(&self.binary)
            .arg("--help")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| TransferError::spawn(&self.binary, e))?;
        debug!(binary = %self.binary.display(), %status, "rtmpdump is runnable");
        Ok(())
    }

    #[instrument(skip(self, stream), fields(source = %stream.source_url))]
    async fn fetch(&self, stream: &StreamDescriptor) -> Result<(), TransferError> {
        let started = Instant::now();
        info!(
            destination = %stream.destination.display(),
            "starting stream transfer"
        );

        let mut command = Command::new(&self.binary);
        command
            .args(Self::arguments(stream))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let run = command.status();
        let status = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| TransferError::timed_out(&stream.source_url, limit))?,
            None => run.await,
        }
        .map_err(|e| TransferError::spawn(&self.binary, e))?;

        if !status.success() {
            return Err(TransferError::Failed {
                locator: stream.locator.clone(),
                token: stream.token.clone(),
                source_url: stream.source_url.clone(),
                status: status.to_string(),
            });
        }

        info!(
            elapsed_ms = started.elapsed().as_millis(),
            "stream transfer finished"
        );
        Ok(())
    }
}

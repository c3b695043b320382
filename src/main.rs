//! CLI entry point for errdownload.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use errdownload_core::{
    DEFAULT_RTMPDUMP_BINARY, DEFAULT_WORKERS, DownloadManager, FetchStrategy, PageClient, RtmpDump,
    SearchDiscovery, ShowFetcher, fetch_series,
};
use errdownload_core::page::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::FileConfig;
use cli::{Args, DEFAULT_DOWNLOADS};

/// Where shows are discovered.
#[derive(Debug)]
enum Source {
    Series(String),
    Search { url: String, include: String },
}

/// A source ready to run.
enum Discovery {
    Series(String),
    Search(String, SearchDiscovery),
}

/// CLI flags merged over the config file and built-in defaults.
#[derive(Debug)]
struct Settings {
    source: Source,
    parallel: usize,
    downloads: PathBuf,
    rtmpdump: PathBuf,
    output_dir: Option<PathBuf>,
    page_connect_timeout_secs: u64,
    page_read_timeout_secs: u64,
    transfer_timeout: Option<Duration>,
}

impl Settings {
    fn resolve(args: Args, file: FileConfig) -> Result<Self> {
        let source = match (args.series, args.search) {
            (Some(series), None) => Source::Series(series),
            (None, Some(url)) => Source::Search {
                url,
                include: args.include,
            },
            _ => bail!("Must specify exactly one of --series or --search"),
        };

        Ok(Self {
            source,
            parallel: args
                .parallel
                .or(file.parallel)
                .map_or(DEFAULT_WORKERS, usize::from),
            downloads: args
                .downloads
                .or(file.downloads)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOADS)),
            rtmpdump: args
                .rtmpdump
                .or(file.rtmpdump)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RTMPDUMP_BINARY)),
            output_dir: args.output_dir.or(file.output_dir),
            page_connect_timeout_secs: file
                .page_connect_timeout_secs
                .unwrap_or(CONNECT_TIMEOUT_SECS),
            page_read_timeout_secs: file.page_read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
            transfer_timeout: file.transfer_timeout_secs.map(Duration::from_secs),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let file_config = app_config::load(args.config.as_deref())?.unwrap_or_default();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => file_config.verbosity.map_or("info", |v| v.filter()),
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    let settings = Settings::resolve(args, file_config)?;
    debug!(?settings, "settings resolved");

    run(settings).await
}

async fn run(settings: Settings) -> Result<()> {
    let strategy = RtmpDump::locate(&settings.rtmpdump)
        .with_context(|| format!("Cannot find '{}'", settings.rtmpdump.display()))?
        .with_timeout(settings.transfer_timeout);
    strategy
        .check_available()
        .await
        .with_context(|| format!("Cannot run '{}'", strategy.binary().display()))?;
    info!(binary = %strategy.binary().display(), "transfer tool ready");

    if let Some(dir) = &settings.output_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
    }

    let pages = PageClient::with_timeouts(
        settings.page_connect_timeout_secs,
        settings.page_read_timeout_secs,
    )?;
    let fetcher = ShowFetcher::new(pages, Arc::new(strategy))
        .with_output_dir(settings.output_dir.clone());

    // Validate the include pattern before touching the registry.
    let discovery = match settings.source {
        Source::Series(url) => Discovery::Series(url),
        Source::Search { url, include } => Discovery::Search(url, SearchDiscovery::new(&include)?),
    };

    let mut manager = DownloadManager::open(&settings.downloads).with_context(|| {
        format!("Cannot open registry '{}'", settings.downloads.display())
    })?;
    manager.start(settings.parallel)?;

    let discovered = match &discovery {
        Discovery::Series(url) => fetch_series(url, &fetcher, &manager).await,
        Discovery::Search(url, search) => search.run(url, &fetcher, &manager).await,
    };

    // The queue is drained and the registry flushed even if discovery failed.
    let summary = manager.close().await.context("Failed to finish downloads")?;
    let report = discovered.context("Discovery failed")?;

    info!(
        found = report.found,
        filtered = report.filtered,
        queued = report.queued,
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        "Download complete"
    );
    Ok(())
}

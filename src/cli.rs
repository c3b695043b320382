//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// Default registry file.
pub const DEFAULT_DOWNLOADS: &str = "downloaded.csv";

/// Download archive shows as media streams.
///
/// Shows are discovered from a series page or an archive search and fetched
/// with rtmpdump. Every finished download is recorded in a CSV registry so
/// repeated runs only fetch what is new.
#[derive(Parser, Debug)]
#[command(name = "errdownload")]
#[command(author, version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["series", "search"])))]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Number of parallel downloads (1-100) [default: 1]
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub parallel: Option<u8>,

    /// Download every show linked from this series page
    #[arg(long, value_name = "URL")]
    pub series: Option<String>,

    /// Download recent results of this archive search URL
    #[arg(long, value_name = "URL")]
    pub search: Option<String>,

    /// Only include search results whose title matches this regex
    #[arg(long, value_name = "REGEX", default_value = "")]
    pub include: String,

    /// Registry of finished downloads [default: downloaded.csv]
    #[arg(long, value_name = "PATH")]
    pub downloads: Option<PathBuf>,

    /// rtmpdump binary name or path [default: rtmpdump]
    #[arg(long, value_name = "PATH")]
    pub rtmpdump: Option<PathBuf>,

    /// Directory for downloaded files [default: current directory]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Config file [default: $XDG_CONFIG_HOME/errdownload/config.toml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SERIES: &str = "https://arhiiv.err.ee/seeria/kirjutamata-memuaare";

    #[test]
    fn test_cli_series_parses_successfully() {
        let args = Args::try_parse_from(["errdownload", "--series", SERIES]).unwrap();
        assert_eq!(args.series.as_deref(), Some(SERIES));
        assert!(args.search.is_none());
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(args.parallel.is_none());
        assert_eq!(args.include, "");
    }

    #[test]
    fn test_cli_search_with_include() {
        let args = Args::try_parse_from([
            "errdownload",
            "--search",
            "http://etv.err.ee/search3#?phrase=uudised",
            "--include",
            "^Uudised",
        ])
        .unwrap();
        assert!(args.series.is_none());
        assert_eq!(args.include, "^Uudised");
    }

    #[test]
    fn test_cli_source_is_required() {
        let err = Args::try_parse_from(["errdownload"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_series_and_search_conflict() {
        let err = Args::try_parse_from([
            "errdownload",
            "--series",
            SERIES,
            "--search",
            "http://etv.err.ee/search3#?a=1",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["errdownload", "-vv", "--series", SERIES]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["errdownload", "--quiet", "--series", SERIES]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_parallel_range() {
        let args = Args::try_parse_from(["errdownload", "-p", "100", "--series", SERIES]).unwrap();
        assert_eq!(args.parallel, Some(100));

        for bad in ["0", "101"] {
            let err = Args::try_parse_from(["errdownload", "-p", bad, "--series", SERIES])
                .unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_cli_paths() {
        let args = Args::try_parse_from([
            "errdownload",
            "--series",
            SERIES,
            "--downloads",
            "seen.csv",
            "--rtmpdump",
            "/opt/rtmpdump",
            "-o",
            "out",
            "--config",
            "cfg.toml",
        ])
        .unwrap();
        assert_eq!(args.downloads, Some(PathBuf::from("seen.csv")));
        assert_eq!(args.rtmpdump, Some(PathBuf::from("/opt/rtmpdump")));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.config, Some(PathBuf::from("cfg.toml")));
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["errdownload", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["errdownload", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["errdownload", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}

//! Optional `key = value` configuration file for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Directory name below the user config directory.
const CONFIG_DIR: &str = "errdownload";

/// File name of the config file.
const CONFIG_FILE: &str = "config.toml";

/// Values read from the config file; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default worker count (1..=100).
    pub parallel: Option<u8>,
    /// Default registry path.
    pub downloads: Option<PathBuf>,
    /// Default rtmpdump binary.
    pub rtmpdump: Option<PathBuf>,
    /// Default output directory.
    pub output_dir: Option<PathBuf>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// Page client connect timeout in seconds.
    pub page_connect_timeout_secs: Option<u64>,
    /// Page client read timeout in seconds.
    pub page_read_timeout_secs: Option<u64>,
    /// Per-transfer timeout in seconds; unset means no limit.
    pub transfer_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Checks every value against the ranges the CLI accepts.
    pub fn validate(&self) -> Result<()> {
        if let Some(parallel) = self.parallel
            && !(1..=100).contains(&parallel)
        {
            bail!("Invalid config value for `parallel`: {parallel}. Expected range: 1..=100");
        }
        check_range("page_connect_timeout_secs", self.page_connect_timeout_secs, 3600)?;
        check_range("page_read_timeout_secs", self.page_read_timeout_secs, 3600)?;
        check_range("transfer_timeout_secs", self.transfer_timeout_secs, 86_400)?;
        Ok(())
    }
}

fn check_range(field: &str, value: Option<u64>, max: u64) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=max).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..={max}");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the tracing filter this label stands for.
    #[must_use]
    pub fn filter(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/errdownload/config.toml`
/// 2. `$HOME/.config/errdownload/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(CONFIG_DIR).join(CONFIG_FILE));
    }
    let home = env_var_non_empty_os("HOME")?;
    Some(PathBuf::from(home).join(".config").join(CONFIG_DIR).join(CONFIG_FILE))
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads configuration.
///
/// An explicit path must exist; the default path is optional.
pub fn load(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return load_file_config(path).map(Some);
    }
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

/// Reads and parses the config file at `path`.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "parallel" => {
                let parsed = parse_integer(value).with_context(invalid)?;
                let parallel = u8::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("Integer value out of range for u8"))
                    .with_context(invalid)?;
                cfg.parallel = Some(parallel);
            }
            "downloads" => {
                cfg.downloads = Some(parse_path(value).with_context(invalid)?);
            }
            "rtmpdump" => {
                cfg.rtmpdump = Some(parse_path(value).with_context(invalid)?);
            }
            "output_dir" => {
                cfg.output_dir = Some(parse_path(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            "page_connect_timeout_secs" => {
                cfg.page_connect_timeout_secs = Some(parse_integer(value).with_context(invalid)?);
            }
            "page_read_timeout_secs" => {
                cfg.page_read_timeout_secs = Some(parse_integer(value).with_context(invalid)?);
            }
            "transfer_timeout_secs" => {
                cfg.transfer_timeout_secs = Some(parse_integer(value).with_context(invalid)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    let Some(inner) = raw_value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        bail!("Expected double-quoted string");
    };
    Ok(inner.to_string())
}

fn parse_path(raw_value: &str) -> Result<PathBuf> {
    let parsed = parse_string_literal(raw_value)?;
    if parsed.is_empty() {
        bail!("Expected non-empty path");
    }
    Ok(PathBuf::from(parsed))
}

fn parse_integer(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_all_fields() {
        let raw = r#"
# defaults for the nightly run
parallel = 4
downloads = "/var/lib/errdownload/downloaded.csv"
rtmpdump = "/usr/local/bin/rtmpdump"
output_dir = "/srv/media" # trailing comment
verbosity = "verbose"
page_connect_timeout_secs = 5
page_read_timeout_secs = 60
transfer_timeout_secs = 7200
"#;
        let cfg = parse_config_str(raw).unwrap();
        assert_eq!(cfg.parallel, Some(4));
        assert_eq!(
            cfg.downloads,
            Some(PathBuf::from("/var/lib/errdownload/downloaded.csv"))
        );
        assert_eq!(cfg.rtmpdump, Some(PathBuf::from("/usr/local/bin/rtmpdump")));
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/srv/media")));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert_eq!(cfg.page_connect_timeout_secs, Some(5));
        assert_eq!(cfg.page_read_timeout_secs, Some(60));
        assert_eq!(cfg.transfer_timeout_secs, Some(7200));
    }

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str("parallel = 2\n").unwrap();
        assert_eq!(cfg.parallel, Some(2));
        assert!(cfg.downloads.is_none());
        assert!(cfg.verbosity.is_none());
    }

    #[test]
    fn test_parse_config_empty_is_default() {
        assert_eq!(parse_config_str("\n# nothing\n").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_parse_config_hash_inside_string_is_kept() {
        let cfg = parse_config_str(r#"output_dir = "/srv/#media""#).unwrap();
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/srv/#media")));
    }

    #[test]
    fn test_parse_config_unknown_key_names_line() {
        let err = parse_config_str("parallel = 2\nconcurrency = 3\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("concurrency"), "got: {msg}");
        assert!(msg.contains("line 2"), "got: {msg}");
    }

    #[test]
    fn test_parse_config_missing_equals_rejected() {
        let err = parse_config_str("parallel 2").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_config_parallel_zero_rejected() {
        let err = parse_config_str("parallel = 0").unwrap_err();
        assert!(err.to_string().contains("parallel"));
    }

    #[test]
    fn test_parse_config_parallel_over_max_rejected() {
        assert!(parse_config_str("parallel = 101").is_err());
        assert!(parse_config_str("parallel = 300").is_err());
    }

    #[test]
    fn test_parse_config_timeout_ranges() {
        assert!(parse_config_str("page_read_timeout_secs = 3601").is_err());
        assert!(parse_config_str("page_connect_timeout_secs = 0").is_err());
        assert!(parse_config_str("transfer_timeout_secs = 86400").is_ok());
        assert!(parse_config_str("transfer_timeout_secs = 86401").is_err());
    }

    #[test]
    fn test_parse_config_unquoted_path_rejected() {
        let err = parse_config_str("downloads = downloaded.csv").unwrap_err();
        assert!(format!("{err:#}").contains("double-quoted"));
    }

    #[test]
    fn test_parse_config_negative_integer_rejected() {
        assert!(parse_config_str("page_read_timeout_secs = -5").is_err());
    }

    #[test]
    fn test_parse_config_unknown_verbosity_rejected() {
        let err = parse_config_str(r#"verbosity = "loud""#).unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_verbosity_filters() {
        assert_eq!(VerbositySetting::Default.filter(), "info");
        assert_eq!(VerbositySetting::Verbose.filter(), "debug");
        assert_eq!(VerbositySetting::Quiet.filter(), "error");
        assert_eq!(VerbositySetting::Debug.filter(), "trace");
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "parallel = 3\n").unwrap();
        let cfg = load(Some(&path)).unwrap().unwrap();
        assert_eq!(cfg.parallel, Some(3));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

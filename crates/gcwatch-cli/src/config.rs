//! Config - コマンドライン引数と設定
//!
//! 優先順位: フラグ / 環境変数 > 設定ファイル（TOML） > 既定値

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use gcwatch_core::app::{DEFAULT_POLL_INTERVAL, Labels};
use gcwatch_core::impls::HttpClientConfig;
use serde::Deserialize;

use crate::logging::LogFormat;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unable to read config file {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("server URL must not be empty")]
    EmptyUrl,
    #[error("poll interval must be greater than 0")]
    ZeroInterval,
    #[error("request timeout must be greater than 0")]
    ZeroTimeout,
}

#[derive(Parser, Debug)]
#[command(name = "gcwatch", author, version, about = "Watch and run datastore garbage collection", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Server URL, e.g. https://backup.example.com:8007
    #[arg(long, env = "GCWATCH_URL", global = true)]
    pub url: Option<String>,

    /// API token (user@realm!name:secret)
    #[arg(long, env = "GCWATCH_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long, env = "GCWATCH_POLL_INTERVAL_MS", global = true)]
    pub poll_interval_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, env = "GCWATCH_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long, env = "GCWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Node name used for task lookups
    #[arg(long, env = "GCWATCH_NODE", global = true)]
    pub node: Option<String>,

    /// Configuration file path (optional)
    #[arg(long, env = "GCWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "GCWATCH_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Poll and print the grid whenever it changes, until Ctrl-C
    Watch,
    /// Load once and print the grid
    List {
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start garbage collection now and follow the task
    Run { store: String },
    /// Follow the last garbage collection task of a datastore
    Log { store: String },
    /// Set the GC schedule (calendar event), or clear it when omitted
    Schedule { store: String, event: Option<String> },
    /// List namespaces of a datastore
    Namespaces {
        store: String,
        /// Check that a namespace exists
        #[arg(long)]
        check: Option<String>,
    },
}

/// Contents of the optional TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub verify_tls: Option<bool>,
    pub node: Option<String>,
    pub labels: Labels,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::File {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub token: Option<String>,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub verify_tls: bool,
    pub node: String,
    pub labels: Labels,
}

impl Settings {
    pub fn resolve(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    pub fn merge(args: &GlobalArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let defaults = HttpClientConfig::default();

        let settings = Self {
            base_url: args.url.clone().or(file.url).unwrap_or(defaults.base_url),
            token: args.token.clone().or(file.token),
            poll_interval: args
                .poll_interval_ms
                .or(file.poll_interval_ms)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            timeout: args
                .timeout_secs
                .or(file.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            verify_tls: !args.insecure && file.verify_tls.unwrap_or(defaults.verify_tls),
            node: args.node.clone().or(file.node).unwrap_or(defaults.node),
            labels: file.labels,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            base_url: self.base_url.clone(),
            api_token: self.token.clone(),
            timeout: self.timeout,
            verify_tls: self.verify_tls,
            node: self.node.clone(),
            ..HttpClientConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args() -> GlobalArgs {
        GlobalArgs {
            log_level: "info".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_without_file() {
        let settings = Settings::merge(&args(), FileConfig::default()).unwrap();

        assert_eq!(settings.base_url, "https://localhost:8007");
        assert_eq!(settings.poll_interval, Duration::from_millis(5000));
        assert!(settings.verify_tls);
        assert_eq!(settings.labels, Labels::default());
    }

    #[test]
    fn file_values_fill_missing_flags() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
url = "https://pbs.example.com:8007"
poll_interval_ms = 2000
verify_tls = false

[labels]
none = "Keine"
"#
        )
        .unwrap();

        let mut args = args();
        args.config = Some(file.path().to_path_buf());
        args.poll_interval_ms = Some(1000);

        let settings = Settings::resolve(&args).unwrap();

        assert_eq!(settings.base_url, "https://pbs.example.com:8007");
        assert_eq!(settings.poll_interval, Duration::from_millis(1000));
        assert!(!settings.verify_tls);
        assert_eq!(settings.labels.none, "Keine");
        assert_eq!(settings.labels.root, "Root");
    }

    #[test]
    fn insecure_flag_wins_over_file() {
        let file = FileConfig {
            verify_tls: Some(true),
            ..Default::default()
        };
        let mut args = args();
        args.insecure = true;

        assert!(!Settings::merge(&args, file).unwrap().verify_tls);
    }

    #[rstest]
    #[case::empty_url(Some(""), None, "server URL must not be empty")]
    #[case::zero_interval(None, Some(0), "poll interval must be greater than 0")]
    fn rejects_invalid_settings(
        #[case] url: Option<&str>,
        #[case] interval: Option<u64>,
        #[case] message: &str,
    ) {
        let mut args = args();
        args.url = url.map(str::to_string);
        args.poll_interval_ms = interval;

        let err = Settings::merge(&args, FileConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut args = args();
        args.config = Some(PathBuf::from("/nonexistent/gcwatch.toml"));

        assert!(matches!(
            Settings::resolve(&args),
            Err(ConfigError::File { .. })
        ));
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from([
            "gcwatch",
            "--url",
            "https://pbs:8007",
            "schedule",
            "store1",
            "daily",
        ])
        .unwrap();

        assert_eq!(cli.global.url.as_deref(), Some("https://pbs:8007"));
        assert_eq!(
            cli.command,
            Command::Schedule {
                store: "store1".into(),
                event: Some("daily".into()),
            }
        );

        let cli = Cli::try_parse_from(["gcwatch", "namespaces", "store1", "--check", "dev"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Namespaces {
                store: "store1".into(),
                check: Some("dev".into()),
            }
        );
    }
}

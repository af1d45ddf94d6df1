//! Configuration management for CLI, environment variables, and config files.

use crate::cli::Cli;
use crate::error::{TorrentFilterError, ValidationIssue};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "TORRENT_MONTH_FILTER";

/// Main configuration for torrent-month-filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for the rqbit API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub request_timeout: u64,
}

/// Configuration for fetching torrent files over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout: u64,
    pub max_torrent_size: u64,
}

/// Configuration for the download loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub output_dir: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub server_wait_secs: u64,
    pub forget_on_exit: bool,
}

/// Configuration for logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3030".to_string(),
            username: None,
            password: None,
            max_retries: 3,
            retry_delay_ms: 500,
            request_timeout: 60,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            max_torrent_size: 64 * 1024 * 1024,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            poll_interval_ms: 1000,
            server_wait_secs: 5,
            forget_on_exit: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username.clone(), password.clone())),
            _ => None,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl DownloadConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn server_wait(&self) -> Duration {
        Duration::from_secs(self.server_wait_secs)
    }
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, suffix)).ok()
}

fn parse_env_number<T: std::str::FromStr>(
    suffix: &str,
    val: &str,
) -> Result<T, TorrentFilterError> {
    if val.is_empty() || !val.chars().all(|c| c.is_ascii_digit()) {
        return Err(TorrentFilterError::InvalidArgument(format!(
            "{}_{} has invalid format",
            ENV_PREFIX, suffix
        )));
    }
    val.parse().map_err(|_| {
        TorrentFilterError::InvalidArgument(format!("{}_{} has invalid format", ENV_PREFIX, suffix))
    })
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, TorrentFilterError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TorrentFilterError::IoError(format!("{}: {}", path.display(), e)))?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Ok(toml::from_str(&content)?),
        }
    }

    pub fn from_default_locations() -> Result<Self, TorrentFilterError> {
        let config_paths = [
            dirs::config_dir().map(|d| d.join("torrent-month-filter/config.toml")),
            Some(PathBuf::from("/etc/torrent-month-filter/config.toml")),
            Some(PathBuf::from("./torrent-month-filter.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    pub fn merge_from_env(mut self) -> Result<Self, TorrentFilterError> {
        if let Some(val) = env_var("API_URL") {
            self.api.url = val;
        }
        if let Some(val) = env_var("MAX_RETRIES") {
            self.api.max_retries = parse_env_number("MAX_RETRIES", &val)?;
        }
        if let Some(val) = env_var("FETCH_TIMEOUT") {
            self.fetch.timeout = parse_env_number("FETCH_TIMEOUT", &val)?;
        }
        if let Some(val) = env_var("DOWNLOAD_DIR") {
            self.download.output_dir = Some(PathBuf::from(val));
        }
        if let Some(val) = env_var("POLL_INTERVAL_MS") {
            self.download.poll_interval_ms = parse_env_number("POLL_INTERVAL_MS", &val)?;
        }
        if let Some(val) = env_var("LOG_LEVEL") {
            self.logging.level = val;
        }

        // Auth credentials - support both individual fields and combined format
        if let Some(auth_str) = env_var("AUTH_USERPASS") {
            if let Some((username, password)) = auth_str.split_once(':') {
                self.api.username = Some(username.to_string());
                self.api.password = Some(password.to_string());
            }
        } else {
            if let Some(val) = env_var("AUTH_USERNAME") {
                self.api.username = Some(val);
            }
            if let Some(val) = env_var("AUTH_PASSWORD") {
                self.api.password = Some(val);
            }
        }

        Ok(self)
    }

    pub fn merge_from_cli(mut self, cli: &Cli) -> Self {
        if let Some(ref url) = cli.api_url {
            self.api.url = url.clone();
        }

        if let Some(ref dir) = cli.download_dir {
            self.download.output_dir = Some(dir.clone());
        }

        match cli.verbose {
            0 => {}
            1 => self.logging.level = "debug".to_string(),
            _ => self.logging.level = "trace".to_string(),
        }

        self
    }

    /// Layer defaults, the config file, the environment and the command line.
    pub fn load_with_cli(cli: &Cli) -> Result<Self, TorrentFilterError> {
        let base = match cli.config {
            Some(ref path) => Self::from_file(path)?,
            None => Self::from_default_locations()?,
        };
        Ok(base.merge_from_env()?.merge_from_cli(cli))
    }

    pub fn validate(&self) -> Result<(), TorrentFilterError> {
        let mut issues = Vec::new();

        if self.api.url.is_empty() {
            issues.push(ValidationIssue {
                field: "api.url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else if let Err(e) = reqwest::Url::parse(&self.api.url) {
            issues.push(ValidationIssue {
                field: "api.url".to_string(),
                message: format!("Invalid URL format: {}", e),
            });
        }

        if self.api.request_timeout == 0 || self.api.request_timeout > 3600 {
            issues.push(ValidationIssue {
                field: "api.request_timeout".to_string(),
                message: "Timeout must be between 1 and 3600 seconds".to_string(),
            });
        }

        if self.fetch.timeout == 0 || self.fetch.timeout > 3600 {
            issues.push(ValidationIssue {
                field: "fetch.timeout".to_string(),
                message: "Timeout must be between 1 and 3600 seconds".to_string(),
            });
        }

        if self.fetch.max_torrent_size == 0 {
            issues.push(ValidationIssue {
                field: "fetch.max_torrent_size".to_string(),
                message: "Maximum torrent size must be positive".to_string(),
            });
        }

        if self.download.poll_interval_ms == 0 || self.download.poll_interval_ms > 60_000 {
            issues.push(ValidationIssue {
                field: "download.poll_interval_ms".to_string(),
                message: "Poll interval must be between 1 and 60000 milliseconds".to_string(),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            issues.push(ValidationIssue {
                field: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(TorrentFilterError::ValidationError(issues))
        }
    }
}

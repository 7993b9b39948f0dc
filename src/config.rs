use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8006/api";
const DEFAULT_POLL_INTERVAL: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

#[derive(Parser, Debug, Default)]
#[command(name = "a9s", about = "k9s-style terminal UI for AutoGPT agent schedules")]
pub struct Cli {
    /// Agent platform API base URL
    #[arg(long, env = "A9S_API_URL")]
    pub api_url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, env = "A9S_API_KEY")]
    pub api_key: Option<String>,

    /// Polling interval in seconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Log file path
    #[arg(long, env = "A9S_LOG_FILE")]
    pub log_file: Option<String>,

    /// Config file path (defaults to <config dir>/a9s/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub poll_interval: Option<u64>,
    pub request_timeout: Option<u64>,
    pub log_file: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ignoring unreadable config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("ignoring invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigFile {
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("a9s").join("config.toml"))
    }

    /// `Ok(None)` when there is no config file to read.
    pub fn load(path: Option<PathBuf>) -> Result<Option<Self>, ConfigError> {
        let Some(path) = path.or_else(Self::default_path) else {
            return Ok(None);
        };
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse { path, source })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub log_file: Option<String>,
}

impl Settings {
    /// Command line and environment win over the config file, which wins
    /// over built-in defaults.
    pub fn resolve(cli: Cli, file: ConfigFile) -> Self {
        Self {
            api_url: cli
                .api_url
                .or(file.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key: cli.api_key.or(file.api_key).filter(|k| !k.is_empty()),
            poll_interval: Duration::from_secs(
                cli.poll_interval
                    .or(file.poll_interval)
                    .unwrap_or(DEFAULT_POLL_INTERVAL)
                    .max(1),
            ),
            request_timeout: Duration::from_secs(
                cli.request_timeout
                    .or(file.request_timeout)
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            ),
            log_file: cli.log_file.or(file.log_file),
        }
    }
}

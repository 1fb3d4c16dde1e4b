//! Configuration file handling for video-forge.
//!
//! Loads configuration from `~/.config/video-forge/config.toml` or a custom path.
//! The API key is normally taken from the `API_KEY` environment variable.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gemini::{
    PollPolicy, API_KEY_ENV, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_TEXT_MODEL, DEFAULT_VIDEO_MODEL,
    GEMINI_API_BASE_URL,
};

/// Configuration file structure for video-forge.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Fallback when `API_KEY` is not set in the environment.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_video_model")]
    pub video_model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            text_model: default_text_model(),
            video_model: default_video_model(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
    /// Zero polls until the job is done.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub backoff: bool,
    #[serde(default = "default_backoff_max_secs")]
    pub backoff_max_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            max_attempts: default_max_attempts(),
            backoff: false,
            backoff_max_secs: default_backoff_max_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProgressConfig {
    #[serde(default = "default_step_secs")]
    pub step_secs: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            step_secs: default_step_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub download: bool,
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download: true,
            download_dir: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    GEMINI_API_BASE_URL.to_string()
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_video_model() -> String {
    DEFAULT_VIDEO_MODEL.to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_max_attempts() -> Option<u32> {
    Some(DEFAULT_MAX_POLL_ATTEMPTS)
}

fn default_backoff_max_secs() -> u64 {
    60
}

fn default_step_secs() -> u64 {
    5
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            Self::load_explicit(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from a file that must exist.
    pub fn load_explicit(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve the provider key: environment first, then the config file.
    ///
    /// A missing key is fatal; the client cannot be constructed without it.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        pick_api_key(from_env, self.provider.api_key.clone())
    }

    /// Polling behaviour for the generation workflow.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.polling.interval_secs),
            max_attempts: self.polling.max_attempts.filter(|n| *n > 0),
            backoff: self.polling.backoff,
            backoff_max: Duration::from_secs(self.polling.backoff_max_secs),
        }
    }

    /// Period of the cosmetic progress ticker.
    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress.step_secs.max(1))
    }
}

fn pick_api_key(from_env: Option<String>, from_file: Option<String>) -> Result<String, ConfigError> {
    from_env
        .into_iter()
        .chain(from_file)
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or(ConfigError::MissingApiKey)
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    MissingApiKey,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::MissingApiKey => {
                write!(f, "{} environment variable not set", API_KEY_ENV)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::MissingApiKey => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("video-forge").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/video-forge/config.toml")
        })
}

/// Contents written by `video-forge config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# video-forge configuration

[provider]
# The API key is read from the API_KEY environment variable (or a .env file).
# api_key = "..."
base_url = "https://generativelanguage.googleapis.com"
text_model = "gemini-2.5-pro"
video_model = "veo-2.0-generate-001"

[polling]
# Seconds between job status checks
interval_secs = 10
# Give up after this many checks (0 polls until the job is done)
max_attempts = 360
# Grow the delay between checks exponentially, up to backoff_max_secs
backoff = false
backoff_max_secs = 60

[progress]
# Seconds between progress messages while a video is generating
step_secs = 5

[output]
# Download the finished video
download = true
# download_dir = "/path/to/videos"
"#;

//! Configuration loading for todoist-mcp
//!
//! Configuration is loaded from:
//! 1. Environment variables (`TODOIST_API_TOKEN`, legacy `API_KEY`,
//!    `TODOIST_REST_URL`, `TODOIST_SYNC_URL`, `TODOIST_TIMEOUT_SECS`)
//! 2. Environment variable TODOIST_CONFIG_PATH
//! 3. ~/.binks/todoist.toml
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    /// No bearer token was configured
    #[error("Missing required configuration: API token (set TODOIST_API_TOKEN or API_KEY)")]
    MissingToken,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
}

/// Todoist API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Personal API token used as the bearer credential
    #[serde(default)]
    pub token: String,
    /// Base URL of the REST surface
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Base URL of the Sync surface (command queue and completed items)
    #[serde(default = "default_sync_url")]
    pub sync_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_rest_url() -> String {
    "https://api.todoist.com/rest/v2".to_string()
}

fn default_sync_url() -> String {
    "https://api.todoist.com/sync/v9".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            rest_url: default_rest_url(),
            sync_url: default_sync_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from file (if any) and apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_path() {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from: {}", path.display());
                Self::from_file(&path)?
            }
            _ => {
                tracing::info!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TODOIST_API_TOKEN").or_else(|| lookup("API_KEY")) {
            self.api.token = token;
        }
        if let Some(url) = lookup("TODOIST_REST_URL") {
            self.api.rest_url = url;
        }
        if let Some(url) = lookup("TODOIST_SYNC_URL") {
            self.api.sync_url = url;
        }
        if let Some(value) = lookup("TODOIST_TIMEOUT_SECS") {
            self.api.timeout_secs = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "TODOIST_TIMEOUT_SECS",
                value,
            })?;
        }
        Ok(())
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(())
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("TODOIST_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        dirs::home_dir().map(|home| home.join(".binks").join("todoist.toml"))
    }
}

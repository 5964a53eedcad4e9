//! Configuration - File-backed defaults for the CLI
//!
//! Values come from, in order of precedence: command-line flags and their
//! environment variables, the TOML configuration file, then built-in
//! defaults. The file is looked up at `--config`, `./bucketscan.toml`, and the
//! per-user config directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COMPLETION_TIMEOUT_SECS, DEFAULT_DLP_ENDPOINT, DEFAULT_MAX_MESSAGES,
    DEFAULT_PUBSUB_ENDPOINT, DEFAULT_PULL_INTERVAL_MS, DEFAULT_SETTLE_DELAY_MS,
};
use crate::watcher::WatchSettings;

/// Config file name in the working and user config directories
pub const CONFIG_FILE_NAME: &str = "bucketscan.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub endpoints: EndpointConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project used when `--project` is not given
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub dlp: String,
    pub pubsub: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            dlp: DEFAULT_DLP_ENDPOINT.to_string(),
            pubsub: DEFAULT_PUBSUB_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub completion_timeout_secs: u64,
    pub settle_delay_ms: u64,
    pub pull_interval_ms: u64,
    pub max_messages: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            completion_timeout_secs: DEFAULT_COMPLETION_TIMEOUT_SECS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            pull_interval_ms: DEFAULT_PULL_INTERVAL_MS,
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

impl WatchConfig {
    pub fn to_settings(&self) -> WatchSettings {
        WatchSettings {
            completion_timeout: Duration::from_secs(self.completion_timeout_secs),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            pull_interval: Duration::from_millis(self.pull_interval_ms),
            max_messages: self.max_messages.max(1),
        }
    }
}

impl Config {
    /// Load from an explicit path, failing if it cannot be read or parsed
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration from {:?}", path))
    }

    /// Load from the first existing search path, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for path in search_paths() {
            if path.is_file() {
                tracing::debug!("Loading configuration from {:?}", path);
                return Self::from_file(&path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Serialize as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Config file search order (first found is used)
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dirs) = ProjectDirs::from("dev", "bucketscan", "bucketscan") {
        paths.push(dirs.config_dir().join("config.toml"));
    }
    paths
}

//! Configuration file loading for the `chess` binary.
//!
//! Settings come from `chess.toml` in the current directory. A missing file
//! means defaults; a present but malformed one is an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// `log_level` is not one of trace, debug, info, warn, error.
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

/// Settings for the `chess` binary.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChessConfig {
    /// Directory holding one JSON file per match. Defaults to "data".
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Maximum level of log output. Defaults to "info".
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Player name used when a command is given no `--as`.
    #[serde(default)]
    pub player: Option<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ChessConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            player: None,
        }
    }
}

impl ChessConfig {
    /// Loads `chess.toml` from the current directory, or defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads the configuration at `path`, or defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// [`ConfigError::ParseError`] if it contains invalid TOML, or
    /// [`ConfigError::InvalidLogLevel`] if `log_level` is not recognised.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.level()?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        PathBuf::from("chess.toml")
    }

    /// The configured log level as a tracing [`Level`].
    pub fn level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}

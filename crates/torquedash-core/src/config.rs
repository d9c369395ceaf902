//! Cluster configuration
//!
//! Stored as `torquedash.json`. Every field has a default, so a partial file (or no
//! file at all) is valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::datalog::{DEFAULT_LOG_FILE, DEFAULT_MAX_LOG_BYTES};
use crate::dtc::DEFAULT_DTC_FILE;
use crate::i18n::Language;

/// Config file name looked up in the working directory and the user config dir
pub const CONFIG_FILE: &str = "torquedash.json";

/// Errors loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`ClusterConfig`]
    #[error("Invalid config {path}: {source}")]
    Parse {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A field is out of range
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// Runtime configuration of the cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Simulation and animation tick rate (Hz)
    pub fast_tick_hz: u32,

    /// Telemetry logging tick rate (Hz)
    pub slow_tick_hz: u32,

    /// Directory holding the telemetry logs
    pub log_dir: PathBuf,

    /// File name of the active log
    pub log_file_name: String,

    /// Rotate the active log once it is larger than this many bytes
    pub max_log_bytes: u64,

    /// Whether telemetry logging starts enabled
    pub logging_enabled: bool,

    /// DTC table source
    pub dtc_path: PathBuf,

    /// Fixed seed for the engine simulation; entropy when absent
    pub seed: Option<u64>,

    /// Label language
    pub language: Language,

    /// Profile active at startup
    pub initial_profile: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            fast_tick_hz: 20,
            slow_tick_hz: 1,
            log_dir: PathBuf::from("logs"),
            log_file_name: DEFAULT_LOG_FILE.to_string(),
            max_log_bytes: DEFAULT_MAX_LOG_BYTES,
            logging_enabled: true,
            dtc_path: PathBuf::from(DEFAULT_DTC_FILE),
            seed: None,
            language: Language::default(),
            initial_profile: "Economy".to_string(),
        }
    }
}

impl ClusterConfig {
    /// User config directory for TorqueDash
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("torquedash"))
    }

    /// Config file candidates in lookup order: working directory, then user config dir
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = Self::config_dir() {
            paths.push(dir.join(CONFIG_FILE));
        }
        paths
    }

    /// Load from the first existing search path, or defaults if none exists
    pub fn discover() -> Result<Self, ConfigError> {
        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::from_file(path),
            None => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ClusterConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fast_tick_hz == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fast_tick_hz",
                message: "must be positive".to_string(),
            });
        }
        if self.slow_tick_hz == 0 {
            return Err(ConfigError::InvalidValue {
                field: "slow_tick_hz",
                message: "must be positive".to_string(),
            });
        }
        if self.max_log_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_log_bytes",
                message: "must be positive".to_string(),
            });
        }
        if self.log_file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_file_name",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Fast tick period in milliseconds
    pub fn fast_period_ms(&self) -> u64 {
        1000 / u64::from(self.fast_tick_hz.max(1))
    }

    /// Slow tick period in milliseconds
    pub fn slow_period_ms(&self) -> u64 {
        1000 / u64::from(self.slow_tick_hz.max(1))
    }
}

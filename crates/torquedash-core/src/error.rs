//! Cluster errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::datalog::LoggerError;
use crate::dtc::DtcError;
use crate::profile::ProfileError;

/// Any error the cluster core can report
#[derive(Error, Debug)]
pub enum ClusterError {
    /// Config file problem
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// DTC source problem
    #[error("Trouble code table error: {0}")]
    Dtc(#[from] DtcError),

    /// Telemetry log write or rotation failure
    #[error("Telemetry log error: {0}")]
    Io(#[from] LoggerError),

    /// Rejected profile operation
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}

impl ClusterError {
    /// Whether the error came from the configuration layer (config file or DTC source)
    pub fn is_config(&self) -> bool {
        matches!(self, ClusterError::Config(_) | ClusterError::Dtc(_))
    }
}

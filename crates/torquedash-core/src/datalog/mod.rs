//! Telemetry Logging
//!
//! Persists simulated samples to a CSV log with size-bounded rotation.

mod format;
mod recorder;

pub use format::{read_log, LOG_HEADER, TIMESTAMP_FORMAT};
pub use recorder::{LogOutcome, TelemetryLogger, DEFAULT_LOG_FILE, DEFAULT_MAX_LOG_BYTES};

use std::io;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while writing, rotating or reading a telemetry log
#[derive(Error, Debug)]
pub enum LoggerError {
    /// Creating, opening or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Renaming the active file to its backup failed
    #[error("Failed to rotate {from} to {to}: {source}")]
    Rotate {
        /// Active log file
        from: PathBuf,
        /// Backup name
        to: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A row could not be read back
    #[error("Malformed log row at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What is wrong with it
        message: String,
    },
}

impl LoggerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoggerError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single telemetry sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Local wall-clock time of the sample
    pub timestamp: NaiveDateTime,
    /// Engine speed
    pub rpm: i32,
    /// Engine torque
    pub torque: i32,
    /// Name of the active profile when the sample was taken
    pub profile: String,
}

impl LogRecord {
    /// Create a new log record
    pub fn new(timestamp: NaiveDateTime, rpm: i32, torque: i32, profile: impl Into<String>) -> Self {
        Self {
            timestamp,
            rpm,
            torque,
            profile: profile.into(),
        }
    }
}

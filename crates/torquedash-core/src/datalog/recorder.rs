//! Telemetry logger
//!
//! Appends samples to the active log file. Before each append the file size is
//! checked; once it exceeds the cap the file is renamed with a timestamp suffix and a
//! fresh file (with a fresh header) takes its place.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use super::format::{write_header, write_record};
use super::{LogRecord, LoggerError};

/// Default name of the active log file
pub const DEFAULT_LOG_FILE: &str = "vehicle_log.csv";

/// Default rotation threshold (10 MiB)
pub const DEFAULT_MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Suffix layout of rotated files
const ROTATION_SUFFIX_FORMAT: &str = "%Y%m%d_%H%M%S";

/// What a call to [`TelemetryLogger::log`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    /// Logging is disabled, nothing was written
    Disabled,
    /// The record was appended to the active file
    Appended,
    /// The active file was rotated to the given path, then the record was appended
    Rotated(PathBuf),
}

/// Size-bounded CSV telemetry logger
#[derive(Debug)]
pub struct TelemetryLogger {
    /// Directory holding the active and rotated logs
    dir: PathBuf,
    /// File name of the active log
    file_name: String,
    /// Rotate once the active file is larger than this
    max_bytes: u64,
    /// Whether logging is active
    is_enabled: bool,
    /// Records appended since creation
    records_written: u64,
    /// Rotations performed since creation
    rotations: u64,
}

impl TelemetryLogger {
    /// Create a logger writing `file_name` inside `dir`, creating the directory if needed
    pub fn new(
        dir: impl Into<PathBuf>,
        file_name: impl Into<String>,
        max_bytes: u64,
    ) -> Result<Self, LoggerError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| LoggerError::io(&dir, e))?;
        tracing::debug!("Telemetry log directory ready at {}", dir.display());

        Ok(Self {
            dir,
            file_name: file_name.into(),
            max_bytes,
            is_enabled: true,
            records_written: 0,
            rotations: 0,
        })
    }

    /// Create a logger with the default file name and 10 MiB cap
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self, LoggerError> {
        Self::new(dir, DEFAULT_LOG_FILE, DEFAULT_MAX_LOG_BYTES)
    }

    /// Path of the active log file
    pub fn active_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Directory holding the logs
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rotation threshold in bytes
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Enable or disable logging
    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    /// Records appended since creation
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Rotations performed since creation
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Append a sample, rotating first if the active file is over the cap
    pub fn log(
        &mut self,
        timestamp: NaiveDateTime,
        rpm: i32,
        torque: i32,
        profile: &str,
    ) -> Result<LogOutcome, LoggerError> {
        self.append(&LogRecord::new(timestamp, rpm, torque, profile))
    }

    /// Append a prepared record
    pub fn append(&mut self, record: &LogRecord) -> Result<LogOutcome, LoggerError> {
        if !self.is_enabled {
            return Ok(LogOutcome::Disabled);
        }

        let path = self.active_path();
        let rotated = if self.current_size(&path)? > self.max_bytes {
            Some(self.rotate(&path, record.timestamp)?)
        } else {
            None
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::io(&path, e))?;
        let is_new = file
            .metadata()
            .map_err(|e| LoggerError::io(&path, e))?
            .len()
            == 0;

        let mut writer = BufWriter::new(file);
        let written: io::Result<()> = (|| {
            if is_new {
                write_header(&mut writer)?;
            }
            write_record(&mut writer, record)?;
            writer.flush()
        })();
        written.map_err(|e| LoggerError::io(&path, e))?;

        self.records_written += 1;
        Ok(match rotated {
            Some(to) => LogOutcome::Rotated(to),
            None => LogOutcome::Appended,
        })
    }

    fn current_size(&self, path: &Path) -> Result<u64, LoggerError> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(LoggerError::io(path, e)),
        }
    }

    /// Rename the active file to a timestamped backup
    fn rotate(&mut self, path: &Path, timestamp: NaiveDateTime) -> Result<PathBuf, LoggerError> {
        let target = self.rotation_path(timestamp);
        fs::rename(path, &target).map_err(|source| LoggerError::Rotate {
            from: path.to_path_buf(),
            to: target.clone(),
            source,
        })?;
        self.rotations += 1;
        tracing::info!(
            "Rotated telemetry log {} to {}",
            path.display(),
            target.display()
        );
        Ok(target)
    }

    /// Backup name for a rotation at `timestamp`, e.g. `vehicle_log_20240309_140507.csv`.
    ///
    /// A second rotation within the same second gets a numeric suffix instead of
    /// overwriting the first backup.
    fn rotation_path(&self, timestamp: NaiveDateTime) -> PathBuf {
        let file_path = Path::new(&self.file_name);
        let stem = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.file_name.as_str());
        let extension = file_path.extension().and_then(|e| e.to_str());
        let suffix = timestamp.format(ROTATION_SUFFIX_FORMAT).to_string();

        let name_for = |counter: u32| {
            let base = if counter == 0 {
                format!("{}_{}", stem, suffix)
            } else {
                format!("{}_{}_{}", stem, suffix, counter)
            };
            match extension {
                Some(ext) => format!("{}.{}", base, ext),
                None => base,
            }
        };

        let mut counter = 0;
        loop {
            let candidate = self.dir.join(name_for(counter));
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }
}

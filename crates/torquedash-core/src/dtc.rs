//! Diagnostic Trouble Codes
//!
//! Static table mapping trouble codes to descriptions, loaded once from a plain text
//! source with one `CODE description` pair per line.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default DTC table file name
pub const DEFAULT_DTC_FILE: &str = "DTC_codes.txt";

/// Errors loading a DTC source
#[derive(Error, Debug)]
pub enum DtcError {
    /// The source file does not exist
    #[error("DTC file not found: {0}")]
    NotFound(PathBuf),

    /// The source file exists but could not be read
    #[error("Failed to read DTC file {path}: {source}")]
    Unreadable {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Immutable trouble code table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DtcTable {
    codes: HashMap<String, String>,
}

impl DtcTable {
    /// Parse a DTC source.
    ///
    /// The first whitespace run separates code from description. Lines without a
    /// separator are skipped; a repeated code keeps its last description.
    pub fn load(source: &str) -> Self {
        let mut codes = HashMap::new();
        for line in source.lines() {
            let line = line.trim();
            let Some((code, description)) = line.split_once(char::is_whitespace) else {
                continue;
            };
            codes.insert(code.to_string(), description.trim().to_string());
        }
        Self { codes }
    }

    /// Read and parse a DTC file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DtcError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                DtcError::NotFound(path.to_path_buf())
            } else {
                DtcError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let table = Self::load(&content);
        tracing::info!("Loaded {} trouble codes from {}", table.len(), path.display());
        Ok(table)
    }

    /// Look up a code (exact, case-sensitive)
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    /// Number of codes
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// All codes, sorted
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.codes.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

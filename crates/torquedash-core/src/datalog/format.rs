//! Log file format
//!
//! CSV with a `Timestamp,RPM,Torque,Profile` header. The profile name is the only free
//! text column and is always last, so it is quoted only when it contains a comma or a
//! quote.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDateTime;

use super::{LogRecord, LoggerError};

/// Header row of every log file
pub const LOG_HEADER: &str = "Timestamp,RPM,Torque,Profile";

/// Timestamp layout used in log rows
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write the header row
pub(crate) fn write_header<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{}", LOG_HEADER)
}

/// Write one data row
pub(crate) fn write_record<W: Write>(writer: &mut W, record: &LogRecord) -> io::Result<()> {
    writeln!(
        writer,
        "{},{},{},{}",
        record.timestamp.format(TIMESTAMP_FORMAT),
        record.rpm,
        record.torque,
        quote_field(&record.profile)
    )
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn unquote_field(field: &str) -> String {
    match field
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => field.to_string(),
    }
}

/// Parse one data row
pub(crate) fn parse_record(line: &str, line_no: usize) -> Result<LogRecord, LoggerError> {
    let malformed = |message: String| LoggerError::Parse {
        line: line_no,
        message,
    };

    let mut fields = line.splitn(4, ',');
    let (Some(timestamp), Some(rpm), Some(torque), Some(profile)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed(format!("expected 4 columns in '{}'", line)));
    };

    let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .map_err(|e| malformed(format!("bad timestamp '{}': {}", timestamp, e)))?;
    let rpm = rpm
        .parse()
        .map_err(|e| malformed(format!("bad RPM '{}': {}", rpm, e)))?;
    let torque = torque
        .parse()
        .map_err(|e| malformed(format!("bad torque '{}': {}", torque, e)))?;

    Ok(LogRecord::new(timestamp, rpm, torque, unquote_field(profile)))
}

/// Read every data row of a log file
pub fn read_log<P: AsRef<Path>>(path: P) -> Result<Vec<LogRecord>, LoggerError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| LoggerError::io(path, e))?;

    let mut lines = content.lines().enumerate();
    match lines.next() {
        Some((_, header)) if header == LOG_HEADER => {}
        Some((_, header)) => {
            return Err(LoggerError::Parse {
                line: 1,
                message: format!("unexpected header '{}'", header),
            })
        }
        None => return Ok(Vec::new()),
    }

    lines
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| parse_record(line, idx + 1))
        .collect()
}

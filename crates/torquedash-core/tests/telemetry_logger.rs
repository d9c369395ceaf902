//! Tests for telemetry logging and rotation

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use torquedash_core::datalog::{read_log, LogOutcome, LoggerError, TelemetryLogger, LOG_HEADER};

/// Length of "Timestamp,RPM,Torque,Profile\n"
const HEADER_BYTES: u64 = 29;
/// Length of "2024-03-09 14:05:07,3120,500,Sport\n"
const ROW_BYTES: u64 = 35;

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .unwrap()
}

fn log_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_header_written_once() {
    let dir = TempDir::new().unwrap();
    let mut logger = TelemetryLogger::in_dir(dir.path()).unwrap();

    for i in 0..25 {
        let outcome = logger.log(at(10, 0, i), 1000 + i as i32, 455, "Economy").unwrap();
        assert_eq!(outcome, LogOutcome::Appended);
    }

    assert_eq!(log_files(dir.path()), vec!["vehicle_log.csv"]);
    let content = fs::read_to_string(logger.active_path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 26);
    assert_eq!(lines[0], LOG_HEADER);
    assert_eq!(lines.iter().filter(|l| **l == LOG_HEADER).count(), 1);
    assert_eq!(lines[1], "2024-03-09 10:00:00,1000,455,Economy");
    assert_eq!(logger.records_written(), 25);
    assert_eq!(logger.rotations(), 0);
}

#[test]
fn test_appends_to_existing_file_without_new_header() {
    let dir = TempDir::new().unwrap();
    {
        let mut logger = TelemetryLogger::in_dir(dir.path()).unwrap();
        logger.log(at(9, 0, 0), 900, 455, "Sport").unwrap();
    }
    let mut logger = TelemetryLogger::in_dir(dir.path()).unwrap();
    logger.log(at(9, 0, 1), 950, 501, "Sport").unwrap();

    let records = read_log(logger.active_path()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].rpm, 950);
}

#[test]
fn test_single_rotation_when_cap_exceeded() {
    let dir = TempDir::new().unwrap();
    // Header plus ten rows is one byte over the cap
    let cap = HEADER_BYTES + 10 * ROW_BYTES - 1;
    let mut logger = TelemetryLogger::new(dir.path(), "vehicle_log.csv", cap).unwrap();

    let mut rotated = Vec::new();
    for i in 0..15 {
        match logger.log(at(14, 5, 7), 3120, 500, "Sport").unwrap() {
            LogOutcome::Rotated(path) => rotated.push((i, path)),
            LogOutcome::Appended => {}
            LogOutcome::Disabled => panic!("logger should be enabled"),
        }
    }

    assert_eq!(rotated.len(), 1);
    let (index, backup) = &rotated[0];
    assert_eq!(*index, 10);
    assert_eq!(backup, &dir.path().join("vehicle_log_20240309_140507.csv"));
    assert_eq!(logger.rotations(), 1);

    assert_eq!(
        log_files(dir.path()),
        vec!["vehicle_log.csv", "vehicle_log_20240309_140507.csv"]
    );

    let backup_content = fs::read_to_string(backup).unwrap();
    assert_eq!(backup_content.len() as u64, HEADER_BYTES + 10 * ROW_BYTES);

    let active = fs::read_to_string(logger.active_path()).unwrap();
    let lines: Vec<&str> = active.lines().collect();
    assert_eq!(lines[0], LOG_HEADER);
    assert_eq!(lines.len(), 6);
}

#[test]
fn test_rotations_in_same_second_do_not_overwrite() {
    let dir = TempDir::new().unwrap();
    let mut logger = TelemetryLogger::new(dir.path(), "vehicle_log.csv", 1).unwrap();

    for _ in 0..3 {
        logger.log(at(8, 30, 0), 3120, 500, "Sport").unwrap();
    }

    assert_eq!(logger.rotations(), 2);
    assert_eq!(
        log_files(dir.path()),
        vec![
            "vehicle_log.csv",
            "vehicle_log_20240309_083000.csv",
            "vehicle_log_20240309_083000_1.csv",
        ]
    );
}

#[test]
fn test_write_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut logger = TelemetryLogger::in_dir(dir.path()).unwrap();
    // A directory in place of the active file makes every open fail
    fs::create_dir(logger.active_path()).unwrap();

    let err = logger.log(at(12, 0, 0), 900, 455, "Economy").unwrap_err();
    assert!(matches!(err, LoggerError::Io { .. }));
    assert_eq!(logger.records_written(), 0);
}

#[test]
fn test_directory_creation_failure() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("logs");
    fs::write(&blocker, "not a directory").unwrap();

    let err = TelemetryLogger::in_dir(blocker.join("inner")).unwrap_err();
    assert!(matches!(err, LoggerError::Io { .. }));
}

#[test]
fn test_read_log_round_trip_fields() {
    let dir = TempDir::new().unwrap();
    let mut logger = TelemetryLogger::in_dir(dir.path()).unwrap();
    logger.log(at(23, 59, 59), 7600, 0, "Track, wet").unwrap();

    let records = read_log(logger.active_path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].timestamp, at(23, 59, 59));
    assert_eq!(records[0].rpm, 7600);
    assert_eq!(records[0].torque, 0);
    assert_eq!(records[0].profile, "Track, wet");
}

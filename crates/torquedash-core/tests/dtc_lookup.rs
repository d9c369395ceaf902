//! Tests for the trouble code table

use std::fs;

use tempfile::TempDir;
use torquedash_core::dtc::{DtcError, DtcTable};

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("DTC_codes.txt");
    fs::write(
        &path,
        "P0300 Random/Multiple Cylinder Misfire Detected\n\
         P0420 Catalyst System Efficiency Below Threshold (Bank 1)\n\
         P0171 System Too Lean (Bank 1)",
    )
    .unwrap();

    let table = DtcTable::from_file(&path).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.lookup("P0171"), Some("System Too Lean (Bank 1)"));
    assert_eq!(table.lookup("P0300"), Some("Random/Multiple Cylinder Misfire Detected"));
}

#[test]
fn test_utf8_descriptions() {
    let table = DtcTable::load("P0300 Rastgele/Çoklu Silindir Ateşleme Arızası\n");
    assert_eq!(
        table.lookup("P0300"),
        Some("Rastgele/Çoklu Silindir Ateşleme Arızası")
    );
}

#[test]
fn test_empty_source() {
    let table = DtcTable::load("");
    assert!(table.is_empty());
    assert_eq!(table.lookup("P0300"), None);
}

#[test]
fn test_directory_is_unreadable() {
    let dir = TempDir::new().unwrap();
    let err = DtcTable::from_file(dir.path()).unwrap_err();
    assert!(matches!(err, DtcError::Unreadable { .. }));
}

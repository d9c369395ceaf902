//! Tests for the cluster session: ticks, notices and profile switching

use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use torquedash_core::datalog::{read_log, LogOutcome};
use torquedash_core::prelude::*;

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

fn config_in(dir: &Path) -> ClusterConfig {
    let dtc_path = dir.join("DTC_codes.txt");
    fs::write(
        &dtc_path,
        "P0300 Random Misfire\nP0420 Catalyst Efficiency\n",
    )
    .unwrap();

    ClusterConfig {
        log_dir: dir.join("logs"),
        dtc_path,
        seed: Some(42),
        ..ClusterConfig::default()
    }
}

#[test]
fn test_startup_without_notices() {
    let dir = TempDir::new().unwrap();
    let mut session = ClusterSession::new(config_in(dir.path()));

    assert!(session.take_notices().is_empty());
    assert_eq!(session.dtc_table().len(), 2);
    assert_eq!(session.catalog().active_name(), "Economy");
    assert!(session.is_logging());
    assert!(dir.path().join("logs").is_dir());
}

#[test]
fn test_missing_dtc_file_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let config = ClusterConfig {
        dtc_path: dir.path().join("missing.txt"),
        ..config_in(dir.path())
    };
    let mut session = ClusterSession::new(config);

    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(session.dtc_table().is_empty());

    // Ticks keep working
    let frame = session.fast_tick(0);
    assert!(frame.simulated.rpm >= 800);
}

#[test]
fn test_dtc_check_notices() {
    let dir = TempDir::new().unwrap();
    let mut session = ClusterSession::new(config_in(dir.path()));

    assert_eq!(session.check_dtc("  P0300 "), Some("Random Misfire".to_string()));
    assert_eq!(session.check_dtc("P9999"), None);
    assert_eq!(session.check_dtc("   "), None);

    let notices = session.take_notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].title, "Fault Code Found");
    assert_eq!(notices[0].message, "P0300: Random Misfire");
    assert_eq!(notices[1].level, NoticeLevel::Warning);
    assert_eq!(notices[1].title, "Fault Code Not Found");
}

#[test]
fn test_displayed_values_settle_on_simulated() {
    let dir = TempDir::new().unwrap();
    let mut session = ClusterSession::new(config_in(dir.path()));

    let mut last = None;
    for tick in 0..100u64 {
        last = Some(session.fast_tick(tick * 50));
    }
    let last = last.unwrap();
    assert!(last.simulated.rpm <= 6000);

    // Longest possible sweep is 2 ms per RPM across the whole axis
    let settled = session.frame_at(last.now_ms + 2 * 6000);
    assert_eq!(settled.rpm_displayed, last.simulated.rpm);
    assert_eq!(settled.torque_displayed, last.simulated.torque);
    assert_eq!(settled.profile, "Economy");
    assert_eq!(settled.rpm_axis.max, 6000);
}

#[test]
fn test_same_seed_same_frames() {
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    let mut a = ClusterSession::new(config_in(dir_a.path()));
    let mut b = ClusterSession::new(config_in(dir_b.path()));

    for tick in 0..50u64 {
        assert_eq!(a.fast_tick(tick * 50), b.fast_tick(tick * 50));
    }
}

#[test]
fn test_slow_tick_logs_active_profile() {
    let dir = TempDir::new().unwrap();
    let mut session = ClusterSession::new(config_in(dir.path()));

    session.fast_tick(0);
    assert_eq!(session.slow_tick(start()), Some(LogOutcome::Appended));

    session.select_profile("Sport").unwrap();
    session.fast_tick(50);
    session.slow_tick(start() + Duration::seconds(1));

    let path = session.logger().unwrap().active_path();
    let records = read_log(path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].profile, "Economy");
    assert_eq!(records[1].profile, "Sport");
    assert_eq!(records[1].rpm, session.state().rpm);
    assert_eq!(records[1].torque, session.state().torque);
}

#[test]
fn test_logging_toggle() {
    let dir = TempDir::new().unwrap();
    let config = ClusterConfig {
        logging_enabled: false,
        ..config_in(dir.path())
    };
    let mut session = ClusterSession::new(config);

    assert!(!session.is_logging());
    assert_eq!(session.slow_tick(start()), None);
    assert!(!session.logger().unwrap().active_path().exists());

    session.set_logging(true);
    assert_eq!(session.slow_tick(start()), Some(LogOutcome::Appended));
}

#[test]
fn test_log_failure_skips_tick() {
    let dir = TempDir::new().unwrap();
    let mut session = ClusterSession::new(config_in(dir.path()));
    let active = session.logger().unwrap().active_path();
    fs::create_dir(&active).unwrap();

    assert_eq!(session.slow_tick(start()), None);
    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);

    // The next tick is the retry
    fs::remove_dir(&active).unwrap();
    assert_eq!(
        session.slow_tick(start() + Duration::seconds(1)),
        Some(LogOutcome::Appended)
    );
}

#[test]
fn test_profile_errors_become_notices() {
    let dir = TempDir::new().unwrap();
    let mut session = ClusterSession::new(config_in(dir.path()));

    assert_eq!(
        session.delete_profile("Economy"),
        Err(ProfileError::ActiveProfile("Economy".to_string()))
    );
    assert_eq!(
        session.select_profile("Rally"),
        Err(ProfileError::NotFound("Rally".to_string()))
    );
    assert!(session.create_profile("Sport", 9000, 1.0, None).is_err());

    let notices = session.take_notices();
    assert_eq!(notices.len(), 3);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Warning));
    assert_eq!(session.catalog().len(), 3);
}

#[test]
fn test_unknown_initial_profile() {
    let dir = TempDir::new().unwrap();
    let config = ClusterConfig {
        initial_profile: "Rally".to_string(),
        ..config_in(dir.path())
    };
    let mut session = ClusterSession::new(config);

    assert_eq!(session.catalog().active_name(), "Economy");
    assert_eq!(session.take_notices().len(), 1);
}

#[test]
fn test_switch_to_lower_ceiling_clamps_immediately() {
    let dir = TempDir::new().unwrap();
    let config = ClusterConfig {
        initial_profile: "Sport".to_string(),
        ..config_in(dir.path())
    };
    let mut session = ClusterSession::new(config);
    session.create_profile("Moped", 900, 0.5, None).unwrap();

    for tick in 0..40u64 {
        session.fast_tick(tick * 50);
    }
    session.select_profile("Moped").unwrap();
    assert!(session.state().rpm <= 900);

    for tick in 40..80u64 {
        let frame = session.fast_tick(tick * 50);
        assert!(frame.simulated.rpm <= 900);
        assert!(frame.rpm_displayed <= 900);
    }
}

#[test]
fn test_scheduler_drives_both_ticks() {
    let dir = TempDir::new().unwrap();
    let mut session = ClusterSession::new(config_in(dir.path()));
    let mut scheduler = TickScheduler::from_rates(20, 1);

    let mut fast = 0;
    let mut slow = 0;
    for now_ms in (0..3000u64).step_by(10) {
        let timestamp = start() + Duration::milliseconds(now_ms as i64);
        for tick in session.run_due(&mut scheduler, now_ms, timestamp) {
            match tick {
                Tick::Fast => fast += 1,
                Tick::Slow => slow += 1,
            }
        }
    }

    assert_eq!(fast, 60);
    assert_eq!(slow, 3);
    let records = read_log(session.logger().unwrap().active_path()).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].timestamp, start() + Duration::seconds(2));
}

#[tokio::test]
async fn test_subscriber_receives_events() {
    let dir = TempDir::new().unwrap();
    let config = ClusterConfig {
        dtc_path: dir.path().join("missing.txt"),
        ..config_in(dir.path())
    };
    let mut session = ClusterSession::new(config);
    let mut events = session.subscribe();

    // Startup notice is replayed first
    match events.recv().await {
        Some(ClusterEvent::Notice(notice)) => assert_eq!(notice.level, NoticeLevel::Error),
        other => panic!("expected startup notice, got {:?}", other),
    }

    let frame = session.fast_tick(0);
    assert_eq!(events.recv().await, Some(ClusterEvent::Frame(frame)));

    session.rename_profile("Economy", "Eco").unwrap();
    assert_eq!(
        events.recv().await,
        Some(ClusterEvent::ProfileChanged {
            name: "Eco".to_string()
        })
    );

    session.select_profile("Diesel").unwrap();
    assert_eq!(
        events.recv().await,
        Some(ClusterEvent::ProfileChanged {
            name: "Diesel".to_string()
        })
    );

    // Events no longer queue up as pending notices once subscribed
    session.check_dtc("P0300");
    assert!(session.take_notices().is_empty());
    assert!(matches!(events.recv().await, Some(ClusterEvent::Notice(_))));
}

#[test]
fn test_notices_kept_after_subscriber_dropped() {
    let dir = TempDir::new().unwrap();
    let mut session = ClusterSession::new(config_in(dir.path()));
    drop(session.subscribe());

    session.fast_tick(0);
    session.check_dtc("P0420");

    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Fault Code Found");
    assert_eq!(notices[0].message, "P0420: Catalyst Efficiency");
}

#[test]
fn test_rotation_notice_title() {
    let dir = TempDir::new().unwrap();
    let config = ClusterConfig {
        max_log_bytes: 1,
        ..config_in(dir.path())
    };
    let mut session = ClusterSession::new(config);

    assert_eq!(session.slow_tick(start()), Some(LogOutcome::Appended));
    assert!(matches!(
        session.slow_tick(start() + Duration::seconds(1)),
        Some(LogOutcome::Rotated(_))
    ));

    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Info);
    assert_eq!(notices[0].title, "Log Rotated");
    assert!(notices[0].message.contains("vehicle_log_20240309_120001.csv"));
}

//! TorqueDash - headless instrument cluster runner
//!
//! Drives a cluster session from tokio timers on a single thread, prints notices and
//! accepts profile/DTC commands on stdin.

mod commands;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use commands::{Command, ProfileCommand, Toggle};
use torquedash_core::prelude::*;

/// What the loop should do after a command
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClusterConfig::discover().context("Failed to load configuration")?;
    let mut scheduler = TickScheduler::from_rates(config.fast_tick_hz, config.slow_tick_hz);
    let mut session = ClusterSession::new(config);
    let mut events = session.subscribe();

    let labels = session.labels();
    println!("{} - torquedash {}", labels.window_title, torquedash_core::VERSION);
    println!("Type 'help' for commands");

    let start_time = Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_millis(scheduler.fast_period_ms()));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut last_frame: Option<Frame> = None;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now_ms = start_time.elapsed().as_millis() as u64;
                session.run_due(&mut scheduler, now_ms, Local::now().naive_local());
            }
            Some(event) = events.recv() => {
                match event {
                    ClusterEvent::Frame(frame) => last_frame = Some(frame),
                    ClusterEvent::Notice(notice) => print_notice(&notice),
                    ClusterEvent::ProfileChanged { name } => {
                        println!("{}: {}", session.labels().profile, name);
                    }
                }
            }
            line = stdin.next_line(), if stdin_open => {
                match line.context("Failed to read stdin")? {
                    Some(line) => {
                        if handle_line(&mut session, &line, last_frame.as_ref()) == Flow::Quit {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("stdin closed, running until interrupted");
                        stdin_open = false;
                    }
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn handle_line(session: &mut ClusterSession, line: &str, last_frame: Option<&Frame>) -> Flow {
    let command = match commands::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Flow::Continue,
        Err(e) => {
            // Help goes to stdout, parse errors to stderr
            let _ = e.print();
            return Flow::Continue;
        }
    };

    // Failures already arrive as notices on the event channel
    match command {
        Command::Profile { command } => handle_profile(session, command),
        Command::Dtc { code } => {
            session.check_dtc(&code);
        }
        Command::Log { state } => session.set_logging(state == Toggle::On),
        Command::Status => match last_frame {
            Some(frame) => print_frame(session.labels(), frame, session.is_logging()),
            None => println!("no frame yet"),
        },
        Command::Quit => return Flow::Quit,
    }
    Flow::Continue
}

fn handle_profile(session: &mut ClusterSession, command: ProfileCommand) {
    match command {
        ProfileCommand::List => {
            let active = session.catalog().active_id();
            for (id, profile) in session.catalog().iter() {
                let marker = if id == active { "*" } else { " " };
                let fuel = profile
                    .fuel_type
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{} {:<16} max {:>6} rpm  factor {:.2}  {}",
                    marker, profile.name, profile.max_rpm, profile.torque_factor, fuel
                );
            }
        }
        ProfileCommand::Create {
            name,
            max_rpm,
            torque_factor,
            fuel_type,
        } => {
            let _ = session.create_profile(&name, max_rpm, torque_factor, fuel_type);
        }
        ProfileCommand::Rename { old, new } => {
            let _ = session.rename_profile(&old, &new);
        }
        ProfileCommand::Delete { name } => {
            let _ = session.delete_profile(&name);
        }
        ProfileCommand::Select { name } => {
            let _ = session.select_profile(&name);
        }
    }
}

fn print_frame(labels: &torquedash_core::i18n::Labels, frame: &Frame, logging: bool) {
    let redline = if frame.rpm_zone == GaugeZone::Redline {
        " [REDLINE]"
    } else {
        ""
    };
    println!(
        "{}: {}  {} {:>5}/{}{}  {} {:>3}/{}  log {}",
        labels.profile,
        frame.profile,
        labels.rpm_gauge,
        frame.rpm_displayed,
        frame.rpm_axis.max,
        redline,
        labels.torque_gauge,
        frame.torque_displayed,
        frame.torque_axis.max,
        if logging { "on" } else { "off" },
    );
}

fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Info => println!("{}: {}", notice.title, notice.message),
        NoticeLevel::Warning | NoticeLevel::Error => {
            eprintln!("{}: {}", notice.title, notice.message)
        }
    }
}

//! # TorqueDash Core Library
//!
//! Simulation and telemetry engine behind the TorqueDash instrument cluster.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Driving profiles (rev ceiling, torque factor, fuel type)
//! - Tick-based RPM/torque simulation with an injectable random source
//! - Gauge animation from simulated to displayed values
//! - CSV telemetry logging with size-bounded rotation
//! - Diagnostic trouble code lookup
//!
//! The presentation layer drives a [`session::ClusterSession`] from a
//! [`scheduler::TickScheduler`] and renders the frames it returns.
//!
//! ## Example
//!
//! ```rust,ignore
//! use torquedash_core::prelude::*;
//!
//! let mut session = ClusterSession::new(ClusterConfig::default());
//! let mut scheduler = TickScheduler::from_rates(20, 1);
//!
//! let now = chrono::Local::now().naive_local();
//! session.run_due(&mut scheduler, 0, now);
//! let frame = session.frame_at(25);
//! println!("RPM: {}", frame.rpm_displayed);
//! ```

pub mod config;
pub mod datalog;
pub mod dtc;
pub mod error;
pub mod gauge;
pub mod i18n;
pub mod profile;
pub mod scheduler;
pub mod session;
pub mod sim;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::ClusterConfig;
    pub use crate::datalog::{LogOutcome, LogRecord, TelemetryLogger};
    pub use crate::dtc::DtcTable;
    pub use crate::error::ClusterError;
    pub use crate::gauge::{GaugeAnimator, GaugeAxis, GaugeId, GaugeZone};
    pub use crate::i18n::Language;
    pub use crate::profile::{FuelType, ProfileCatalog, ProfileDefinition, ProfileError};
    pub use crate::scheduler::{Tick, TickScheduler};
    pub use crate::session::{ClusterEvent, ClusterSession, Frame, Notice, NoticeLevel};
    pub use crate::sim::{SimulationEngine, SimulationState};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Cluster Session
//!
//! Owns every piece of cluster state for one run of the application and exposes the
//! entry points the presentation layer calls: the fast and slow ticks, profile
//! management and trouble code lookup.
//!
//! Nothing here paints or blocks. Each fast tick returns a [`Frame`] of plain data, and
//! the same frames plus user-facing [`Notice`]s are pushed to an optional event channel
//! for collaborators that prefer to subscribe. Errors are recovered here and turned
//! into notices; none of them stop the session.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::SendError;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::config::ClusterConfig;
use crate::datalog::{LogOutcome, TelemetryLogger};
use crate::dtc::DtcTable;
use crate::error::ClusterError;
use crate::gauge::{GaugeAnimator, GaugeAxis, GaugeId, GaugeZone};
use crate::i18n::Labels;
use crate::profile::{FuelType, ProfileCatalog, ProfileDefinition, ProfileError};
use crate::scheduler::{Tick, TickScheduler};
use crate::sim::{SimulationEngine, SimulationState};

/// Notices kept while nobody is subscribed
const MAX_PENDING_NOTICES: usize = 64;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    /// Informational result
    Info,
    /// Rejected request, nothing changed
    Warning,
    /// A component failed
    Error,
}

/// A user-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Localized title
    pub title: String,
    /// Detail text
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// Values to render for one repaint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Session time of the frame (ms)
    pub now_ms: u64,
    /// Raw simulated values
    pub simulated: SimulationState,
    /// RPM shown on the dial
    pub rpm_displayed: i32,
    /// Torque shown on the dial
    pub torque_displayed: i32,
    /// RPM axis of the active profile
    pub rpm_axis: GaugeAxis,
    /// Torque axis
    pub torque_axis: GaugeAxis,
    /// Zone of the displayed RPM
    pub rpm_zone: GaugeZone,
    /// Active profile name
    pub profile: String,
}

/// Events pushed to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClusterEvent {
    /// New values after a fast tick
    Frame(Frame),
    /// Something the user should see
    Notice(Notice),
    /// The active profile changed or was renamed
    ProfileChanged {
        /// Name of the active profile
        name: String,
    },
}

/// One running instrument cluster
pub struct ClusterSession<R = StdRng> {
    config: ClusterConfig,
    catalog: ProfileCatalog,
    engine: SimulationEngine<R>,
    animator: GaugeAnimator,
    /// `None` when the log directory could not be created
    logger: Option<TelemetryLogger>,
    dtc: DtcTable,
    labels: &'static Labels,
    events: Option<UnboundedSender<ClusterEvent>>,
    pending: VecDeque<Notice>,
}

impl ClusterSession<StdRng> {
    /// Start a session from configuration, seeding the engine from `config.seed`
    pub fn new(config: ClusterConfig) -> Self {
        let engine = match config.seed {
            Some(seed) => SimulationEngine::seeded(seed),
            None => SimulationEngine::new(),
        };
        Self::with_engine(config, engine)
    }
}

impl<R: Rng> ClusterSession<R> {
    /// Start a session around an existing engine.
    ///
    /// Loads the DTC table and opens the telemetry log. Failures of either are queued
    /// as notices and the session continues with an empty table or without logging.
    pub fn with_engine(config: ClusterConfig, engine: SimulationEngine<R>) -> Self {
        let labels = config.language.labels();
        let mut session = Self {
            catalog: ProfileCatalog::with_builtin(),
            engine,
            animator: GaugeAnimator::new(),
            logger: None,
            dtc: DtcTable::default(),
            labels,
            events: None,
            pending: VecDeque::new(),
            config,
        };

        match DtcTable::from_file(&session.config.dtc_path) {
            Ok(table) => session.dtc = table,
            Err(e) => session.report(e.into()),
        }

        match TelemetryLogger::new(
            &session.config.log_dir,
            session.config.log_file_name.clone(),
            session.config.max_log_bytes,
        ) {
            Ok(mut logger) => {
                logger.set_enabled(session.config.logging_enabled);
                session.logger = Some(logger);
            }
            Err(e) => session.report(e.into()),
        }

        let initial = session.config.initial_profile.clone();
        if let Err(e) = session.catalog.select(&initial) {
            session.report(e.into());
        }
        let profile = session.catalog.active().clone();
        session.engine.rebase(&profile);

        session
    }

    /// Replace the DTC table
    pub fn set_dtc_table(&mut self, table: DtcTable) {
        self.dtc = table;
    }

    /// Subscribe to frames and notices.
    ///
    /// Notices raised before anyone subscribed are delivered first. A new subscription
    /// replaces the previous one.
    pub fn subscribe(&mut self) -> UnboundedReceiver<ClusterEvent> {
        let (tx, rx) = unbounded_channel();
        for notice in self.pending.drain(..) {
            let _ = tx.send(ClusterEvent::Notice(notice));
        }
        self.events = Some(tx);
        rx
    }

    /// Notices raised while nobody was subscribed
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.pending.drain(..).collect()
    }

    /// Configuration the session was started with
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Active labels
    pub fn labels(&self) -> &'static Labels {
        self.labels
    }

    /// Profile catalog (read-only; mutate through the session so ticks see a consistent state)
    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    /// Current simulated values
    pub fn state(&self) -> SimulationState {
        self.engine.state()
    }

    /// The DTC table
    pub fn dtc_table(&self) -> &DtcTable {
        &self.dtc
    }

    /// The telemetry logger, if the log directory is usable
    pub fn logger(&self) -> Option<&TelemetryLogger> {
        self.logger.as_ref()
    }

    // ------------------------------------------------------------------
    // Ticks
    // ------------------------------------------------------------------

    /// Fast tick: advance the simulation and retarget both gauges
    pub fn fast_tick(&mut self, now_ms: u64) -> Frame {
        let state = self.engine.tick(self.catalog.active());
        self.animator.animate(GaugeId::Rpm, state.rpm, now_ms);
        self.animator.animate(GaugeId::Torque, state.torque, now_ms);

        let frame = self.frame_at(now_ms);
        self.emit(ClusterEvent::Frame(frame.clone()));
        frame
    }

    /// Values to render at `now_ms` without advancing the simulation (repaint between ticks)
    pub fn frame_at(&self, now_ms: u64) -> Frame {
        let profile = self.catalog.active();
        let rpm_axis = GaugeAxis::rpm_for(profile);
        let torque_axis = GaugeAxis::torque();
        let rpm_displayed = rpm_axis.clamp(self.animator.displayed(GaugeId::Rpm, now_ms));
        let torque_displayed = torque_axis.clamp(self.animator.displayed(GaugeId::Torque, now_ms));

        Frame {
            now_ms,
            simulated: self.engine.state(),
            rpm_displayed,
            torque_displayed,
            rpm_axis,
            torque_axis,
            rpm_zone: rpm_axis.zone(rpm_displayed),
            profile: profile.name.clone(),
        }
    }

    /// Slow tick: append the current sample to the telemetry log.
    ///
    /// Returns `None` when logging is off or the write failed; a failure is reported
    /// as a notice and the sample is dropped.
    pub fn slow_tick(&mut self, timestamp: NaiveDateTime) -> Option<LogOutcome> {
        let state = self.engine.state();
        let logger = self.logger.as_mut()?;
        if !logger.is_enabled() {
            return None;
        }

        match logger.log(timestamp, state.rpm, state.torque, self.catalog.active_name()) {
            Ok(outcome) => {
                if let LogOutcome::Rotated(path) = &outcome {
                    let message = format!("Log rotated to {}", path.display());
                    self.notify(NoticeLevel::Info, self.labels.log_rotated, message);
                }
                Some(outcome)
            }
            Err(e) => {
                tracing::warn!("Telemetry tick skipped: {}", e);
                self.report(e.into());
                None
            }
        }
    }

    /// Run every tick `scheduler` reports due at `now_ms`
    pub fn run_due(
        &mut self,
        scheduler: &mut TickScheduler,
        now_ms: u64,
        timestamp: NaiveDateTime,
    ) -> Vec<Tick> {
        let due = scheduler.due(now_ms);
        for tick in &due {
            match tick {
                Tick::Fast => {
                    self.fast_tick(now_ms);
                }
                Tick::Slow => {
                    self.slow_tick(timestamp);
                }
            }
        }
        due
    }

    /// Turn telemetry logging on or off
    pub fn set_logging(&mut self, enabled: bool) {
        match self.logger.as_mut() {
            Some(logger) => {
                logger.set_enabled(enabled);
                tracing::info!("Telemetry logging {}", if enabled { "enabled" } else { "disabled" });
            }
            None if enabled => {
                let message = format!(
                    "Logging unavailable, {} could not be opened",
                    self.config.log_dir.display()
                );
                self.notify(NoticeLevel::Warning, self.labels.error, message);
            }
            None => {}
        }
    }

    /// Whether samples are currently being logged
    pub fn is_logging(&self) -> bool {
        self.logger.as_ref().is_some_and(|l| l.is_enabled())
    }

    // ------------------------------------------------------------------
    // Profile management
    // ------------------------------------------------------------------

    /// Add a profile
    pub fn create_profile(
        &mut self,
        name: &str,
        max_rpm: u32,
        torque_factor: f64,
        fuel_type: Option<FuelType>,
    ) -> Result<(), ProfileError> {
        let result = self
            .catalog
            .create(name, max_rpm, torque_factor, fuel_type)
            .map(|_| ());
        self.reported(result)
    }

    /// Rename a profile; renaming the active profile emits a profile change
    pub fn rename_profile(&mut self, old: &str, new: &str) -> Result<(), ProfileError> {
        let was_active = self.catalog.active_name() == old;
        let result = self.catalog.rename(old, new);
        if result.is_ok() && was_active {
            self.emit(ClusterEvent::ProfileChanged {
                name: new.to_string(),
            });
        }
        self.reported(result)
    }

    /// Remove a profile other than the active one
    pub fn delete_profile(&mut self, name: &str) -> Result<ProfileDefinition, ProfileError> {
        let result = self.catalog.delete(name);
        self.reported(result)
    }

    /// Make a profile active; the next tick runs against it
    pub fn select_profile(&mut self, name: &str) -> Result<(), ProfileError> {
        let result = self.catalog.select(name).cloned();
        match result {
            Ok(profile) => {
                self.engine.rebase(&profile);
                self.emit(ClusterEvent::ProfileChanged { name: profile.name });
                Ok(())
            }
            Err(e) => self.reported(Err(e)),
        }
    }

    // ------------------------------------------------------------------
    // Trouble codes
    // ------------------------------------------------------------------

    /// Look up a user-entered trouble code and notify the result
    pub fn check_dtc(&mut self, input: &str) -> Option<String> {
        let code = input.trim();
        if code.is_empty() {
            return None;
        }
        match self.dtc.lookup(code).map(str::to_string) {
            Some(description) => {
                self.notify(
                    NoticeLevel::Info,
                    self.labels.dtc_found,
                    format!("{}: {}", code, description),
                );
                Some(description)
            }
            None => {
                self.notify(
                    NoticeLevel::Warning,
                    self.labels.dtc_not_found,
                    format!("{} not found in {}", code, self.config.dtc_path.display()),
                );
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Notices
    // ------------------------------------------------------------------

    /// Turn an error into a user-visible notice
    pub fn report(&mut self, error: ClusterError) {
        let level = match error {
            ClusterError::Profile(_) => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };
        tracing::warn!("{}", error);
        self.notify(level, self.labels.error, error.to_string());
    }

    fn reported<T>(&mut self, result: Result<T, ProfileError>) -> Result<T, ProfileError> {
        if let Err(e) = &result {
            self.report(e.clone().into());
        }
        result
    }

    /// Deliver a notice, or keep it for [`ClusterSession::take_notices`] when nobody listens
    fn notify(&mut self, level: NoticeLevel, title: &str, message: String) {
        let notice = Notice::new(level, title, message);
        if let Some(ClusterEvent::Notice(notice)) = self.emit(ClusterEvent::Notice(notice)) {
            if self.pending.len() >= MAX_PENDING_NOTICES {
                self.pending.pop_front();
            }
            self.pending.push_back(notice);
        }
    }

    /// Send an event to the subscriber. Returns the event when it could not be delivered.
    fn emit(&mut self, event: ClusterEvent) -> Option<ClusterEvent> {
        let Some(tx) = &self.events else {
            return Some(event);
        };
        match tx.send(event) {
            Ok(()) => None,
            Err(SendError(event)) => {
                tracing::debug!("Event subscriber dropped");
                self.events = None;
                Some(event)
            }
        }
    }
}

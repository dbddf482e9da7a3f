//! SignalSimulator: owns the monitor state and the stepping task
//!
//! The simulator is constructed explicitly and shared as `Arc<SignalSimulator>`.
//! While a session is monitoring, a tokio task steps the signal once per tick,
//! then hands the snapshot to the refresh callback and to broadcast
//! subscribers. Start, stop and fault snapshots go to subscribers only. Each
//! tick is a single write-locked critical section; observers run after the
//! lock is released, so they may read the state freely.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Local;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::event_log::LogLevel;
use super::random::{std_source, RandomSource};
use super::state::{MonitorSnapshot, MonitorState, SessionPhase};
use super::stepper::{self, Step};
use super::MonitorError;
use crate::config::SimulatorConfig;
use crate::types::{ActivityProfile, SessionSummary, UserProfile};

/// Observer invoked once per tick with the post-step snapshot.
pub type RefreshCallback = Box<dyn Fn(&MonitorSnapshot) + Send + Sync>;

type SharedCallback = Arc<dyn Fn(&MonitorSnapshot) + Send + Sync>;

pub struct SignalSimulator {
    config: SimulatorConfig,
    state: RwLock<MonitorState>,
    rng: Mutex<Box<dyn RandomSource>>,
    /// At most one refresh callback; the last registration wins.
    refresh: Mutex<Option<SharedCallback>>,
    snapshot_tx: broadcast::Sender<MonitorSnapshot>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SignalSimulator {
    /// Create a simulator with a `StdRng` seeded from the config (or entropy).
    pub fn new(config: SimulatorConfig) -> Result<Arc<Self>, MonitorError> {
        let rng = std_source(config.seed);
        Self::with_random_source(config, rng)
    }

    /// Create a simulator drawing from the given source.
    pub fn with_random_source(
        config: SimulatorConfig,
        source: impl RandomSource + 'static,
    ) -> Result<Arc<Self>, MonitorError> {
        config.validate()?;
        let (snapshot_tx, _) = broadcast::channel(64);
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Arc::new(Self {
            state: RwLock::new(MonitorState::new(&config)),
            config,
            rng: Mutex::new(Box::new(source)),
            refresh: Mutex::new(None),
            snapshot_tx,
            shutdown_tx,
        }))
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    // --- Commands from the presentation layer ---

    /// Store the submitted profile, replacing any earlier one.
    pub fn submit_profile(&self, profile: UserProfile) {
        log::info!("Profile submitted for {}", profile.name);
        self.write_state().set_profile(profile);
    }

    /// Select the activity for the next session. Unknown names are accepted
    /// and resolve to the fallback profile.
    pub fn configure_activity(&self, name: &str) -> ActivityProfile {
        let name = name.trim();
        self.write_state().set_activity(name);
        ActivityProfile::resolve(name)
    }

    /// Select `activity`, open a session and spawn the stepping task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_session(self: &Arc<Self>, activity: &str) -> Result<Uuid, MonitorError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| MonitorError::Runtime(e.to_string()))?;

        // Subscribe before the session opens so a stop racing the spawn is seen.
        let shutdown = self.shutdown_tx.subscribe();
        let session_id = self.open_session(activity)?;

        let simulator = Arc::clone(self);
        handle.spawn(async move {
            simulator.run(session_id, shutdown).await;
        });
        Ok(session_id)
    }

    /// Open a session without a background task. The caller drives it with
    /// [`SignalSimulator::tick`].
    pub fn open_session(&self, activity: &str) -> Result<Uuid, MonitorError> {
        let activity = activity.trim();
        if activity.is_empty() {
            return Err(MonitorError::NoActivitySelected);
        }

        let (session_id, snapshot) = {
            let mut state = self.write_state();
            if state.is_monitoring() {
                return Err(MonitorError::AlreadyMonitoring);
            }
            // A faulted session is still open; close it before starting over.
            if state.session_id().is_some() {
                if let Err(e) = state.end_session(Local::now()) {
                    log::debug!("Discarded faulted session: {}", e);
                }
            }

            let known = ActivityProfile::is_known(activity);
            let profile = ActivityProfile::resolve(activity);
            let session_id = state.begin_session(activity, profile);
            state.log_event(format!("Monitoring started: {}", activity), LogLevel::Info);
            if !known {
                state.log_event(
                    format!("Unknown activity '{}', using default profile", activity),
                    LogLevel::Warning,
                );
            }
            (session_id, state.snapshot())
        };

        log::info!("Session {} started for {}", session_id, activity);
        self.broadcast(snapshot);
        Ok(session_id)
    }

    /// Stop monitoring and close the open session.
    ///
    /// Returns the appended summary, or `None` when no session was open or no
    /// reading was recorded (the session is then dropped silently).
    pub fn stop_session(&self) -> Option<SessionSummary> {
        let _ = self.shutdown_tx.send(());

        let (result, snapshot) = {
            let mut state = self.write_state();
            let result = state.end_session(Local::now());
            (result, state.snapshot())
        };
        self.broadcast(snapshot);

        match result {
            Ok(summary) => Some(summary),
            Err(MonitorError::EmptySession) => {
                log::info!("Session stopped before any reading; no summary recorded");
                None
            }
            Err(e) => {
                log::debug!("Stop ignored: {}", e);
                None
            }
        }
    }

    /// Step the open session once, outside the periodic schedule.
    ///
    /// Returns `Ok(None)` when nothing is monitoring.
    pub fn tick(&self) -> Result<Option<Step>, MonitorError> {
        match self.step_session(None) {
            Err(e) => {
                self.fail_session(None, &e);
                Err(e)
            }
            other => other,
        }
    }

    /// Overwrite the live heart rate before the next step.
    ///
    /// Diagnostic hook for exercising the boundary handling.
    pub fn inject_heart_rate(&self, bpm: f64) {
        log::debug!("Heart rate overridden to {}", bpm);
        self.write_state().set_heart_rate(bpm);
    }

    // --- Observers ---

    /// Register the per-tick observer, replacing any earlier one. It is not
    /// called for session start, stop or fault; use [`SignalSimulator::subscribe`]
    /// for those.
    pub fn set_refresh_callback(&self, callback: RefreshCallback) {
        *self.lock_refresh() = Some(Arc::from(callback));
    }

    pub fn clear_refresh_callback(&self) {
        *self.lock_refresh() = None;
    }

    /// Receive a snapshot after every tick and lifecycle change.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorSnapshot> {
        self.snapshot_tx.subscribe()
    }

    // --- Read accessors ---

    /// Read-only view of the full monitor state.
    pub fn state(&self) -> RwLockReadGuard<'_, MonitorState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        self.state().snapshot()
    }

    pub fn heart_rate(&self) -> f64 {
        self.state().heart_rate()
    }

    pub fn is_monitoring(&self) -> bool {
        self.state().is_monitoring()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state().phase()
    }

    pub fn session_history(&self) -> Vec<SessionSummary> {
        self.state().history_sessions().to_vec()
    }

    // --- Internals ---

    async fn run(self: Arc<Self>, session_id: Uuid, mut shutdown: broadcast::Receiver<()>) {
        let interval = self.config.tick_interval();
        loop {
            match self.step_session(Some(session_id)) {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => {
                    self.fail_session(Some(session_id), &e);
                    break;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.recv() => break,
            }
        }
        log::debug!("Stepping task for session {} exited", session_id);
    }

    /// One tick. With `expected` set, a tick for a session that is no longer
    /// the open one is skipped.
    fn step_session(&self, expected: Option<Uuid>) -> Result<Option<Step>, MonitorError> {
        let (step, snapshot) = {
            let mut state = self.write_state();
            if !state.is_monitoring() {
                return Ok(None);
            }
            if expected.is_some() && state.session_id() != expected {
                return Ok(None);
            }

            let profile = state
                .session_profile()
                .unwrap_or_else(ActivityProfile::fallback);
            let step = {
                let mut rng = self.lock_rng();
                stepper::advance(state.heart_rate(), &profile, &mut **rng)?
            };
            state.record_step(&step);

            if let Some(message) = step.alert_message() {
                log::warn!("{}", message);
            }
            log::debug!("tick {}: {:.2} bpm", state.time_counter(), step.bpm);
            (step, state.snapshot())
        };

        self.notify_tick(snapshot);
        Ok(Some(step))
    }

    fn fail_session(&self, expected: Option<Uuid>, error: &MonitorError) {
        log::error!("Simulation stopped: {}", error);
        let snapshot = {
            let mut state = self.write_state();
            if expected.is_some() && state.session_id() != expected {
                return;
            }
            state.mark_fault(&error.to_string());
            state.log_event(format!("Monitoring halted: {}", error), LogLevel::Alert);
            state.snapshot()
        };
        self.broadcast(snapshot);
    }

    fn notify_tick(&self, snapshot: MonitorSnapshot) {
        let callback = self.lock_refresh().clone();
        if let Some(callback) = callback {
            callback(&snapshot);
        }
        self.broadcast(snapshot);
    }

    fn broadcast(&self, snapshot: MonitorSnapshot) {
        let _ = self.snapshot_tx.send(snapshot);
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, MonitorState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_rng(&self) -> MutexGuard<'_, Box<dyn RandomSource>> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_refresh(&self) -> MutexGuard<'_, Option<SharedCallback>> {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! monitor/state.rs
//!
//! The mutable monitoring state. Consumers get read-only accessors; every
//! mutation goes through crate-private methods driven by the simulator, so
//! vitals, statistics and the event log only change inside a tick.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event_log::{EventLog, LogEntry, LogLevel};
use super::stepper::Step;
use super::window::{HistoryPoint, RollingWindow};
use super::MonitorError;
use crate::config::SimulatorConfig;
use crate::types::{ActivityProfile, SessionSummary, UserProfile};

const PULSE_REST: f64 = 1.0;
const PULSE_BEAT: f64 = 1.2;

/// Where the monitor is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No profile submitted and no activity selected
    ProfileIncomplete,
    /// Profile submitted, no activity selected yet
    ProfileSet,
    /// Activity selected without a submitted profile
    ActivitySelected,
    /// Profile submitted and activity selected
    Ready,
    Monitoring,
}

/// The session currently accumulating readings.
#[derive(Clone, Debug)]
pub(crate) struct ActiveSession {
    pub(crate) id: Uuid,
    pub(crate) activity: String,
    pub(crate) profile: ActivityProfile,
    pub(crate) started_at: DateTime<Utc>,
}

/// Point-in-time copy of the monitor, handed to observers after each tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub activity: String,
    pub heart_rate: f64,
    pub min_bpm: Option<f64>,
    pub max_bpm: Option<f64>,
    pub avg_bpm: Option<f64>,
    pub time_counter: u64,
    pub total_time_seconds: u64,
    pub history: Vec<HistoryPoint>,
    pub logs: Vec<LogEntry>,
    pub pulse_scale: f64,
    pub is_monitoring: bool,
    pub phase: SessionPhase,
    pub last_fault: Option<String>,
}

impl MonitorSnapshot {
    /// Whole-number readout for the live display.
    pub fn heart_rate_label(&self) -> String {
        format!("{}", self.heart_rate.trunc() as i64)
    }

    pub fn min_label(&self) -> String {
        stat_label(self.min_bpm)
    }

    pub fn max_label(&self) -> String {
        stat_label(self.max_bpm)
    }

    pub fn avg_label(&self) -> String {
        stat_label(self.avg_bpm)
    }
}

fn stat_label(value: Option<f64>) -> String {
    value.map_or_else(|| "--".to_string(), |v| format!("{}", v.trunc() as i64))
}

#[derive(Debug)]
pub struct MonitorState {
    profile: Option<UserProfile>,
    activity: String,
    heart_rate: f64,
    initial_heart_rate: f64,
    history: RollingWindow,
    session_readings: Vec<f64>,
    reading_sum: f64,
    min_bpm: Option<f64>,
    max_bpm: Option<f64>,
    avg_bpm: Option<f64>,
    time_counter: u64,
    total_time_seconds: u64,
    logs: EventLog,
    is_monitoring: bool,
    pulse_beat: bool,
    session: Option<ActiveSession>,
    history_sessions: Vec<SessionSummary>,
    last_fault: Option<String>,
}

impl MonitorState {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            profile: None,
            activity: String::new(),
            heart_rate: config.initial_heart_rate,
            initial_heart_rate: config.initial_heart_rate,
            history: RollingWindow::new(config.history_capacity),
            session_readings: Vec::new(),
            reading_sum: 0.0,
            min_bpm: None,
            max_bpm: None,
            avg_bpm: None,
            time_counter: 0,
            total_time_seconds: 0,
            logs: EventLog::new(config.log_capacity),
            is_monitoring: false,
            pulse_beat: false,
            session: None,
            history_sessions: Vec::new(),
            last_fault: None,
        }
    }

    // --- Read accessors ---

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn heart_rate(&self) -> f64 {
        self.heart_rate
    }

    pub fn history(&self) -> &RollingWindow {
        &self.history
    }

    pub fn session_readings(&self) -> &[f64] {
        &self.session_readings
    }

    pub fn min_bpm(&self) -> Option<f64> {
        self.min_bpm
    }

    pub fn max_bpm(&self) -> Option<f64> {
        self.max_bpm
    }

    pub fn avg_bpm(&self) -> Option<f64> {
        self.avg_bpm
    }

    pub fn time_counter(&self) -> u64 {
        self.time_counter
    }

    pub fn total_time_seconds(&self) -> u64 {
        self.total_time_seconds
    }

    pub fn logs(&self) -> &EventLog {
        &self.logs
    }

    pub fn is_monitoring(&self) -> bool {
        self.is_monitoring
    }

    /// Scale factor for the heartbeat animation; alternates every tick.
    pub fn pulse_scale(&self) -> f64 {
        if self.pulse_beat {
            PULSE_BEAT
        } else {
            PULSE_REST
        }
    }

    pub fn history_sessions(&self) -> &[SessionSummary] {
        &self.history_sessions
    }

    pub fn last_fault(&self) -> Option<&str> {
        self.last_fault.as_deref()
    }

    /// Identifier of the open session, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Profile captured when the open session started.
    pub fn session_profile(&self) -> Option<ActivityProfile> {
        self.session.as_ref().map(|s| s.profile)
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_monitoring {
            return SessionPhase::Monitoring;
        }
        match (self.profile.is_some(), !self.activity.is_empty()) {
            (false, false) => SessionPhase::ProfileIncomplete,
            (true, false) => SessionPhase::ProfileSet,
            (false, true) => SessionPhase::ActivitySelected,
            (true, true) => SessionPhase::Ready,
        }
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            activity: self.activity.clone(),
            heart_rate: self.heart_rate,
            min_bpm: self.min_bpm,
            max_bpm: self.max_bpm,
            avg_bpm: self.avg_bpm,
            time_counter: self.time_counter,
            total_time_seconds: self.total_time_seconds,
            history: self.history.to_vec(),
            logs: self.logs.to_vec(),
            pulse_scale: self.pulse_scale(),
            is_monitoring: self.is_monitoring,
            phase: self.phase(),
            last_fault: self.last_fault.clone(),
        }
    }

    // --- Mutation (simulator only) ---

    pub(crate) fn set_profile(&mut self, profile: UserProfile) {
        self.profile = Some(profile);
    }

    pub(crate) fn set_activity(&mut self, activity: &str) {
        self.activity = activity.to_string();
    }

    pub(crate) fn set_heart_rate(&mut self, bpm: f64) {
        self.heart_rate = bpm;
    }

    pub(crate) fn log_event(&mut self, message: impl Into<String>, level: LogLevel) -> bool {
        self.logs.record(message, level)
    }

    /// Reset session statistics and open a new session. The live heart rate
    /// carries over from the previous session unless it is no longer finite.
    pub(crate) fn begin_session(&mut self, activity: &str, profile: ActivityProfile) -> Uuid {
        if !self.heart_rate.is_finite() {
            log::warn!(
                "Heart rate {} reset to {} for the new session",
                self.heart_rate,
                self.initial_heart_rate
            );
            self.heart_rate = self.initial_heart_rate;
        }
        self.activity = activity.to_string();
        self.min_bpm = None;
        self.max_bpm = None;
        self.avg_bpm = None;
        self.total_time_seconds = 0;
        self.time_counter = 0;
        self.session_readings.clear();
        self.reading_sum = 0.0;
        self.history.clear();
        self.logs.clear();
        self.last_fault = None;
        self.is_monitoring = true;

        let id = Uuid::new_v4();
        self.session = Some(ActiveSession {
            id,
            activity: activity.to_string(),
            profile,
            started_at: Utc::now(),
        });
        id
    }

    /// Fold one accepted step into the vitals, statistics, window and log.
    pub(crate) fn record_step(&mut self, step: &Step) {
        self.heart_rate = step.bpm;
        if let Some(message) = step.alert_message() {
            self.logs.record(message, LogLevel::Alert);
        }

        let bpm = step.bpm;
        self.min_bpm = Some(self.min_bpm.map_or(bpm, |m| m.min(bpm)));
        self.max_bpm = Some(self.max_bpm.map_or(bpm, |m| m.max(bpm)));

        self.session_readings.push(bpm);
        self.reading_sum += bpm;
        self.avg_bpm = Some(self.reading_sum / self.session_readings.len() as f64);

        self.time_counter += 1;
        self.total_time_seconds += 1;
        self.history.push(HistoryPoint {
            tick: self.time_counter,
            bpm,
        });

        self.pulse_beat = !self.pulse_beat;
    }

    /// Stop stepping after a fault; the session stays open for `end_session`.
    pub(crate) fn mark_fault(&mut self, reason: &str) {
        self.is_monitoring = false;
        self.last_fault = Some(reason.to_string());
    }

    /// Close the open session and append its summary to the history.
    pub(crate) fn end_session(
        &mut self,
        stopped_at: DateTime<Local>,
    ) -> Result<SessionSummary, MonitorError> {
        self.is_monitoring = false;
        let session = self.session.take().ok_or(MonitorError::NoActiveSession)?;

        let (avg, max, min) = match (self.avg_bpm, self.max_bpm, self.min_bpm) {
            (Some(avg), Some(max), Some(min)) if !self.session_readings.is_empty() => {
                (avg, max, min)
            }
            _ => return Err(MonitorError::EmptySession),
        };

        let summary = SessionSummary::new(
            stopped_at,
            &session.activity,
            self.total_time_seconds,
            avg,
            max,
            min,
        );
        log::info!(
            "Session {} ({}) closed after {} ticks, started {}",
            session.id,
            session.activity,
            self.total_time_seconds,
            session.started_at.to_rfc3339()
        );
        self.history_sessions.push(summary.clone());
        Ok(summary)
    }
}

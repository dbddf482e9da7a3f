//! types/session.rs
//!
//! Summary of one finished monitoring session.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Immutable record appended to the session history when a session stops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Local wall-clock time the session was stopped, "YYYY-MM-DD HH:MM"
    pub date: String,

    pub activity: String,

    /// Elapsed ticks formatted as "m:ss"
    pub duration: String,

    pub total_seconds: u64,

    /// Session mean, rounded to one decimal
    pub avg_bpm: f64,

    /// Session maximum, truncated
    pub max_bpm: i64,

    /// Session minimum, truncated
    pub min_bpm: i64,
}

impl SessionSummary {
    pub fn new(
        stopped_at: DateTime<Local>,
        activity: &str,
        total_seconds: u64,
        avg_bpm: f64,
        max_bpm: f64,
        min_bpm: f64,
    ) -> Self {
        Self {
            date: stopped_at.format("%Y-%m-%d %H:%M").to_string(),
            activity: activity.to_string(),
            duration: format_duration(total_seconds),
            total_seconds,
            avg_bpm: (avg_bpm * 10.0).round() / 10.0,
            max_bpm: max_bpm.trunc() as i64,
            min_bpm: min_bpm.trunc() as i64,
        }
    }
}

/// Format seconds as minutes and zero-padded seconds.
pub fn format_duration(total_seconds: u64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

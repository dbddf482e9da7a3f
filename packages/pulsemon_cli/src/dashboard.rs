//! Terminal rendering of monitor snapshots and session history.

use std::sync::Mutex;

use pulsemon::monitor::{HistoryPoint, LogEntry, LogLevel};
use pulsemon::{MonitorSnapshot, SessionSummary, UserProfile};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const CHART_MIN: f64 = 30.0;
const CHART_MAX: f64 = 180.0;
const CHART_WIDTH: usize = 40;
const ALERTS_SHOWN: usize = 8;

/// Renders each snapshot as one status line, plus any log entries that
/// appeared since the previous snapshot.
pub struct TerminalDashboard {
    last_head: Mutex<Option<LogEntry>>,
}

impl TerminalDashboard {
    pub fn new() -> Self {
        Self {
            last_head: Mutex::new(None),
        }
    }

    pub fn render(&self, snapshot: &MonitorSnapshot) -> Vec<String> {
        let mut lines = Vec::new();
        if snapshot.time_counter > 0 {
            lines.push(status_line(snapshot));
        }

        let mut last_head = match self.last_head.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let fresh: Vec<&LogEntry> = snapshot
            .logs
            .iter()
            .take(ALERTS_SHOWN)
            .take_while(|entry| last_head.as_ref() != Some(*entry))
            .collect();
        for entry in fresh.iter().rev() {
            lines.push(log_line(entry));
        }
        *last_head = snapshot.logs.first().cloned();

        lines
    }
}

impl Default for TerminalDashboard {
    fn default() -> Self {
        Self::new()
    }
}

fn status_line(snapshot: &MonitorSnapshot) -> String {
    let heart = if snapshot.pulse_scale > 1.0 { "♥" } else { "♡" };
    format!(
        "{} {:>3} bpm | min {:>3} max {:>3} avg {:>3} | {} | {}",
        heart,
        snapshot.heart_rate_label(),
        snapshot.min_label(),
        snapshot.max_label(),
        snapshot.avg_label(),
        sparkline(&snapshot.history, CHART_WIDTH),
        pulsemon::types::session::format_duration(snapshot.total_time_seconds),
    )
}

fn log_line(entry: &LogEntry) -> String {
    let marker = match entry.level {
        LogLevel::Alert => "!!",
        LogLevel::Warning => " !",
        LogLevel::Info => " ·",
    };
    format!("  {} {} {}", marker, entry.time_label(), entry.message)
}

/// Bar chart of the newest `width` points, scaled to the chart's fixed range.
pub fn sparkline(history: &[HistoryPoint], width: usize) -> String {
    let start = history.len().saturating_sub(width);
    history[start..]
        .iter()
        .map(|point| {
            let scaled = (point.bpm - CHART_MIN) / (CHART_MAX - CHART_MIN);
            let index = (scaled * (SPARK_LEVELS.len() - 1) as f64).round();
            SPARK_LEVELS[index.clamp(0.0, (SPARK_LEVELS.len() - 1) as f64) as usize]
        })
        .collect()
}

pub fn profile_lines(profile: &UserProfile) -> Vec<String> {
    vec![
        format!("Name:   {}", profile.name),
        format!("Age:    {} years", profile.age_label()),
        format!("Height: {} cm", profile.height_label()),
        format!("Weight: {} kg", profile.weight_label()),
        format!("Gender: {}", profile.gender_label()),
    ]
}

/// Newest session first.
pub fn history_table(sessions: &[SessionSummary]) -> Vec<String> {
    if sessions.is_empty() {
        return vec!["No sessions recorded yet".to_string()];
    }
    let mut lines = vec![format!(
        "{:<10} {:<17} {:>8} {:>7} {:>5} {:>5}",
        "Activity", "Date", "Duration", "Avg", "Max", "Min"
    )];
    for session in sessions.iter().rev() {
        lines.push(format!(
            "{:<10} {:<17} {:>8} {:>7.1} {:>5} {:>5}",
            session.activity,
            session.date,
            session.duration,
            session.avg_bpm,
            session.max_bpm,
            session.min_bpm
        ));
    }
    lines
}

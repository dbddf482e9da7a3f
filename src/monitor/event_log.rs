//! Dashboard event log.
//!
//! Newest entries sit at the head. A new entry identical to the current head
//! (same message and level) is dropped, and the tail is evicted once the log
//! grows past its capacity.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Alert,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Alert => "ALERT",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub level: LogLevel,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            level,
        }
    }

    /// Local "HH:MM:SS" label shown next to the message.
    pub fn time_label(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
    }

    fn same_event(&self, other: &LogEntry) -> bool {
        self.level == other.level && self.message == other.message
    }
}

#[derive(Clone, Debug)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend an entry. Returns false when it duplicated the head and was dropped.
    pub fn push(&mut self, entry: LogEntry) -> bool {
        if self.entries.front().is_some_and(|head| head.same_event(&entry)) {
            return false;
        }
        self.entries.push_front(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
        true
    }

    pub fn record(&mut self, message: impl Into<String>, level: LogLevel) -> bool {
        self.push(LogEntry::new(message, level))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn head(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_head_is_dropped() {
        let mut log = EventLog::new(100);
        assert!(log.record("Low HR boundary hit: 41 bpm", LogLevel::Alert));
        assert!(!log.record("Low HR boundary hit: 41 bpm", LogLevel::Alert));
        assert_eq!(log.len(), 1);

        // Same message at a different level is a distinct event
        assert!(log.record("Low HR boundary hit: 41 bpm", LogLevel::Warning));
        // Only the head is compared, so an older duplicate is accepted
        assert!(log.record("Low HR boundary hit: 41 bpm", LogLevel::Alert));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_newest_first_and_tail_eviction() {
        let mut log = EventLog::new(100);
        for i in 0..150 {
            log.record(format!("event {}", i), LogLevel::Info);
        }
        assert_eq!(log.len(), 100);
        assert_eq!(log.head().unwrap().message, "event 149");
        assert_eq!(log.iter().last().unwrap().message, "event 50");

        assert_eq!(log.iter().nth(7).unwrap().message, "event 142");
    }

    #[test]
    fn test_adjacent_entries_never_duplicate() {
        let mut log = EventLog::new(10);
        let messages = ["a", "a", "b", "b", "a", "c", "c", "c", "a", "a"];
        for m in messages {
            log.record(m, LogLevel::Alert);
        }
        let entries = log.to_vec();
        assert!(entries.windows(2).all(|w| !w[0].same_event(&w[1])));
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn test_level_serializes_uppercase() {
        let json = serde_json::to_string(&LogLevel::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
    }
}

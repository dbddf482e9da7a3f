//! Simulator configuration.
//!
//! Defaults reproduce the stock dashboard: one tick per second, a one-minute
//! chart window, and a hundred-entry event log. A JSON file may override any
//! subset of the keys.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::monitor::MonitorError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Time between ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Samples kept in the rolling chart window.
    pub history_capacity: usize,
    /// Entries kept in the event log.
    pub log_capacity: usize,
    /// Heart rate before the first session starts.
    pub initial_heart_rate: f64,
    /// Seed for the random source; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            history_capacity: 60,
            log_capacity: 100,
            initial_heart_rate: 72.0,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, MonitorError> {
        let config: SimulatorConfig =
            serde_json::from_str(json).map_err(|e| MonitorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.tick_interval_ms == 0 {
            return Err(MonitorError::Config("tick_interval_ms must be positive".into()));
        }
        if self.history_capacity == 0 {
            return Err(MonitorError::Config("history_capacity must be positive".into()));
        }
        if self.log_capacity == 0 {
            return Err(MonitorError::Config("log_capacity must be positive".into()));
        }
        if !self.initial_heart_rate.is_finite() {
            return Err(MonitorError::Config("initial_heart_rate must be finite".into()));
        }
        Ok(())
    }
}

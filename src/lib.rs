// Pulsemon - Activity-conditioned heart-rate simulator

pub mod config;
pub mod monitor;
pub mod types;

pub use config::SimulatorConfig;
pub use monitor::{MonitorError, MonitorSnapshot, SignalSimulator};
pub use types::{ActivityKind, ActivityProfile, SessionSummary, UserProfile};

//! monitor/mod.rs
//!
//! The vital-signal simulator.
//!
//! # Concepts
//!
//! - **Tick**: one discrete step, nominally a second of simulated time. A tick
//!   advances the signal, folds the sample into the session statistics and the
//!   rolling chart window, and notifies observers.
//!
//! - **Session**: the span between `start_session` and `stop_session`. Its
//!   readings produce one `SessionSummary` when it stops, unless it recorded
//!   nothing.
//!
//! - **Observers**: a single refresh callback (last registration wins) and any
//!   number of broadcast subscribers receive a `MonitorSnapshot` after every
//!   tick. Subscribers also see the start, stop and fault snapshots.
//!
//! # Ownership
//!
//! ```text
//! presentation ──(profile, activity, start/stop)──▶ SignalSimulator
//!                                                      │ owns
//!                                                      ▼
//!                                  RwLock<MonitorState> ◀── stepping task
//!                                                      │
//! presentation ◀──────────(MonitorSnapshot)────────────┘
//! ```

pub mod error;
pub mod event_log;
pub mod random;
pub mod simulator;
pub mod state;
pub mod stepper;
pub mod window;

pub use error::MonitorError;
pub use event_log::{EventLog, LogEntry, LogLevel};
pub use random::{RandomSource, ScriptedSource};
pub use simulator::{RefreshCallback, SignalSimulator};
pub use state::{MonitorSnapshot, MonitorState, SessionPhase};
pub use stepper::{Boundary, Step};
pub use window::{HistoryPoint, RollingWindow};

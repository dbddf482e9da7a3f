//! types/activity.rs
//!
//! Activity profiles that condition the simulated heart-rate signal. Each
//! profile describes the band the signal wanders in, how sluggishly it follows
//! its target, and how much high-frequency jitter rides on top.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::monitor::MonitorError;

/// The activities a session can be monitored under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    Resting,
    Walking,
    Running,
    Gym,
    Swimming,
}

impl ActivityKind {
    /// All known activities, in display order.
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::Resting,
        ActivityKind::Walking,
        ActivityKind::Running,
        ActivityKind::Gym,
        ActivityKind::Swimming,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActivityKind::Resting => "Resting",
            ActivityKind::Walking => "Walking",
            ActivityKind::Running => "Running",
            ActivityKind::Gym => "Gym",
            ActivityKind::Swimming => "Swimming",
        }
    }

    /// The static profile for this activity.
    pub fn profile(&self) -> ActivityProfile {
        match self {
            ActivityKind::Resting => ActivityProfile::new(60.0, 80.0, 0.9, 0.5),
            ActivityKind::Walking => ActivityProfile::new(90.0, 110.0, 0.7, 1.0),
            ActivityKind::Running => ActivityProfile::new(130.0, 160.0, 0.4, 2.0),
            ActivityKind::Gym => ActivityProfile::new(110.0, 140.0, 0.5, 1.5),
            ActivityKind::Swimming => ActivityProfile::new(100.0, 130.0, 0.6, 1.2),
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActivityKind {
    type Err = MonitorError;

    /// Activity keys are matched exactly, as they are displayed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| MonitorError::InvalidActivity(s.to_string()))
    }
}

/// Parameters of the stepping process for one activity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityProfile {
    /// Lower edge of the target band (bpm)
    pub base_min: f64,

    /// Upper edge of the target band (bpm)
    pub base_max: f64,

    /// Smoothing coefficient in [0, 1]; higher means slower convergence
    pub momentum: f64,

    /// Half-width of the per-tick noise (bpm)
    pub fluctuation: f64,
}

impl ActivityProfile {
    pub const fn new(base_min: f64, base_max: f64, momentum: f64, fluctuation: f64) -> Self {
        Self {
            base_min,
            base_max,
            momentum,
            fluctuation,
        }
    }

    /// Profile used when the selected activity is empty or unknown.
    pub const fn fallback() -> Self {
        Self::new(70.0, 100.0, 0.8, 0.8)
    }

    /// Look up the profile for an activity name, degrading to the fallback
    /// profile rather than failing.
    pub fn resolve(name: &str) -> Self {
        match name.parse::<ActivityKind>() {
            Ok(kind) => kind.profile(),
            Err(e) => {
                log::warn!("{}; using fallback profile", e);
                Self::fallback()
            }
        }
    }

    /// True if `name` resolves to one of the named profiles.
    pub fn is_known(name: &str) -> bool {
        name.parse::<ActivityKind>().is_ok()
    }
}

impl Default for ActivityProfile {
    fn default() -> Self {
        Self::fallback()
    }
}

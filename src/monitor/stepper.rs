//! The stepping algorithm for the simulated heart-rate signal.
//!
//! Each step pulls the signal toward a randomly wandering target with
//! first-order smoothing, adds bounded noise, rounds to two decimals, and
//! enforces the physiological floor and ceiling by redrawing inside a safe
//! band when either is breached.

use super::random::RandomSource;
use super::MonitorError;
use crate::types::ActivityProfile;

/// Lowest value the signal may hold after a step.
pub const HR_FLOOR: f64 = 40.0;

/// Highest value the signal may hold after a step.
pub const HR_CEILING: f64 = 190.0;

/// Redraw band used when the floor is breached.
pub const LOW_REDRAW: (f64, f64) = (40.0, 45.0);

/// Redraw band used when the ceiling is breached.
pub const HIGH_REDRAW: (f64, f64) = (180.0, 190.0);

/// Which boundary was hit during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    Low,
    High,
}

/// Result of advancing the signal by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Value after rounding and clamping
    pub bpm: f64,

    /// Set when the clamp fired; `bpm` is then the redrawn value
    pub boundary: Option<Boundary>,
}

impl Step {
    /// Dashboard alert text for a clamped step.
    pub fn alert_message(&self) -> Option<String> {
        let shown = self.bpm.trunc() as i64;
        self.boundary.map(|boundary| match boundary {
            Boundary::Low => format!("Low HR boundary hit: {} bpm", shown),
            Boundary::High => format!("High HR boundary hit: {} bpm", shown),
        })
    }
}

/// Advance `heart_rate` by one tick under `profile`.
///
/// Draw order is fixed (target, noise, then redraw if clamped) so that a
/// seeded or scripted source reproduces the same trajectory.
pub fn advance(
    heart_rate: f64,
    profile: &ActivityProfile,
    rng: &mut dyn RandomSource,
) -> Result<Step, MonitorError> {
    if !heart_rate.is_finite() {
        return Err(MonitorError::SimulationFault(format!(
            "heart rate is not finite before step: {}",
            heart_rate
        )));
    }

    let target = rng.uniform(profile.base_min, profile.base_max);
    let noise = rng.uniform(-profile.fluctuation, profile.fluctuation);

    let next = heart_rate + (target - heart_rate) * (1.0 - profile.momentum) + noise;
    let next = round_to_hundredths(next);

    if !next.is_finite() {
        return Err(MonitorError::SimulationFault(format!(
            "heart rate diverged to {} under profile {:?}",
            next, profile
        )));
    }

    let step = if next < HR_FLOOR {
        Step {
            bpm: rng.uniform(LOW_REDRAW.0, LOW_REDRAW.1),
            boundary: Some(Boundary::Low),
        }
    } else if next > HR_CEILING {
        Step {
            bpm: rng.uniform(HIGH_REDRAW.0, HIGH_REDRAW.1),
            boundary: Some(Boundary::High),
        }
    } else {
        Step {
            bpm: next,
            boundary: None,
        }
    };

    Ok(step)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

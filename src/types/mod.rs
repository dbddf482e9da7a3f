//! Domain types shared by the simulator and its consumers.

pub mod activity;
pub mod profile;
pub mod session;

pub use activity::{ActivityKind, ActivityProfile};
pub use profile::{Gender, UserProfile};
pub use session::SessionSummary;

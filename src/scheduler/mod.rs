//! Frame scheduling
//!
//! A `Session` drives one source through detect, process and draw. The
//! `Throttle` bounds how often a completed detection is rendered.

mod session;
mod throttle;

pub use session::{Session, StepOutcome, WebcamOpener};
pub use throttle::Throttle;

use std::fmt;

/// Session lifecycle
///
/// `Idle -> Starting -> Running -> (Stopping -> Idle | Error -> Idle)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Source acquired, detector configuring
    Starting,
    Running,
    Stopping,
    /// Fail-stop after a detection or draw failure
    Error,
}

impl SessionState {
    /// Whether a source is attached and frames may flow
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Starting | SessionState::Running)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Starting => "starting",
            SessionState::Running => "running",
            SessionState::Stopping => "stopping",
            SessionState::Error => "error",
        };
        f.write_str(name)
    }
}

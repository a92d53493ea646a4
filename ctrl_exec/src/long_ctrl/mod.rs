//! # Longitudinal control module
//!
//! Longitudinal control converts the planner's time-indexed speed and
//! acceleration trajectory into an acceleration command. An explicit state
//! machine tracks whether the controller is off, tracking the plan with a
//! PID loop, or ramping the brakes on to come to a stop; the PID loop uses
//! the planned acceleration as feedforward, compensated for actuator delay.
//!
//! Degraded inputs (a plan of unexpected length, missing lead info) zero the
//! corresponding feedforward terms rather than failing: every cycle yields a
//! command.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;
mod state_machine;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;
pub use state_machine::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Acceleration bound as per ISO 15622:2018, for all speeds.
///
/// Units: metres/second^2
pub const ACCEL_MIN_ISO: f64 = -3.5;

/// Acceleration bound as per ISO 15622:2018, for all speeds.
///
/// Units: metres/second^2
pub const ACCEL_MAX_ISO: f64 = 4.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LongCtrl operation.
///
/// Construction-time only; the per-cycle update is total.
#[derive(Debug, thiserror::Error)]
pub enum LongCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Malformed {0} schedule: breakpoint and value tables must have equal non-zero length")]
    MalformedSchedule(&'static str),

    #[error("Actuator delay bounds must be positive")]
    NonPositiveActuatorDelay,
}

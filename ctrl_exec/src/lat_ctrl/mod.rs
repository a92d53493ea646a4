//! # Lateral control module
//!
//! Lateral control converts the planner's desired curvature into a steering
//! torque command. A fixed-gain linear observer estimates the true steering
//! angle from the noisy measured angle and the applied EPS torque, and an
//! LQR feedback law computes the torque which drives that estimate to the
//! desired angle. A bounded integrator sits on top of the LQR term to remove
//! steady-state error, with directional anti-windup so it cannot grow while
//! the torque command is saturated.
//!
//! The observer runs every cycle regardless of whether the controller is
//! engaged, so there is no re-convergence transient on engagement.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod observer;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use observer::*;
pub use params::*;
pub use state::*;

use crate::DT_CTRL_S;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Speed below which the steering output is forced to zero.
///
/// Units: metres/second
pub const MIN_STEER_SPEED_MS: f64 = 0.3;

/// Speed at which the torque-to-angle scale model changes branch.
///
/// Units: kilometres/hour
pub(crate) const TORQUE_SCALE_KNEE_KPH: f64 = 85.0;

/// Rate at which the integrator unwinds towards zero while the driver is
/// overriding.
pub(crate) const I_UNWIND_RATE: f64 = 0.3 * DT_CTRL_S;

/// Integrator accumulation rate.
pub(crate) const I_RATE: f64 = 1.0 * DT_CTRL_S;

/// Margin within which the clamped output is reported as saturated.
pub(crate) const SATURATION_EPS: f64 = 1e-3;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LatCtrl operation.
///
/// All of these are construction-time failures; the per-cycle update is
/// total.
#[derive(Debug, thiserror::Error)]
pub enum LatCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid LQR tuning: dc_gain must be non-zero")]
    ZeroDcGain,
}

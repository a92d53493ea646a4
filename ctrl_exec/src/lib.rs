//! # Control library.
//!
//! The feedback-control core of the driving-assistance stack. Two
//! independent controllers run once per control cycle:
//!
//! - `lat_ctrl` converts the planned curvature into a steering torque
//!   command using an LQR with an embedded steering angle observer.
//! - `long_ctrl` converts the planned speed/acceleration trajectory into an
//!   acceleration command using a mode state machine driving a PID loop.
//!
//! Both controllers own their persisted state exclusively and complete
//! synchronously within one call, so they may run in either order (or on
//! separate threads) as long as the input snapshots are immutable for the
//! duration of the cycle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Lateral control module - converts desired curvature into steering torque commands
pub mod lat_ctrl;

/// Longitudinal control module - converts the speed/accel plan into acceleration commands
pub mod long_ctrl;

/// Generic PI(D) controller primitive with speed-scheduled gains
pub mod pid;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Period of one control cycle.
///
/// Units: seconds
pub const DT_CTRL_S: f64 = 0.01;

//! Parameters structure for LongCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::pid::PiGains;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for longitudinal control.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    // ---- PID ----

    /// Gain schedule of the speed-tracking PID loop.
    pub pid: PiGains,

    /// Deadzone breakpoints.
    ///
    /// Units: metres/second
    pub deadzone_bp: Vec<f64>,

    /// Speed-error deadzone at each breakpoint, within which no integral
    /// accumulation occurs.
    ///
    /// Units: metres/second
    pub deadzone_v: Vec<f64>,

    // ---- STOPPING ----

    /// Whether the vehicle handles its own stopping control. When false the
    /// overshoot-prevention rule applies near a planned stop.
    pub stopping_control: bool,

    /// Acceleration held once stopped.
    ///
    /// Units: metres/second^2
    pub stop_accel: f64,

    /// Base rate at which the output ramps towards `stop_accel` while
    /// stopping.
    ///
    /// Units: metres/second^3
    pub stopping_decel_rate: f64,

    // ---- ACTUATOR DELAY ----

    /// Lower bound of the actuator delay uncertainty range.
    ///
    /// Units: seconds
    pub actuator_delay_lower_s: f64,

    /// Upper bound of the actuator delay uncertainty range.
    ///
    /// Units: seconds
    pub actuator_delay_upper_s: f64,
}

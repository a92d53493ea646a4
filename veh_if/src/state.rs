//! Live vehicle state snapshots

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A snapshot of the measured vehicle state, produced once per cycle by the
/// external CAN decoding layer.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct VehicleState {
    /// Ego vehicle speed.
    ///
    /// Units: metres/second
    pub v_ego: f64,

    /// Measured steering wheel angle.
    ///
    /// Units: degrees
    pub steering_angle_deg: f64,

    /// Measured steering torque applied by the EPS motor.
    ///
    /// Units: vehicle-specific torque counts
    pub steering_torque_eps: f64,

    /// True when the driver is applying steering torque above the override
    /// threshold.
    pub steering_pressed: bool,

    /// True when the driver is pressing the accelerator pedal.
    pub gas_pressed: bool,

    /// True when the driver is pressing the brake pedal.
    pub brake_pressed: bool,

    /// True when the vehicle reports it is stationary.
    pub standstill: bool,

    /// True when the cruise system reports it is holding the vehicle at
    /// standstill.
    pub cruise_standstill: bool,
}

/// Live calibration values from the external estimator.
///
/// The average offset captures long-term sensor bias, the instantaneous
/// offset additionally captures short-term vehicle-model bias.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct LiveParams {
    /// Instantaneous steering angle offset estimate.
    ///
    /// Units: degrees
    pub angle_offset_deg: f64,

    /// Long-term average steering angle offset estimate.
    ///
    /// Units: degrees
    pub angle_offset_average_deg: f64,

    /// Estimated road roll angle.
    ///
    /// Units: radians
    pub roll_rad: f64,
}

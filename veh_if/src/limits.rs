//! Per-vehicle control limits

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use util::maths::lin_interp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Control limits for the vehicle. Immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Limits {
    /// Breakpoints of the speed-dependent steer torque bound.
    ///
    /// Units: metres/second
    pub steer_max_bp: Vec<f64>,

    /// Symmetric steer torque bound at each breakpoint.
    ///
    /// Units: vehicle-specific torque counts
    pub steer_max_v: Vec<f64>,

    /// Minimum commanded acceleration (strongest braking).
    ///
    /// Units: metres/second^2
    pub accel_min: f64,

    /// Maximum commanded acceleration.
    ///
    /// Units: metres/second^2
    pub accel_max: f64,

    /// Speed below which the longitudinal controller may enter Stopping.
    ///
    /// Units: metres/second
    pub v_ego_stopping: f64,

    /// Future target speed above which the longitudinal controller may leave
    /// Stopping.
    ///
    /// Units: metres/second
    pub v_ego_starting: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Limits {
    /// True when the steer torque tables are usable, with matching non-empty
    /// breakpoint and value tables.
    ///
    /// Checked once at load time; [`Limits::steer_max`] requires it.
    pub fn is_well_formed(&self) -> bool {
        !self.steer_max_bp.is_empty() && self.steer_max_bp.len() == self.steer_max_v.len()
    }

    /// Get the symmetric steering torque bound at the given speed.
    pub fn steer_max(&self, v_ego: f64) -> f64 {
        lin_interp(v_ego, &self.steer_max_bp, &self.steer_max_v)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_steer_max_interp() {
        let limits = Limits {
            steer_max_bp: vec![0.0, 30.0],
            steer_max_v: vec![409.0, 255.0],
            accel_min: -3.5,
            accel_max: 2.0,
            v_ego_stopping: 0.5,
            v_ego_starting: 0.5,
        };

        assert_eq!(limits.steer_max(0.0), 409.0);
        assert_eq!(limits.steer_max(15.0), 332.0);
        assert_eq!(limits.steer_max(100.0), 255.0);
    }

    #[test]
    fn test_mismatched_steer_tables_not_well_formed() {
        let mut limits = Limits {
            steer_max_bp: vec![0.0, 30.0],
            steer_max_v: vec![409.0, 255.0],
            accel_min: -3.5,
            accel_max: 2.0,
            v_ego_stopping: 0.5,
            v_ego_starting: 0.5,
        };
        assert!(limits.is_well_formed());

        limits.steer_max_v = vec![409.0];
        assert!(!limits.is_well_formed());

        limits.steer_max_bp = vec![];
        limits.steer_max_v = vec![];
        assert!(!limits.is_well_formed());
    }
}

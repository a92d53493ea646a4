//! Longitudinal plan and lead vehicle snapshots

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of samples in the longitudinal control trajectory.
pub const CONTROL_N: usize = 17;

/// Sample times of the control trajectory, relative to when the plan was
/// generated. These follow the planner's quadratic spacing `10*(i/32)^2` so
/// the near future is sampled densely.
///
/// Units: seconds
pub const T_IDXS: [f64; CONTROL_N] = [
    0.0,
    0.009765625,
    0.0390625,
    0.087890625,
    0.15625,
    0.244140625,
    0.3515625,
    0.478515625,
    0.625,
    0.791015625,
    0.9765625,
    1.181640625,
    1.40625,
    1.650390625,
    1.9140625,
    2.197265625,
    2.5,
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The time-indexed longitudinal plan from the external planner.
///
/// A plan is well-formed when both sequences have length [`CONTROL_N`],
/// sampled at [`T_IDXS`]. Consumers must degrade gracefully (zero
/// feedforward) when this does not hold, never fail.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LongPlan {
    /// Target speeds at each sample time.
    ///
    /// Units: metres/second
    pub speeds: Vec<f64>,

    /// Target accelerations at each sample time.
    ///
    /// Units: metres/second^2
    pub accels: Vec<f64>,
}

/// Lead vehicle information from the external radar/vision fusion.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct LeadInfo {
    /// Speed of the lead vehicle.
    ///
    /// Units: metres/second
    pub v_lead: f64,

    /// True when the lead track is valid.
    pub status: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LongPlan {
    /// True when the plan has the expected number of samples in both
    /// sequences.
    pub fn is_well_formed(&self) -> bool {
        self.speeds.len() == CONTROL_N && self.accels.len() == CONTROL_N
    }
}

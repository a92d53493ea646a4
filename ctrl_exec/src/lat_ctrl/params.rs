//! Parameters structure for LatCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tuning parameters for the lateral LQR and its observer.
///
/// The observer state dimension is fixed at 2, so the matrices are stored as
/// fixed-size row-major arrays; a table of the wrong shape fails at
/// deserialisation time rather than at cycle time.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    /// Discrete-time state matrix A (2x2, row major).
    pub a: [f64; 4],

    /// Input matrix B (2x1).
    pub b: [f64; 2],

    /// Measurement matrix C (1x2).
    pub c: [f64; 2],

    /// LQR feedback gain K (1x2).
    pub k: [f64; 2],

    /// Observer gain L (2x1).
    pub l: [f64; 2],

    /// DC gain of the steering plant, converts desired angle into the
    /// reference input. Must be non-zero.
    pub dc_gain: f64,

    /// Loop scale factor between controller units and torque counts.
    pub scale: f64,

    /// Integrator gain.
    pub ki: f64,
}

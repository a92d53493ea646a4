//! # Vehicle interface library
//!
//! Defines the read-only data snapshots exchanged between the control
//! modules and the surrounding system (CAN decoding, calibration, planning),
//! the per-vehicle control limits, and the vehicle-model collaborator
//! interface.
//!
//! All snapshot types are plain data. The caller guarantees a snapshot does
//! not mutate for the duration of a control cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod limits;
pub mod model;
pub mod plan;
pub mod state;

// ---------------------------------------------------------------------------
// REEXPORTS
// ---------------------------------------------------------------------------

pub use limits::Limits;
pub use model::{BicycleModel, VehicleModel};
pub use plan::{LeadInfo, LongPlan, CONTROL_N, T_IDXS};
pub use state::{LiveParams, VehicleState};

//! Main control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and all modules
//!     - Main loop (fixed period):
//!         - Acquire the vehicle state snapshot
//!         - Acquire the plan snapshot
//!         - Lateral control processing
//!         - Longitudinal control processing
//!         - Archive diagnostics
//!
//! Without a vehicle attached the executable closes the loop against a toy
//! plant and a scripted scenario (engage, accelerate to cruise on a gentle
//! curvature, then brake to a stop), which exercises every controller mode
//! and produces CSV archives for tuning analysis.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use serde::Deserialize;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use ctrl_lib::{lat_ctrl::LatCtrl, long_ctrl::LongCtrl, DT_CTRL_S};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    session::Session,
};
use veh_if::{BicycleModel, Limits, LiveParams, LongPlan, VehicleState, CONTROL_N};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of cycles to run the scripted scenario for.
const NUM_CYCLES: u64 = 6000;

/// Cycle at which the controllers engage.
const ENGAGE_CYCLE: u64 = 100;

/// Cycle at which the scenario demands a stop.
const STOP_CYCLE: u64 = 4500;

/// Cruise speed of the scripted scenario.
///
/// Units: metres/second
const CRUISE_SPEED_MS: f64 = 15.0;

/// Curvature demand held during the cruise phase.
///
/// Units: 1/metres
const CRUISE_CURVATURE_M: f64 = 2e-4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-vehicle parameters for the executable.
#[derive(Debug, Deserialize)]
struct VehicleParams {
    limits: Limits,
    model: BicycleModel,
}

/// Toy plant closing the loop in place of a real vehicle.
struct Plant {
    v_ego: f64,
    steering_angle_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Plant {
    /// Integrate the plant by one cycle under the given commands.
    fn step(&mut self, accel_cmd: f64, steer_cmd: f64) {
        self.v_ego = (self.v_ego + accel_cmd * DT_CTRL_S).max(0.0);

        // First-order steering response to torque
        let angle_rate = 0.05 * steer_cmd - 0.5 * self.steering_angle_deg;
        self.steering_angle_deg += angle_rate * DT_CTRL_S;
    }

    fn state(&self) -> VehicleState {
        VehicleState {
            v_ego: self.v_ego,
            steering_angle_deg: self.steering_angle_deg,
            steering_torque_eps: 0.0,
            steering_pressed: false,
            gas_pressed: false,
            brake_pressed: false,
            standstill: self.v_ego < 0.01,
            cruise_standstill: false,
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    let session = Session::new("ctrl_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Kestrel ADAS Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let vehicle_params: VehicleParams =
        util::params::load("vehicle.toml").wrap_err("Could not load vehicle params")?;

    if !vehicle_params.limits.is_well_formed() {
        return Err(eyre!(
            "Vehicle steer limit tables are malformed (unequal or empty lengths)"
        ));
    }

    info!("Vehicle parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut lat_ctrl =
        LatCtrl::init("lat_ctrl.toml", &session).wrap_err("Failed to initialise LatCtrl")?;
    info!("LatCtrl init complete");

    let mut long_ctrl =
        LongCtrl::init("long_ctrl.toml", &session).wrap_err("Failed to initialise LongCtrl")?;
    info!("LongCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let mut plant = Plant {
        v_ego: 0.0,
        steering_angle_deg: 0.0,
    };
    let live = LiveParams::default();
    let cycle_period = Duration::from_secs_f64(DT_CTRL_S);

    for cycle in 0..NUM_CYCLES {
        let cycle_start = Instant::now();

        // ---- SCENARIO ----

        let active = cycle >= ENGAGE_CYCLE;
        let (target_speed, curvature) = if !active {
            (0.0, 0.0)
        }
        else if cycle < STOP_CYCLE {
            (CRUISE_SPEED_MS, CRUISE_CURVATURE_M)
        }
        else {
            (0.0, 0.0)
        };

        let plan = LongPlan {
            speeds: vec![target_speed; CONTROL_N],
            accels: vec![0.0; CONTROL_N],
        };

        let vehicle = plant.state();

        // ---- CONTROL PROCESSING ----

        let (steer_cmd, _, _) = lat_ctrl.update(
            active,
            &vehicle,
            &live,
            &vehicle_params.limits,
            &vehicle_params.model,
            curvature,
            0.0,
        );

        let (accel_cmd, _) = long_ctrl.update(
            active,
            &vehicle,
            &vehicle_params.limits,
            &plan,
            (vehicle_params.limits.accel_min, vehicle_params.limits.accel_max),
            0.0,
            None,
        );

        plant.step(accel_cmd, steer_cmd);

        // ---- ARCHIVING ----

        if let Err(e) = lat_ctrl.write() {
            warn!("Failed to archive LatCtrl: {}", e);
        }
        if let Err(e) = long_ctrl.write() {
            warn!("Failed to archive LongCtrl: {}", e);
        }

        if cycle % 500 == 0 {
            info!(
                "Cycle {}: v_ego {:.2} m/s, steer {:.1}, accel {:.2} m/s^2",
                cycle, plant.v_ego, steer_cmd, accel_cmd
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let elapsed = cycle_start.elapsed();
        if elapsed > cycle_period {
            warn!(
                "Cycle {} overran its period: {:.3} ms",
                cycle,
                elapsed.as_secs_f64() * 1e3
            );
        }
        else {
            thread::sleep(cycle_period - elapsed);
        }
    }

    info!("Scenario complete, stopped at {:.3} m/s", plant.v_ego);

    Ok(())
}

//! Implementations for the LongCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{
    mode_transition, starting_condition, stopping_condition, LongCtrlError, LongCtrlMode, Params,
    ACCEL_MAX_ISO, ACCEL_MIN_ISO,
};
use crate::pid::PiController;
use crate::DT_CTRL_S;
use util::{
    archive::{Archived, Archiver},
    convert::KPH_TO_MS,
    maths::{clamp, lin_interp},
    params,
    session::Session,
};
use veh_if::{LeadInfo, Limits, LongPlan, VehicleState, CONTROL_N, T_IDXS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Longitudinal control module state
pub struct LongCtrl {
    params: Params,

    /// Executing mode, mutated only through the transition function.
    mode: LongCtrlMode,

    /// Speed-tracking PID loop.
    pid: PiController,

    /// Persisted PID setpoint.
    ///
    /// Units: metres/second
    v_pid: f64,

    /// Previous cycle's output acceleration, used by the Stopping ramp.
    ///
    /// Units: metres/second^2
    last_output_accel: f64,

    log: LongCtrlLog,
    arch_log: Archiver,
}

/// Per-cycle diagnostic record for longitudinal control.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct LongCtrlLog {
    /// Executing mode this cycle.
    pub mode: LongCtrlMode,

    /// True when the controller was engaged this cycle.
    pub active: bool,

    /// PID setpoint, metres/second.
    pub v_pid: f64,

    /// Interpolated plan speed target, metres/second.
    pub v_target: f64,

    /// Speed target at the end of the plan horizon, metres/second.
    pub v_target_future: f64,

    /// Delay-compensated acceleration feedforward, metres/second^2.
    pub a_target: f64,

    /// Final clamped acceleration command, metres/second^2.
    pub output_accel: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LongCtrl {
    /// Initialise the LongCtrl module, loading parameters from the given
    /// file and creating the session archives.
    pub fn init(params_path: &str, session: &Session) -> Result<Self, LongCtrlError> {
        let params = params::load(params_path).map_err(LongCtrlError::ParamLoadError)?;

        let mut long_ctrl = Self::from_params(params)?;

        long_ctrl.arch_log = Archiver::from_path(session, "long_ctrl.csv").unwrap();

        Ok(long_ctrl)
    }

    /// Build the controller from an already-loaded parameter set.
    ///
    /// Malformed tuning is rejected here, never at cycle time.
    pub fn from_params(params: Params) -> Result<Self, LongCtrlError> {
        if !params.pid.is_well_formed() {
            return Err(LongCtrlError::MalformedSchedule("PID gain"));
        }
        if params.deadzone_bp.is_empty() || params.deadzone_bp.len() != params.deadzone_v.len() {
            return Err(LongCtrlError::MalformedSchedule("deadzone"));
        }
        if params.actuator_delay_lower_s <= 0.0 || params.actuator_delay_upper_s <= 0.0 {
            return Err(LongCtrlError::NonPositiveActuatorDelay);
        }

        Ok(Self {
            pid: PiController::new(params.pid.clone(), DT_CTRL_S),
            params,
            mode: LongCtrlMode::Off,
            v_pid: 0.0,
            last_output_accel: 0.0,
            log: LongCtrlLog::default(),
            arch_log: Archiver::default(),
        })
    }

    /// Reset the PID loop and change its setpoint.
    pub fn reset(&mut self, v_pid: f64) {
        self.pid.reset();
        self.v_pid = v_pid;
    }

    /// The current executing mode.
    pub fn mode(&self) -> LongCtrlMode {
        self.mode
    }

    /// The most recent diagnostic record.
    pub fn log(&self) -> &LongCtrlLog {
        &self.log
    }

    /// Perform one cycle of longitudinal control. This updates the state
    /// machine and runs the PID loop.
    ///
    /// A plan of unexpected length degrades to zero feedforward, it is never
    /// an error.
    pub fn update(
        &mut self,
        active: bool,
        vehicle: &VehicleState,
        limits: &Limits,
        plan: &LongPlan,
        accel_limits: (f64, f64),
        t_since_plan_s: f64,
        lead: Option<&LeadInfo>,
    ) -> (f64, LongCtrlLog) {
        let v_ego = vehicle.v_ego;

        // Interp control trajectory
        let v_target: f64;
        let mut a_target: f64;
        let v_target_future: f64;

        if plan.is_well_formed() {
            v_target = lin_interp(t_since_plan_s, &T_IDXS, &plan.speeds);
            let a_plan = lin_interp(t_since_plan_s, &T_IDXS, &plan.accels);

            // Conservative actuator-delay compensation: take the lower of
            // the two delay-adjusted estimates across the delay uncertainty
            // range
            let a_lower = delay_adjusted_accel(
                plan,
                t_since_plan_s,
                v_target,
                a_plan,
                self.params.actuator_delay_lower_s,
            );
            let a_upper = delay_adjusted_accel(
                plan,
                t_since_plan_s,
                v_target,
                a_plan,
                self.params.actuator_delay_upper_s,
            );
            a_target = a_lower.min(a_upper);

            v_target_future = plan.speeds[CONTROL_N - 1];
        }
        else {
            v_target = 0.0;
            a_target = 0.0;
            v_target_future = 0.0;
        }

        // Damp positive targets at low speed
        if a_target > 0.0 {
            a_target *= lin_interp(v_ego, &[0.0, 20.0 * KPH_TO_MS], &[1.5, 1.0]);
        }

        a_target = clamp(&a_target, &ACCEL_MIN_ISO, &ACCEL_MAX_ISO);

        self.pid.neg_limit = accel_limits.0;
        self.pid.pos_limit = accel_limits.1;

        // Update state machine
        let stopping = stopping_condition(vehicle, limits, self.v_pid, v_target_future);
        let starting = starting_condition(v_target_future, vehicle.cruise_standstill, lead, limits);
        self.mode = mode_transition(self.mode, active, stopping, starting);

        let mut output_accel = self.last_output_accel;

        if self.mode == LongCtrlMode::Off || vehicle.gas_pressed {
            self.reset(v_ego);
            output_accel = 0.0;
        }
        // Tracking the plan speed
        else if self.mode == LongCtrlMode::Tracking {
            self.v_pid = v_target;

            // Some vehicles brake harder when they believe a stop is wanted.
            // Freeze the integrator so the loop does not accelerate to
            // compensate, and do not allow positive acceleration
            let prevent_overshoot = !self.params.stopping_control
                && v_ego < 1.5
                && v_target_future < 0.7
                && v_target_future < self.v_pid;

            let deadzone = lin_interp(v_ego, &self.params.deadzone_bp, &self.params.deadzone_v);

            output_accel = self.pid.update(
                self.v_pid,
                v_ego,
                v_ego,
                deadzone,
                a_target,
                prevent_overshoot,
            );

            if prevent_overshoot {
                self.pid.clamp_integral(f64::NEG_INFINITY, 0.0);
                output_accel = output_accel.min(0.0);
            }
        }
        // Intention is to stop: ramp the brakes on until the car is stopped
        else if self.mode == LongCtrlMode::Stopping {
            if !vehicle.standstill || output_accel > self.params.stop_accel {
                // Decay faster the closer the output already is to zero
                let decay_scale = lin_interp(
                    output_accel,
                    &[
                        self.params.stop_accel,
                        self.params.stop_accel / 2.0,
                        self.params.stop_accel / 4.0,
                        0.0,
                    ],
                    &[0.5, 0.65, 1.0, 3.0],
                );
                output_accel -= self.params.stopping_decel_rate * DT_CTRL_S * decay_scale;
            }

            output_accel = clamp(&output_accel, &accel_limits.0, &accel_limits.1);
            self.reset(v_ego);
        }

        self.last_output_accel = output_accel;
        let final_accel = clamp(&output_accel, &accel_limits.0, &accel_limits.1);

        self.log = LongCtrlLog {
            mode: self.mode,
            active,
            v_pid: self.v_pid,
            v_target,
            v_target_future,
            a_target,
            output_accel: final_accel,
        };

        trace!(
            "LongCtrl output: {:.2} (mode {:?}, a_target {:.2})",
            final_accel,
            self.mode,
            a_target
        );

        (final_accel, self.log)
    }
}

impl Archived for LongCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_log.serialise(self.log)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Estimate the acceleration needed to reach the planned speed at
/// `t + delay` given that the actuator will not respond for `delay` seconds.
///
/// This is below the planned acceleration whenever the plan is braking
/// harder later, which is the conservative direction.
fn delay_adjusted_accel(
    plan: &LongPlan,
    t_since_plan_s: f64,
    v_target: f64,
    a_target: f64,
    delay_s: f64,
) -> f64 {
    let v_delayed = lin_interp(t_since_plan_s + delay_s, &T_IDXS, &plan.speeds);
    2.0 * (v_delayed - v_target) / delay_s - a_target
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

//! Implementations for the LatCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::RowVector2;
use serde::Serialize;

// Internal
use super::{
    Params, SteerObserver, LatCtrlError,
    I_RATE, I_UNWIND_RATE, MIN_STEER_SPEED_MS, SATURATION_EPS, TORQUE_SCALE_KNEE_KPH,
};
use util::{
    archive::{Archived, Archiver},
    convert::{KPH_TO_MS, RAD_TO_DEG},
    maths::clamp,
    params,
    session::Session,
};
use veh_if::{Limits, LiveParams, VehicleModel, VehicleState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lateral control module state
pub struct LatCtrl {
    params: Params,

    /// LQR feedback gain.
    k: RowVector2<f64>,

    /// Steering angle observer, runs every cycle.
    observer: SteerObserver,

    /// Integrator accumulation on top of the LQR term.
    i_lqr: f64,

    log: LatCtrlLog,
    arch_log: Archiver,
}

/// Per-cycle diagnostic record for lateral control.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct LatCtrlLog {
    /// True when the controller was engaged this cycle.
    pub active: bool,

    /// Desired steering angle from the vehicle model, degrees.
    pub steering_angle_desired_deg: f64,

    /// Observer estimate of the steering angle, degrees.
    pub steering_angle_deg: f64,

    /// Integrator accumulation, torque counts.
    pub i: f64,

    /// LQR term alone, torque counts.
    pub lqr_output: f64,

    /// Final clamped steering torque command, torque counts.
    pub output: f64,

    /// True when the output is clamped at the torque bound.
    pub saturated: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LatCtrl {
    /// Initialise the LatCtrl module, loading parameters from the given file
    /// and creating the session archives.
    pub fn init(params_path: &str, session: &Session) -> Result<Self, LatCtrlError> {
        let params = params::load(params_path).map_err(LatCtrlError::ParamLoadError)?;

        let mut lat_ctrl = Self::from_params(params)?;

        lat_ctrl.arch_log = Archiver::from_path(session, "lat_ctrl.csv").unwrap();

        Ok(lat_ctrl)
    }

    /// Build the controller from an already-loaded parameter set.
    ///
    /// Malformed tuning is rejected here, never at cycle time.
    pub fn from_params(params: Params) -> Result<Self, LatCtrlError> {
        if params.dc_gain == 0.0 {
            return Err(LatCtrlError::ZeroDcGain);
        }

        Ok(Self {
            k: RowVector2::new(params.k[0], params.k[1]),
            observer: SteerObserver::new(&params),
            params,
            i_lqr: 0.0,
            log: LatCtrlLog::default(),
            arch_log: Archiver::default(),
        })
    }

    /// Reset the controller.
    ///
    /// Contract: only the integrator is cleared. The observer estimate is
    /// deliberately left alone so the filter keeps tracking through a
    /// disengagement and re-engagement needs no re-convergence.
    pub fn reset(&mut self) {
        self.i_lqr = 0.0;
    }

    /// The most recent diagnostic record.
    pub fn log(&self) -> &LatCtrlLog {
        &self.log
    }

    /// Perform one cycle of lateral control.
    ///
    /// The observer is propagated unconditionally; the torque command is
    /// zero whenever the controller is inactive or the vehicle is below the
    /// minimum steering speed.
    ///
    /// # Outputs
    /// - The steering torque command, clamped to the vehicle's symmetric
    ///   torque bound.
    /// - The desired steering angle in degrees.
    /// - The diagnostic record for this cycle.
    pub fn update(
        &mut self,
        active: bool,
        vehicle: &VehicleState,
        live: &LiveParams,
        limits: &Limits,
        model: &dyn VehicleModel,
        desired_curvature: f64,
        _desired_curvature_rate: f64,
    ) -> (f64, f64, LatCtrlLog) {
        let v_ego = vehicle.v_ego;
        let steers_max = limits.steer_max(v_ego);

        // Actuator gain varies with speed, two-branch power law with a knee
        // at 85 km/h
        let torque_scale = if v_ego < TORQUE_SCALE_KNEE_KPH * KPH_TO_MS {
            (0.45 + v_ego / 60.0).powi(2)
        }
        else {
            (0.13 + v_ego / 60.0).powf(0.8)
        };

        // Subtract the long-term offset, zero angle should correspond to
        // zero torque
        let angle_no_offset = vehicle.steering_angle_deg - live.angle_offset_average_deg;

        let mut desired_angle_deg =
            model.steer_from_curvature(-desired_curvature, v_ego, live.roll_rad) * RAD_TO_DEG;

        // Only add the offset that originates from vehicle model errors; the
        // sensor bias was already removed above
        desired_angle_deg += live.angle_offset_deg - live.angle_offset_average_deg;

        // Observer propagation happens every cycle, engaged or not
        let angle_steers_deg = self
            .observer
            .update(angle_no_offset, vehicle.steering_torque_eps / torque_scale);

        let lqr_output: f64;
        let output_steer: f64;

        if v_ego < MIN_STEER_SPEED_MS || !active {
            self.log.active = false;
            lqr_output = 0.0;
            output_steer = 0.0;
            self.reset();
        }
        else {
            self.log.active = true;

            // LQR feedback
            let u_lqr = desired_angle_deg / self.params.dc_gain - (self.k * self.observer.state())[0];
            lqr_output = torque_scale * u_lqr / self.params.scale;

            // Integrator
            if vehicle.steering_pressed {
                // Driver override: unwind towards zero at a fixed rate,
                // stopping exactly at zero
                let step = I_UNWIND_RATE.min(self.i_lqr.abs());
                self.i_lqr -= step * self.i_lqr.signum();
            }
            else {
                let error = desired_angle_deg - angle_steers_deg;
                let i = self.i_lqr + self.params.ki * I_RATE * error;
                let control = lqr_output + i;

                // Commit the update only when it does not push the combined
                // output past the bound in the direction of the error;
                // shrinking is always allowed
                if (error >= 0.0 && (control <= steers_max || i < 0.0))
                    || (error <= 0.0 && (control >= -steers_max || i > 0.0))
                {
                    self.i_lqr = i;
                }
            }

            output_steer = clamp(&(lqr_output + self.i_lqr), &-steers_max, &steers_max);
        }

        self.log.steering_angle_desired_deg = desired_angle_deg;
        self.log.steering_angle_deg = angle_steers_deg;
        self.log.i = self.i_lqr;
        self.log.lqr_output = lqr_output;
        self.log.output = output_steer;
        self.log.saturated = steers_max - output_steer.abs() < SATURATION_EPS;

        trace!(
            "LatCtrl output: {:.2} (lqr {:.2}, i {:.2})",
            output_steer,
            lqr_output,
            self.i_lqr
        );

        (output_steer, desired_angle_deg, self.log)
    }
}

impl Archived for LatCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_log.serialise(self.log)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use veh_if::BicycleModel;

    /// A deliberately simple tuning: the observer state tracks the
    /// measurement in one step (x1' = x1 + e) and the plant DC gain and loop
    /// scale are unity, so expected outputs can be computed by hand.
    fn test_params(ki: f64) -> Params {
        Params {
            a: [1.0, 0.0, 0.0, 0.0],
            b: [0.0, 0.0],
            c: [1.0, 0.0],
            k: [1.0, 0.0],
            l: [1.0, 0.0],
            dc_gain: 1.0,
            scale: 1.0,
            ki,
        }
    }

    fn test_limits(steer_max: f64) -> Limits {
        Limits {
            steer_max_bp: vec![0.0],
            steer_max_v: vec![steer_max],
            accel_min: -3.5,
            accel_max: 2.0,
            v_ego_stopping: 0.5,
            v_ego_starting: 0.5,
        }
    }

    fn test_model() -> BicycleModel {
        BicycleModel {
            wheelbase_m: 2.7,
            steer_ratio: 13.5,
        }
    }

    fn torque_scale(v_ego: f64) -> f64 {
        if v_ego < TORQUE_SCALE_KNEE_KPH * KPH_TO_MS {
            (0.45 + v_ego / 60.0).powi(2)
        }
        else {
            (0.13 + v_ego / 60.0).powf(0.8)
        }
    }

    #[test]
    fn test_zero_dc_gain_rejected() {
        let mut params = test_params(0.0);
        params.dc_gain = 0.0;

        assert!(matches!(
            LatCtrl::from_params(params),
            Err(LatCtrlError::ZeroDcGain)
        ));
    }

    #[test]
    fn test_inactive_outputs_zero() {
        let mut lat = LatCtrl::from_params(test_params(0.05)).unwrap();

        let vehicle = VehicleState::default();
        let (output, _, log) = lat.update(
            false,
            &vehicle,
            &LiveParams::default(),
            &test_limits(100.0),
            &test_model(),
            0.0,
            0.0,
        );

        assert_eq!(output, 0.0);
        assert!(!log.active);
        assert_eq!(log.i, 0.0);
    }

    #[test]
    fn test_pure_lqr_term_at_rest() {
        // ki = 0 so the output is exactly the LQR term
        let mut lat = LatCtrl::from_params(test_params(0.0)).unwrap();

        let vehicle = VehicleState {
            v_ego: 30.0,
            ..VehicleState::default()
        };
        // Instantaneous offset produces a 2 degree desired angle with zero
        // curvature
        let live = LiveParams {
            angle_offset_deg: 2.0,
            ..LiveParams::default()
        };

        let (output, desired_deg, log) = lat.update(
            true,
            &vehicle,
            &live,
            &test_limits(100.0),
            &test_model(),
            0.0,
            0.0,
        );

        assert!((desired_deg - 2.0).abs() < 1e-12);

        // Observer at rest: u = desired / dc_gain - K.x = 2.0
        let expected = torque_scale(30.0) * 2.0;
        assert!((output - expected).abs() < 1e-9);
        assert!((log.lqr_output - expected).abs() < 1e-9);
        assert_eq!(log.i, 0.0);
    }

    #[test]
    fn test_output_bounded() {
        let mut lat = LatCtrl::from_params(test_params(0.05)).unwrap();

        let vehicle = VehicleState {
            v_ego: 20.0,
            ..VehicleState::default()
        };
        let limits = test_limits(3.0);

        for _ in 0..200 {
            let (output, _, _) = lat.update(
                true,
                &vehicle,
                &LiveParams::default(),
                &limits,
                &test_model(),
                // Absurd curvature demand, the output must stay bounded
                0.5,
                0.0,
            );
            assert!(output.abs() <= 3.0);
        }
    }

    #[test]
    fn test_saturation_flag() {
        let mut lat = LatCtrl::from_params(test_params(0.0)).unwrap();

        let vehicle = VehicleState {
            v_ego: 20.0,
            ..VehicleState::default()
        };
        let live = LiveParams {
            angle_offset_deg: 45.0,
            ..LiveParams::default()
        };

        let (output, _, log) = lat.update(
            true,
            &vehicle,
            &live,
            &test_limits(1.0),
            &test_model(),
            0.0,
            0.0,
        );

        assert_eq!(output, 1.0);
        assert!(log.saturated);
    }

    #[test]
    fn test_integrator_unwinds_to_zero_on_override() {
        let mut lat = LatCtrl::from_params(test_params(1.0)).unwrap();

        let vehicle = VehicleState {
            v_ego: 10.0,
            ..VehicleState::default()
        };
        let live = LiveParams {
            angle_offset_deg: 2.0,
            ..LiveParams::default()
        };
        let limits = test_limits(100.0);
        let model = test_model();

        // Wind the integrator up with a steady error
        for _ in 0..10 {
            lat.update(true, &vehicle, &live, &limits, &model, 0.0, 0.0);
        }
        assert!(lat.log().i > 0.0);

        // Driver override: magnitude must be non-increasing and reach
        // exactly zero within i / I_UNWIND_RATE cycles
        let pressed = VehicleState {
            steering_pressed: true,
            ..vehicle
        };
        let mut prev_i = lat.log().i.abs();
        let bound = (prev_i / I_UNWIND_RATE).ceil() as usize + 1;

        for _ in 0..bound {
            lat.update(true, &pressed, &live, &limits, &model, 0.0, 0.0);
            assert!(lat.log().i.abs() <= prev_i);
            prev_i = lat.log().i.abs();
        }
        assert_eq!(lat.log().i, 0.0);
    }

    #[test]
    fn test_observer_tracks_while_inactive() {
        let mut lat = LatCtrl::from_params(test_params(0.05)).unwrap();

        let vehicle = VehicleState {
            steering_angle_deg: 10.0,
            ..VehicleState::default()
        };

        // Inactive cycles still propagate the observer
        lat.update(
            false,
            &vehicle,
            &LiveParams::default(),
            &test_limits(100.0),
            &test_model(),
            0.0,
            0.0,
        );
        let (_, _, log) = lat.update(
            false,
            &vehicle,
            &LiveParams::default(),
            &test_limits(100.0),
            &test_model(),
            0.0,
            0.0,
        );

        // One-step tracking tuning: the estimate has reached the measurement
        assert!((log.steering_angle_deg - 10.0).abs() < 1e-9);
    }
}


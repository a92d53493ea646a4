//! # PI controller primitive
//!
//! A generic proportional-integral controller with feedforward,
//! speed-scheduled gains, output saturation and integrator anti-windup.
//! Used by the longitudinal controller; the lateral controller carries its
//! own integrator on top of the LQR term.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use util::maths::{clamp, lin_interp};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gain schedule for a [`PiController`].
///
/// The proportional and integral gains are looked up against vehicle speed
/// so the loop can be tuned softer at high speed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PiGains {
    /// Proportional gain breakpoints.
    ///
    /// Units: metres/second
    pub kp_bp: Vec<f64>,

    /// Proportional gain at each breakpoint.
    pub kp_v: Vec<f64>,

    /// Integral gain breakpoints.
    ///
    /// Units: metres/second
    pub ki_bp: Vec<f64>,

    /// Integral gain at each breakpoint.
    pub ki_v: Vec<f64>,

    /// Feedforward gain.
    pub kf: f64,
}

impl PiGains {
    /// True when both gain schedules are usable, with matching non-empty
    /// breakpoint and value tables.
    pub fn is_well_formed(&self) -> bool {
        !self.kp_bp.is_empty()
            && self.kp_bp.len() == self.kp_v.len()
            && !self.ki_bp.is_empty()
            && self.ki_bp.len() == self.ki_v.len()
    }
}

/// A PI controller with feedforward and anti-windup by clamping.
#[derive(Clone, Debug, Serialize)]
pub struct PiController {
    gains: PiGains,

    /// Positive output saturation limit.
    pub pos_limit: f64,

    /// Negative output saturation limit.
    pub neg_limit: f64,

    /// Integration period.
    ///
    /// Units: seconds
    dt_s: f64,

    /// The integral accumulation
    i: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PiController {
    /// Create a new controller with the given gain schedule and integration
    /// period.
    pub fn new(gains: PiGains, dt_s: f64) -> Self {
        Self {
            gains,
            pos_limit: 0.0,
            neg_limit: 0.0,
            dt_s,
            i: 0.0,
        }
    }

    /// The current integral accumulation.
    pub fn integral(&self) -> f64 {
        self.i
    }

    /// Clamp the integral accumulation into the given range.
    ///
    /// Used by overshoot-prevention logic to forbid a positive integral
    /// contribution.
    pub fn clamp_integral(&mut self, min: f64, max: f64) {
        self.i = clamp(&self.i, &min, &max);
    }

    /// Reset the controller, zeroing the integral accumulation.
    pub fn reset(&mut self) {
        self.i = 0.0;
    }

    /// Get the controller output for the given setpoint and measurement.
    ///
    /// The error within `deadzone` of zero is ignored on the integral path
    /// only, so the loop does not chatter around the setpoint. The integral
    /// update is rolled back when it would push the saturated output further
    /// past a limit in the direction of the error; updates which shrink the
    /// accumulation are always kept.
    pub fn update(
        &mut self,
        setpoint: f64,
        measurement: f64,
        speed: f64,
        deadzone: f64,
        feedforward: f64,
        freeze_integrator: bool,
    ) -> f64 {
        let error = setpoint - measurement;
        let i_error = if error.abs() < deadzone { 0.0 } else { error };

        let kp = lin_interp(speed, &self.gains.kp_bp, &self.gains.kp_v);
        let ki = lin_interp(speed, &self.gains.ki_bp, &self.gains.ki_v);

        let p = kp * error;
        let f = self.gains.kf * feedforward;

        let i_new = self.i + ki * i_error * self.dt_s;
        let control = p + f + i_new;

        // Commit the new accumulation when it moves the control away from the
        // limits, or towards the sign opposite the error
        if !freeze_integrator
            && ((i_error >= 0.0 && (control <= self.pos_limit || i_new < 0.0))
                || (i_error <= 0.0 && (control >= self.neg_limit || i_new > 0.0)))
        {
            self.i = i_new;
        }

        clamp(&(p + f + self.i), &self.neg_limit, &self.pos_limit)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn flat_gains(kp: f64, ki: f64, kf: f64) -> PiGains {
        PiGains {
            kp_bp: vec![0.0],
            kp_v: vec![kp],
            ki_bp: vec![0.0],
            ki_v: vec![ki],
            kf,
        }
    }

    fn controller(kp: f64, ki: f64, kf: f64) -> PiController {
        let mut pid = PiController::new(flat_gains(kp, ki, kf), 0.01);
        pid.pos_limit = 1.0;
        pid.neg_limit = -1.0;
        pid
    }

    #[test]
    fn test_proportional_only() {
        let mut pid = controller(2.0, 0.0, 0.0);

        assert!((pid.update(1.0, 0.9, 10.0, 0.0, 0.0, false) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_feedforward_term() {
        let mut pid = controller(0.0, 0.0, 0.5);

        assert!((pid.update(0.0, 0.0, 10.0, 0.0, 1.0, false) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_deadzone_freezes_integral_path_only() {
        let mut pid = controller(1.0, 1.0, 0.0);

        // Error within the deadzone: proportional term present, integral
        // unchanged
        let out = pid.update(0.05, 0.0, 10.0, 0.1, 0.0, false);
        assert_eq!(pid.integral(), 0.0);
        assert!((out - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_gain_tables_well_formed() {
        assert!(flat_gains(1.0, 1.0, 0.0).is_well_formed());

        let mut gains = flat_gains(1.0, 1.0, 0.0);
        gains.kp_v = vec![1.2, 0.8];
        assert!(!gains.is_well_formed());

        let mut gains = flat_gains(1.0, 1.0, 0.0);
        gains.ki_bp = vec![];
        gains.ki_v = vec![];
        assert!(!gains.is_well_formed());
    }

    #[test]
    fn test_integral_accumulates() {
        let mut pid = controller(0.0, 1.0, 0.0);
        // Keep the bound clear of the expected accumulation so the
        // anti-windup rollback never engages
        pid.pos_limit = 2.0;

        for _ in 0..100 {
            pid.update(1.0, 0.0, 10.0, 0.0, 0.0, false);
        }

        // 100 cycles of ki * error * dt = 100 * 1.0 * 1.0 * 0.01
        assert!((pid.integral() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_freeze_integrator() {
        let mut pid = controller(0.0, 1.0, 0.0);

        pid.update(1.0, 0.0, 10.0, 0.0, 0.0, true);
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn test_anti_windup_rollback() {
        let mut pid = controller(10.0, 1.0, 0.0);

        // Proportional term alone saturates, so the integral must not grow
        for _ in 0..50 {
            let out = pid.update(1.0, 0.0, 10.0, 0.0, 0.0, false);
            assert_eq!(out, 1.0);
        }
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn test_integral_can_shrink_while_saturated() {
        let mut pid = controller(10.0, 1.0, 0.0);

        // Wind the integral negative first with a small unsaturated error
        for _ in 0..100 {
            pid.update(-0.05, 0.0, 10.0, 0.0, 0.0, false);
        }
        let i_before = pid.integral();
        assert!(i_before < 0.0);

        // Saturated positive demand: accumulation moves towards zero even
        // though the output is pinned at the limit
        pid.update(1.0, 0.0, 10.0, 0.0, 0.0, false);
        assert!(pid.integral() > i_before);
    }

    #[test]
    fn test_output_clamped() {
        let mut pid = controller(100.0, 0.0, 0.0);

        assert_eq!(pid.update(1.0, 0.0, 10.0, 0.0, 0.0, false), 1.0);
        assert_eq!(pid.update(-1.0, 0.0, 10.0, 0.0, 0.0, false), -1.0);
    }

    #[test]
    fn test_reset_zeroes_integral() {
        let mut pid = controller(0.0, 1.0, 0.0);

        pid.update(1.0, 0.0, 10.0, 0.0, 0.0, false);
        assert!(pid.integral() > 0.0);

        pid.reset();
        assert_eq!(pid.integral(), 0.0);
    }
}

//! Steering angle observer
//!
//! A fixed-gain discrete-time linear estimator of the true steering angle.
//! The gain `L` is supplied by tuning rather than recomputed online, so each
//! update is a handful of 2-vector operations with no heap allocation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix2, RowVector2, Vector2};

// Internal
use super::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Fixed-gain observer over the 2-state steering model.
#[derive(Debug, Clone)]
pub struct SteerObserver {
    a: Matrix2<f64>,
    b: Vector2<f64>,
    c: RowVector2<f64>,
    l: Vector2<f64>,

    /// Estimated state, persisted across cycles.
    x_hat: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteerObserver {
    /// Build the observer from the lateral tuning parameters, with the state
    /// estimate zeroed.
    pub fn new(params: &Params) -> Self {
        Self {
            a: Matrix2::new(params.a[0], params.a[1], params.a[2], params.a[3]),
            b: Vector2::new(params.b[0], params.b[1]),
            c: RowVector2::new(params.c[0], params.c[1]),
            l: Vector2::new(params.l[0], params.l[1]),
            x_hat: Vector2::zeros(),
        }
    }

    /// The current estimated state.
    pub fn state(&self) -> &Vector2<f64> {
        &self.x_hat
    }

    /// The steering angle predicted by the current state estimate.
    ///
    /// Units: degrees
    pub fn angle_deg(&self) -> f64 {
        (self.c * self.x_hat)[0]
    }

    /// Propagate the estimate by one cycle.
    ///
    /// Returns the angle estimate prior to propagation, which is the value
    /// the innovation was computed against.
    ///
    /// # Inputs
    /// - `measured_angle_deg`: offset-free measured steering angle, degrees
    /// - `scaled_torque`: applied EPS torque divided by the speed-dependent
    ///   torque scale
    pub fn update(&mut self, measured_angle_deg: f64, scaled_torque: f64) -> f64 {
        let angle_deg = self.angle_deg();
        let innovation = measured_angle_deg - angle_deg;

        self.x_hat = self.a * self.x_hat + self.b * scaled_torque + self.l * innovation;

        angle_deg
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// A marginally stable tuning where the estimate simply tracks the
    /// measurement: x1' = x1 + e, so the angle estimate converges in one
    /// step.
    fn tracking_params() -> Params {
        Params {
            a: [1.0, 0.0, 0.0, 0.0],
            b: [0.0, 0.0],
            c: [1.0, 0.0],
            k: [0.0, 0.0],
            l: [1.0, 0.0],
            dc_gain: 1.0,
            scale: 1.0,
            ki: 0.0,
        }
    }

    #[test]
    fn test_starts_at_zero() {
        let obs = SteerObserver::new(&tracking_params());
        assert_eq!(obs.angle_deg(), 0.0);
    }

    #[test]
    fn test_returns_prior_estimate() {
        let mut obs = SteerObserver::new(&tracking_params());

        // First update sees the zero prior
        assert_eq!(obs.update(5.0, 0.0), 0.0);

        // With unity correction gain the estimate has jumped to the
        // measurement
        assert_eq!(obs.angle_deg(), 5.0);
        assert_eq!(obs.update(5.0, 0.0), 5.0);
    }
}

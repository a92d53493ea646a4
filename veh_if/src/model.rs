//! Vehicle model collaborator interface
//!
//! The controllers only depend on the [`VehicleModel`] trait; the kinematic
//! model that converts curvature into steering angle lives outside the
//! control core. [`BicycleModel`] is a simple implementation used by the
//! cyclic executive and the unit tests.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Standard gravity, used for road roll compensation.
///
/// Units: metres/second^2
const GRAVITY_MS2: f64 = 9.81;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The kinematic vehicle model consumed by the lateral controller.
pub trait VehicleModel {
    /// Get the steering wheel angle which achieves the given path curvature
    /// at the given speed.
    ///
    /// # Inputs
    /// - `curvature`: path curvature, 1/metres
    /// - `v_ego`: vehicle speed, metres/second
    /// - `roll_rad`: road roll angle, radians
    ///
    /// # Outputs
    /// - Steering wheel angle in radians.
    fn steer_from_curvature(&self, curvature: f64, v_ego: f64, roll_rad: f64) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A kinematic bicycle model with small-angle steering geometry and road
/// roll compensation.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct BicycleModel {
    /// Distance between the front and rear axles.
    ///
    /// Units: metres
    pub wheelbase_m: f64,

    /// Ratio of steering wheel angle to road wheel angle.
    pub steer_ratio: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VehicleModel for BicycleModel {
    fn steer_from_curvature(&self, curvature: f64, v_ego: f64, roll_rad: f64) -> f64 {
        // Lateral acceleration due to road roll reduces the curvature the
        // steering geometry has to provide. Floor the speed so the
        // compensation stays bounded at standstill.
        let v = v_ego.max(1.0);
        let roll_curvature = roll_rad.sin() * GRAVITY_MS2 / (v * v);

        (self.wheelbase_m * (curvature - roll_curvature)).atan() * self.steer_ratio
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_straight_road_zero_angle() {
        let model = BicycleModel {
            wheelbase_m: 2.7,
            steer_ratio: 13.5,
        };

        assert_eq!(model.steer_from_curvature(0.0, 20.0, 0.0), 0.0);
    }

    #[test]
    fn test_steer_sign_follows_curvature() {
        let model = BicycleModel {
            wheelbase_m: 2.7,
            steer_ratio: 13.5,
        };

        assert!(model.steer_from_curvature(0.01, 20.0, 0.0) > 0.0);
        assert!(model.steer_from_curvature(-0.01, 20.0, 0.0) < 0.0);
    }
}

//! Longitudinal control state machine
//!
//! The mode is a reified enum with a pure transition function, so the
//! transition table can be tested exhaustively and independently of the PID
//! loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use veh_if::{LeadInfo, Limits, VehicleState};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Executing mode of the longitudinal controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LongCtrlMode {
    /// Controller disengaged, no output.
    Off,

    /// Tracking the planned speed with the PID loop.
    Tracking,

    /// Ramping the brakes on to come to and hold a stop.
    Stopping,
}

impl Default for LongCtrlMode {
    fn default() -> Self {
        LongCtrlMode::Off
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// True when the controller should move from tracking into stopping: the
/// cruise system is holding at standstill, or the vehicle is slow and either
/// the plan ends in a stop or the driver is braking.
pub fn stopping_condition(
    vehicle: &VehicleState,
    limits: &Limits,
    v_pid: f64,
    v_target_future: f64,
) -> bool {
    (vehicle.v_ego < 2.0 && vehicle.cruise_standstill)
        || (vehicle.v_ego < limits.v_ego_stopping
            && ((v_pid < limits.v_ego_stopping && v_target_future < limits.v_ego_stopping)
                || vehicle.brake_pressed))
}

/// True when the controller should move from stopping back into tracking:
/// the plan wants to move off and the cruise system is not holding.
///
/// When a valid lead track is available, starting is additionally gated on
/// the lead itself moving, so the vehicle does not creep into a still-slow
/// lead. An absent or invalid lead does not block starting.
pub fn starting_condition(
    v_target_future: f64,
    cruise_standstill: bool,
    lead: Option<&LeadInfo>,
    limits: &Limits,
) -> bool {
    let mut starting = v_target_future > limits.v_ego_starting && !cruise_standstill;

    if let Some(lead) = lead {
        if lead.status {
            starting = starting && lead.v_lead > limits.v_ego_starting;
        }
    }

    starting
}

/// Update the longitudinal control mode.
///
/// Deactivation forces `Off` from any mode; an active controller leaves
/// `Off` on the very next cycle. No other transitions exist.
pub fn mode_transition(
    mode: LongCtrlMode,
    active: bool,
    stopping: bool,
    starting: bool,
) -> LongCtrlMode {
    if !active {
        return LongCtrlMode::Off;
    }

    match mode {
        LongCtrlMode::Off => LongCtrlMode::Tracking,
        LongCtrlMode::Tracking => {
            if stopping {
                LongCtrlMode::Stopping
            }
            else {
                LongCtrlMode::Tracking
            }
        }
        LongCtrlMode::Stopping => {
            if starting {
                LongCtrlMode::Tracking
            }
            else {
                LongCtrlMode::Stopping
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_limits() -> Limits {
        Limits {
            steer_max_bp: vec![0.0],
            steer_max_v: vec![409.0],
            accel_min: -3.5,
            accel_max: 2.0,
            v_ego_stopping: 0.5,
            v_ego_starting: 0.5,
        }
    }

    /// Every (mode, condition) combination of the transition table.
    #[test]
    fn test_transition_table() {
        use LongCtrlMode::*;

        let modes = [Off, Tracking, Stopping];

        // Inactive forces Off from any mode, whatever the conditions say
        for &mode in &modes {
            for &stopping in &[false, true] {
                for &starting in &[false, true] {
                    assert_eq!(mode_transition(mode, false, stopping, starting), Off);
                }
            }
        }

        // Active, neither condition
        assert_eq!(mode_transition(Off, true, false, false), Tracking);
        assert_eq!(mode_transition(Tracking, true, false, false), Tracking);
        assert_eq!(mode_transition(Stopping, true, false, false), Stopping);

        // Active, stopping condition
        assert_eq!(mode_transition(Off, true, true, false), Tracking);
        assert_eq!(mode_transition(Tracking, true, true, false), Stopping);
        assert_eq!(mode_transition(Stopping, true, true, false), Stopping);

        // Active, starting condition
        assert_eq!(mode_transition(Off, true, false, true), Tracking);
        assert_eq!(mode_transition(Tracking, true, false, true), Tracking);
        assert_eq!(mode_transition(Stopping, true, false, true), Tracking);
    }

    #[test]
    fn test_stopping_condition() {
        let limits = test_limits();

        // Cruise standstill at low speed
        let vehicle = VehicleState {
            v_ego: 1.0,
            cruise_standstill: true,
            ..VehicleState::default()
        };
        assert!(stopping_condition(&vehicle, &limits, 10.0, 10.0));

        // Slow with a plan ending in a stop
        let vehicle = VehicleState {
            v_ego: 0.4,
            ..VehicleState::default()
        };
        assert!(stopping_condition(&vehicle, &limits, 0.1, 0.1));

        // Slow with the driver braking
        let vehicle = VehicleState {
            v_ego: 0.4,
            brake_pressed: true,
            ..VehicleState::default()
        };
        assert!(stopping_condition(&vehicle, &limits, 10.0, 10.0));

        // Fast: no stop
        let vehicle = VehicleState {
            v_ego: 10.0,
            ..VehicleState::default()
        };
        assert!(!stopping_condition(&vehicle, &limits, 0.1, 0.1));
    }

    #[test]
    fn test_starting_condition_lead_gating() {
        let limits = test_limits();

        // No lead info: permissive
        assert!(starting_condition(1.0, false, None, &limits));

        // Invalid lead track: permissive
        let lead = LeadInfo {
            v_lead: 0.0,
            status: false,
        };
        assert!(starting_condition(1.0, false, Some(&lead), &limits));

        // Valid but still-slow lead blocks starting
        let lead = LeadInfo {
            v_lead: 0.2,
            status: true,
        };
        assert!(!starting_condition(1.0, false, Some(&lead), &limits));

        // Valid moving lead allows starting
        let lead = LeadInfo {
            v_lead: 2.0,
            status: true,
        };
        assert!(starting_condition(1.0, false, Some(&lead), &limits));

        // Cruise standstill always blocks starting
        assert!(!starting_condition(1.0, true, None, &limits));
    }
}

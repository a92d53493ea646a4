//! Unit conversion constants

/// Kilometres per hour to metres per second
pub const KPH_TO_MS: f64 = 1.0 / 3.6;

/// Metres per second to kilometres per hour
pub const MS_TO_KPH: f64 = 3.6;

/// Degrees to radians
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees
pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

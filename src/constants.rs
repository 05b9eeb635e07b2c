//! Physical and astrodynamic constants.

/// Earth gravitational parameter (km³/s²), WGS84
pub const MU_EARTH: f64 = 398600.4418;

/// Earth equatorial radius (km), WGS84
pub const R_EARTH: f64 = 6378.137;

/// Seconds per solar day
pub const SOLAR_DAY: f64 = 86400.0;

/// Two pi
pub const TAU: f64 = std::f64::consts::TAU;

/// Degrees to radians
pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees
pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;

/// Kepler solver: stop once the Newton step falls below this (rad).
pub const KEPLER_TOLERANCE: f64 = 1e-8;

/// Kepler solver: hard cap on Newton iterations.
pub const KEPLER_MAX_ITERATIONS: usize = 10;

/// Two-digit TLE years below this map to 20YY, the rest to 19YY.
///
/// Epochs from 2057 onward cannot be represented.
pub const TLE_YEAR_PIVOT: u16 = 57;

/// Width of a TLE line in columns.
pub const TLE_LINE_LEN: usize = 69;

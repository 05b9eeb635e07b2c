//! Keplerian orbital elements derived from a TLE.
//!
//! [`OrbitalElements`] is built once from a parsed [`Tle`] and never
//! changes afterwards; propagation only ever borrows it.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::tle::Tle;

const NANOS_PER_DAY: i64 = 86_400_000_000_000;

/// Rejected element values when loading a serialized element set.
#[derive(Error, Debug, PartialEq)]
pub enum ElementsError {
    #[error("Gravitational parameter must be positive and finite, got {0}")]
    InvalidMu(f64),

    #[error("Mean motion must be positive and finite, got {0} rad/s")]
    InvalidMeanMotion(f64),

    #[error("Eccentricity must lie in [0, 1), got {0}")]
    InvalidEccentricity(f64),

    #[error("Angle '{0}' is not finite")]
    NonFiniteAngle(&'static str),
}

/// Two-body orbital elements of one spacecraft.
///
/// Deserializing goes through [`StoredElements`]: the semi-major axis is
/// recomputed from `mu` and `n`, and a stored `a` is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredElements")]
pub struct OrbitalElements {
    name: String,
    epoch: DateTime<Utc>,
    mu: f64,
    a: f64,
    e: f64,
    i: f64,
    raan: f64,
    omega: f64,
    m0: f64,
    n: f64,
}

impl OrbitalElements {
    /// Elements about Earth (`mu = MU_EARTH`).
    pub fn from_tle(tle: &Tle) -> Self {
        Self::from_tle_with_mu(tle, MU_EARTH)
    }

    /// Elements about a body with gravitational parameter `mu` (km³/s²).
    ///
    /// The semi-major axis follows from the TLE mean motion through
    /// Kepler's third law, a = (μ / n²)^(1/3).
    pub fn from_tle_with_mu(tle: &Tle, mu: f64) -> Self {
        let n = tle.mean_motion_rev_day * TAU / SOLAR_DAY;
        let a = (mu / n.powi(2)).powf(1.0 / 3.0);

        Self {
            name: tle.catalog.clone(),
            epoch: epoch_from_day_of_year(full_year(tle.epoch_year_2d), tle.epoch_day),
            mu,
            a,
            e: tle.eccentricity,
            i: tle.inclination_deg * DEG2RAD,
            raan: tle.raan_deg * DEG2RAD,
            omega: tle.arg_perigee_deg * DEG2RAD,
            m0: tle.mean_anomaly_deg * DEG2RAD,
            n,
        }
    }

    /// Catalog identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Epoch of the element set (UTC).
    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Gravitational parameter the elements were derived with (km³/s²).
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Semi-major axis (km)
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Eccentricity
    pub fn e(&self) -> f64 {
        self.e
    }

    /// Inclination (rad)
    pub fn i(&self) -> f64 {
        self.i
    }

    /// Right ascension of ascending node (rad)
    pub fn raan(&self) -> f64 {
        self.raan
    }

    /// Argument of periapsis (rad)
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Mean anomaly at epoch (rad)
    pub fn m0(&self) -> f64 {
        self.m0
    }

    /// Mean motion (rad/s)
    pub fn n(&self) -> f64 {
        self.n
    }

    /// Orbital period (seconds).
    pub fn period(&self) -> f64 {
        TAU / self.n
    }

    /// Periapsis radius (km).
    pub fn perigee_radius(&self) -> f64 {
        self.a * (1.0 - self.e)
    }

    /// Apoapsis radius (km).
    pub fn apogee_radius(&self) -> f64 {
        self.a * (1.0 + self.e)
    }

    /// Mean anomaly `t` seconds after epoch (rad), not wrapped.
    pub fn mean_anomaly_at(&self, t: f64) -> f64 {
        self.m0 + self.n * t
    }
}

impl std::fmt::Display for OrbitalElements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Spacecraft {}: a={:.1} km, e={:.4}, i={:.1}°",
            self.name,
            self.a,
            self.e,
            self.i * RAD2DEG,
        )
    }
}

/// Serialized form of [`OrbitalElements`], without the derived `a`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredElements {
    pub name: String,
    pub epoch: DateTime<Utc>,
    pub mu: f64,
    pub e: f64,
    pub i: f64,
    pub raan: f64,
    pub omega: f64,
    pub m0: f64,
    pub n: f64,
}

impl TryFrom<StoredElements> for OrbitalElements {
    type Error = ElementsError;

    fn try_from(raw: StoredElements) -> Result<Self, Self::Error> {
        if !(raw.mu.is_finite() && raw.mu > 0.0) {
            return Err(ElementsError::InvalidMu(raw.mu));
        }
        if !(raw.n.is_finite() && raw.n > 0.0) {
            return Err(ElementsError::InvalidMeanMotion(raw.n));
        }
        if !(0.0..1.0).contains(&raw.e) {
            return Err(ElementsError::InvalidEccentricity(raw.e));
        }
        let angles = [("i", raw.i), ("raan", raw.raan), ("omega", raw.omega), ("m0", raw.m0)];
        for (field, value) in angles {
            if !value.is_finite() {
                return Err(ElementsError::NonFiniteAngle(field));
            }
        }

        Ok(Self {
            name: raw.name,
            epoch: raw.epoch,
            mu: raw.mu,
            a: (raw.mu / raw.n.powi(2)).powf(1.0 / 3.0),
            e: raw.e,
            i: raw.i,
            raan: raw.raan,
            omega: raw.omega,
            m0: raw.m0,
            n: raw.n,
        })
    }
}

/// Full year for a two-digit TLE year: below [`TLE_YEAR_PIVOT`] is 20YY,
/// otherwise 19YY.
pub fn full_year(two_digit: u16) -> i32 {
    let yy = i32::from(two_digit);
    if two_digit < TLE_YEAR_PIVOT {
        2000 + yy
    } else {
        1900 + yy
    }
}

/// Midnight, January 1 of `year`, plus `day_of_year - 1` days.
///
/// Resolved to the nanosecond. Valid for years 1678 through 2261.
pub fn epoch_from_day_of_year(year: i32, day_of_year: f64) -> DateTime<Utc> {
    let jan1_ns = days_since_unix_epoch_jan1(year) * NANOS_PER_DAY;
    let offset_ns = ((day_of_year - 1.0) * NANOS_PER_DAY as f64).round() as i64;
    Utc.timestamp_nanos(jan1_ns + offset_ns)
}

/// Days from 1970-01-01 to January 1 of the given year (proleptic Gregorian).
fn days_since_unix_epoch_jan1(year: i32) -> i64 {
    let leap_days = |y: i64| y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400);
    let y = year as i64;
    365 * (y - 1970) + leap_days(y - 1) - leap_days(1969)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Datelike, Timelike};

    const ISS_LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    fn iss() -> OrbitalElements {
        Tle::parse(ISS_LINE1, ISS_LINE2).unwrap().to_elements()
    }

    #[test]
    fn test_leo_reference_fixture() {
        let elems = iss();
        assert!(elems.a() > 6700.0 && elems.a() < 6900.0, "a={} km", elems.a());
        assert!(elems.e() < 0.01);
        let period_min = elems.period() / 60.0;
        assert!(period_min > 90.0 && period_min < 95.0, "period={period_min} min");
        assert_eq!(elems.name(), "25544");
    }

    #[test]
    fn test_semi_major_axis_invariant() {
        let elems = iss();
        assert_relative_eq!(
            elems.a(),
            (MU_EARTH / elems.n().powi(2)).cbrt(),
            max_relative = 1e-14
        );
        assert_relative_eq!(elems.period(), SOLAR_DAY / 15.72125391, max_relative = 1e-12);
    }

    #[test]
    fn test_angles_in_radians() {
        let elems = iss();
        assert_relative_eq!(elems.i(), 51.6416 * DEG2RAD, epsilon = 1e-12);
        assert_relative_eq!(elems.raan(), 247.4627 * DEG2RAD, epsilon = 1e-12);
        assert_relative_eq!(elems.omega(), 130.536 * DEG2RAD, epsilon = 1e-12);
        assert_relative_eq!(elems.m0(), 325.0288 * DEG2RAD, epsilon = 1e-12);
    }

    #[test]
    fn test_custom_mu() {
        let tle = Tle::parse(ISS_LINE1, ISS_LINE2).unwrap();
        let earth = OrbitalElements::from_tle(&tle);
        let heavier = OrbitalElements::from_tle_with_mu(&tle, 8.0 * MU_EARTH);
        assert_relative_eq!(heavier.a(), 2.0 * earth.a(), max_relative = 1e-12);
        assert_relative_eq!(heavier.n(), earth.n(), max_relative = 1e-15);
        assert_eq!(heavier.mu(), 8.0 * MU_EARTH);
    }

    #[test]
    fn test_epoch_resolution() {
        let epoch = iss().epoch();
        // Day 264.51782528 of 2008 (leap year) is 20 September.
        assert_eq!((epoch.year(), epoch.month(), epoch.day()), (2008, 9, 20));
        let secs = epoch.num_seconds_from_midnight() as f64 + epoch.nanosecond() as f64 * 1e-9;
        assert_relative_eq!(secs, 0.51782528 * SOLAR_DAY, epsilon = 1e-3);
    }

    #[test]
    fn test_year_pivot() {
        assert_eq!(full_year(0), 2000);
        assert_eq!(full_year(56), 2056);
        assert_eq!(full_year(57), 1957);
        assert_eq!(full_year(99), 1999);

        let l1 = "1 99999U 04005A   56365.00000000  .00000100  00000-0  00000-0 0  9990";
        let l2 = "2 99999   0.0000   0.0000 0000000   0.0000   0.0000 15.00000000    14";
        let epoch = Tle::parse(l1, l2).unwrap().to_elements().epoch();
        assert_eq!((epoch.year(), epoch.month(), epoch.day()), (2056, 12, 30));

        let l1 = "1 99998U 04005A   57001.00000000  .00000100  00000-0  00000-0 0  9997";
        let l2 = "2 99998  98.0000  10.0000 0001000   0.0000   0.0000 14.50000000    16";
        let epoch = Tle::parse(l1, l2).unwrap().to_elements().epoch();
        assert_eq!(epoch, Utc.with_ymd_and_hms(1957, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_json_round_trip_recomputes_a() {
        let elems = iss();
        let json = serde_json::to_string(&elems).unwrap();
        let back: OrbitalElements = serde_json::from_str(&json).unwrap();
        assert_eq!(back, elems);

        // A stored semi-major axis that disagrees with mu and n is not trusted.
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["a"] = serde_json::json!(1.0);
        let back: OrbitalElements = serde_json::from_value(value).unwrap();
        assert_eq!(back.a(), elems.a());
    }

    #[test]
    fn test_json_rejects_invalid_elements() {
        let json = serde_json::to_value(iss()).unwrap();

        let mut hyperbolic = json.clone();
        hyperbolic["e"] = serde_json::json!(1.5);
        let err = serde_json::from_value::<OrbitalElements>(hyperbolic).unwrap_err();
        assert!(err.to_string().contains("Eccentricity"), "{err}");

        let mut stalled = json.clone();
        stalled["n"] = serde_json::json!(0.0);
        let err = serde_json::from_value::<OrbitalElements>(stalled).unwrap_err();
        assert!(err.to_string().contains("Mean motion"), "{err}");

        let mut massless = json;
        massless["mu"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<OrbitalElements>(massless).is_err());
    }

    #[test]
    fn test_stored_elements_validation() {
        let raw = StoredElements {
            name: "X".into(),
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            mu: MU_EARTH,
            e: 0.1,
            i: f64::NAN,
            raan: 0.0,
            omega: 0.0,
            m0: 0.0,
            n: 1e-3,
        };
        assert_eq!(
            OrbitalElements::try_from(raw.clone()),
            Err(ElementsError::NonFiniteAngle("i"))
        );

        let elems = OrbitalElements::try_from(StoredElements { i: 0.5, ..raw }).unwrap();
        assert_relative_eq!(elems.a(), (MU_EARTH / 1e-6).cbrt(), max_relative = 1e-14);
    }

    #[test]
    fn test_epoch_day_one_is_midnight_jan1() {
        let epoch = epoch_from_day_of_year(1957, 1.0);
        assert_eq!(epoch, Utc.with_ymd_and_hms(1957, 1, 1, 0, 0, 0).unwrap());

        let epoch = epoch_from_day_of_year(2024, 1.5);
        assert_eq!(epoch, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());

        let epoch = epoch_from_day_of_year(2000, 366.0);
        assert_eq!(epoch, Utc.with_ymd_and_hms(2000, 12, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_apsides() {
        let elems = iss();
        assert!(elems.perigee_radius() < elems.a());
        assert!(elems.apogee_radius() > elems.a());
        assert_relative_eq!(
            elems.perigee_radius() + elems.apogee_radius(),
            2.0 * elems.a(),
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_display() {
        let text = iss().to_string();
        assert!(text.starts_with("Spacecraft 25544: a="));
        assert!(text.contains("i=51.6°"));
    }
}

//! Perifocal (PQW) to inertial (ECI) position transform.
//!
//! The rotation is Q = R3(-Ω) · R1(-i) · R3(-ω), the inverse of the
//! classical ω, i, Ω sequence, written out as an explicit matrix.

/// Rotation matrix, row-major.
pub type Matrix3 = [[f64; 3]; 3];

/// True anomaly from eccentric anomaly (rad).
///
/// Uses the half-angle form with `atan2`, so the quadrant is kept over
/// the whole revolution: E in [0, 2π) maps to ν in [0, 2π).
pub fn true_anomaly(ea: f64, e: f64) -> f64 {
    2.0 * ((1.0 + e).sqrt() * (ea / 2.0).sin()).atan2((1.0 - e).sqrt() * (ea / 2.0).cos())
}

/// Orbital radius at eccentric anomaly `ea` (km).
pub fn orbital_radius(a: f64, e: f64, ea: f64) -> f64 {
    a * (1.0 - e * ea.cos())
}

/// Position in the perifocal frame (km).
pub fn perifocal_position(r: f64, nu: f64) -> [f64; 3] {
    [r * nu.cos(), r * nu.sin(), 0.0]
}

/// PQW → ECI rotation matrix.
pub fn perifocal_to_inertial(raan: f64, i: f64, omega: f64) -> Matrix3 {
    let cos_raan = raan.cos();
    let sin_raan = raan.sin();
    let cos_aop = omega.cos();
    let sin_aop = omega.sin();
    let cos_i = i.cos();
    let sin_i = i.sin();

    [
        [
            cos_raan * cos_aop - sin_raan * sin_aop * cos_i,
            -cos_raan * sin_aop - sin_raan * cos_aop * cos_i,
            sin_raan * sin_i,
        ],
        [
            sin_raan * cos_aop + cos_raan * sin_aop * cos_i,
            -sin_raan * sin_aop + cos_raan * cos_aop * cos_i,
            -cos_raan * sin_i,
        ],
        [sin_aop * sin_i, cos_aop * sin_i, cos_i],
    ]
}

/// Apply a rotation matrix to a vector.
pub fn rotate(m: &Matrix3, v: [f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for j in 0..3 {
        for k in 0..3 {
            out[j] += m[j][k] * v[k];
        }
    }
    out
}

/// Inertial position (km) for the given elements at eccentric anomaly `ea`.
pub fn position_from_eccentric_anomaly(
    a: f64,
    e: f64,
    raan: f64,
    i: f64,
    omega: f64,
    ea: f64,
) -> [f64; 3] {
    let nu = true_anomaly(ea, e);
    let r = orbital_radius(a, e, ea);
    rotate(&perifocal_to_inertial(raan, i, omega), perifocal_position(r, nu))
}

/// Euclidean norm.
pub fn norm(v: [f64; 3]) -> f64 {
    (v[0].powi(2) + v[1].powi(2) + v[2].powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    /// R3(θ) as in the classical convention (frame rotation about z).
    fn r3(theta: f64) -> Matrix3 {
        let (s, c) = theta.sin_cos();
        [[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]]
    }

    /// R1(θ), frame rotation about x.
    fn r1(theta: f64) -> Matrix3 {
        let (s, c) = theta.sin_cos();
        [[1.0, 0.0, 0.0], [0.0, c, s], [0.0, -s, c]]
    }

    fn matmul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
        let mut out = [[0.0; 3]; 3];
        for r in 0..3 {
            for c in 0..3 {
                for k in 0..3 {
                    out[r][c] += a[r][k] * b[k][c];
                }
            }
        }
        out
    }

    #[test]
    fn test_matrix_matches_composed_rotations() {
        let (raan, i, omega) = (1.1, 0.7, 2.9);
        let composed = matmul(&matmul(&r3(-raan), &r1(-i)), &r3(-omega));
        let q = perifocal_to_inertial(raan, i, omega);
        for r in 0..3 {
            for c in 0..3 {
                assert_relative_eq!(q[r][c], composed[r][c], epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_identity_transform_is_exact() {
        let a = 7000.0;
        let e = 0.1;
        for &ea in &[0.0, 0.4, 2.0, -1.3, 5.5] {
            let nu = true_anomaly(ea, e);
            let pqw = perifocal_position(orbital_radius(a, e, ea), nu);
            let eci = position_from_eccentric_anomaly(a, e, 0.0, 0.0, 0.0, ea);
            assert_eq!(eci, pqw);
        }
    }

    #[test]
    fn test_true_anomaly_quadrants() {
        let e = 0.3;
        assert_eq!(true_anomaly(0.0, e), 0.0);
        assert_relative_eq!(true_anomaly(PI, e), PI, epsilon = 1e-12);

        // Past apoapsis ν keeps increasing instead of folding back.
        let ea = 1.5 * PI;
        let nu = true_anomaly(ea, e);
        assert!(nu > PI && nu < 2.0 * PI, "nu={nu}");
        assert_relative_eq!(nu.cos(), (ea.cos() - e) / (1.0 - e * ea.cos()), epsilon = 1e-12);

        // ν leads E on the outbound leg.
        assert!(true_anomaly(FRAC_PI_2, e) > FRAC_PI_2);
    }

    #[test]
    fn test_circular_true_anomaly_equals_eccentric() {
        for &ea in &[0.1, 1.0, 2.5, -2.5] {
            assert_relative_eq!(true_anomaly(ea, 0.0), ea, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_radius_at_apsides() {
        let (a, e) = (26_000.0, 0.72);
        assert_relative_eq!(orbital_radius(a, e, 0.0), a * (1.0 - e), epsilon = 1e-9);
        assert_relative_eq!(orbital_radius(a, e, PI), a * (1.0 + e), epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_preserves_radius() {
        let (a, e, ea) = (26_000.0, 0.72, 2.2);
        let r = orbital_radius(a, e, ea);
        let pos = position_from_eccentric_anomaly(a, e, 4.0, 1.1, 4.7, ea);
        assert_relative_eq!(norm(pos), r, max_relative = 1e-13);
    }

    #[test]
    fn test_polar_orbit_ascending_node() {
        // i = 90°, Ω = 90°, ω = 0: periapsis on the ascending node, along +y.
        let pos = position_from_eccentric_anomaly(7000.0, 0.0, FRAC_PI_2, FRAC_PI_2, 0.0, 0.0);
        assert_relative_eq!(pos[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(pos[1], 7000.0, epsilon = 1e-9);
        assert_relative_eq!(pos[2], 0.0, epsilon = 1e-9);

        // A quarter orbit later the satellite is over the north pole.
        let pos =
            position_from_eccentric_anomaly(7000.0, 0.0, FRAC_PI_2, FRAC_PI_2, 0.0, FRAC_PI_2);
        assert_relative_eq!(pos[2], 7000.0, epsilon = 1e-9);
    }
}

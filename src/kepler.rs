//! Kepler's equation solver.
//!
//! Solves M = E - e sin(E) for the eccentric anomaly with Newton-Raphson,
//! starting from E₀ = M. Iteration stops once the Newton step is below
//! the tolerance or the iteration cap is hit; hitting the cap is reported
//! through [`KeplerSolution::converged`] and never fails.
//!
//! There is no divergence guard beyond the cap. Starting from E₀ = M,
//! eccentricities close to 1 can converge slowly or not at all within
//! the default 10 iterations.

use serde::{Deserialize, Serialize};

use crate::constants::{KEPLER_MAX_ITERATIONS, KEPLER_TOLERANCE};

/// Termination policy for the Newton iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeplerConfig {
    /// Stop once |ΔE| falls below this (rad).
    pub tolerance: f64,
    /// Maximum number of Newton steps.
    pub max_iterations: usize,
}

impl Default for KeplerConfig {
    fn default() -> Self {
        KeplerConfig {
            tolerance: KEPLER_TOLERANCE,
            max_iterations: KEPLER_MAX_ITERATIONS,
        }
    }
}

/// Outcome of one solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly (rad), same branch as the input mean anomaly.
    pub eccentric_anomaly: f64,
    /// Newton steps taken.
    pub iterations: usize,
    /// Whether the last step was below tolerance.
    pub converged: bool,
}

/// Non-fatal diagnostic: the solver stopped at its iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceWarning {
    /// Time offset of the affected sample (s).
    pub t: f64,
    pub mean_anomaly: f64,
    pub eccentricity: f64,
    pub iterations: usize,
    /// |E - e sin(E) - M| of the returned estimate.
    pub residual: f64,
}

impl std::fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Kepler solver hit {} iterations at t={:.3} s (M={:.6} rad, e={:.6}, residual={:.3e})",
            self.iterations, self.t, self.mean_anomaly, self.eccentricity, self.residual
        )
    }
}

impl KeplerConfig {
    /// Solve Kepler's equation for mean anomaly `m` (any real) and `e` in [0, 1).
    pub fn solve(&self, m: f64, e: f64) -> KeplerSolution {
        let mut ea = m;

        for k in 1..=self.max_iterations {
            let ea_new = ea - (ea - e * ea.sin() - m) / (1.0 - e * ea.cos());
            if (ea_new - ea).abs() < self.tolerance {
                return KeplerSolution {
                    eccentric_anomaly: ea_new,
                    iterations: k,
                    converged: true,
                };
            }
            ea = ea_new;
        }

        KeplerSolution {
            eccentric_anomaly: ea,
            iterations: self.max_iterations,
            converged: false,
        }
    }
}

/// Solve with the default tolerance and iteration cap.
pub fn eccentric_anomaly(m: f64, e: f64) -> f64 {
    KeplerConfig::default().solve(m, e).eccentric_anomaly
}

/// Residual of Kepler's equation at `ea`.
pub fn residual(ea: f64, m: f64, e: f64) -> f64 {
    (ea - e * ea.sin() - m).abs()
}

//! Two-body orbit propagation.
//!
//! For each time offset t the mean anomaly M = M0 + n·t is fed, unwrapped,
//! to the Kepler solver, and the resulting eccentric anomaly is mapped to
//! an inertial position. Samples never depend on each other, and neither
//! do spacecraft, so batch propagation fans out across threads with rayon
//! and collects results back in input order.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::elements::OrbitalElements;
use crate::frames::{norm, position_from_eccentric_anomaly};
use crate::kepler::{residual, ConvergenceWarning, KeplerConfig};

// ── Samples ──

/// Inertial position at a time offset from the element epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    /// Seconds since epoch
    pub t: f64,
    /// Position (km)
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl TrajectorySample {
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Distance from the central body (km).
    pub fn radius(&self) -> f64 {
        norm(self.position())
    }
}

/// Ordered samples for one spacecraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Catalog identifier of the spacecraft.
    pub name: String,
    pub samples: Vec<TrajectorySample>,
    /// Samples where the Kepler solver stopped at its iteration cap.
    pub warnings: Vec<ConvergenceWarning>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True when every sample met the solver tolerance.
    pub fn converged(&self) -> bool {
        self.warnings.is_empty()
    }
}

// ── Propagator ──

/// Propagator settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagatorConfig {
    pub kepler: KeplerConfig,
}

/// Keplerian (two-body) propagator.
#[derive(Debug, Clone, Default)]
pub struct TwoBodyPropagator {
    pub config: PropagatorConfig,
}

impl TwoBodyPropagator {
    pub fn new(config: PropagatorConfig) -> Self {
        TwoBodyPropagator { config }
    }

    pub fn with_kepler_config(mut self, kepler: KeplerConfig) -> Self {
        self.config.kepler = kepler;
        self
    }

    /// Position `t` seconds after the element epoch.
    pub fn position_at(&self, elements: &OrbitalElements, t: f64) -> TrajectorySample {
        self.sample(elements, t).0
    }

    /// Propagate one spacecraft over `offsets` (seconds from epoch).
    ///
    /// Returns one sample per offset, in the same order.
    pub fn propagate(&self, elements: &OrbitalElements, offsets: &[f64]) -> Trajectory {
        let mut samples = Vec::with_capacity(offsets.len());
        let mut warnings = Vec::new();

        for &t in offsets {
            let (sample, warning) = self.sample(elements, t);
            samples.push(sample);
            warnings.extend(warning);
        }

        if let Some(first) = warnings.first() {
            log::warn!(
                "{}: {} of {} samples did not converge; first: {}",
                elements.name(),
                warnings.len(),
                samples.len(),
                first
            );
        }

        Trajectory {
            name: elements.name().to_string(),
            samples,
            warnings,
        }
    }

    /// Propagate every spacecraft over a shared time array (parallel).
    pub fn propagate_fleet(&self, fleet: &[OrbitalElements], offsets: &[f64]) -> Vec<Trajectory> {
        log::debug!(
            "Propagating {} spacecraft over {} samples",
            fleet.len(),
            offsets.len()
        );
        fleet
            .par_iter()
            .map(|elements| self.propagate(elements, offsets))
            .collect()
    }

    /// Propagate each spacecraft over its own time array (parallel).
    pub fn propagate_each(&self, jobs: &[(OrbitalElements, Vec<f64>)]) -> Vec<Trajectory> {
        jobs.par_iter()
            .map(|(elements, offsets)| self.propagate(elements, offsets))
            .collect()
    }

    fn sample(
        &self,
        elements: &OrbitalElements,
        t: f64,
    ) -> (TrajectorySample, Option<ConvergenceWarning>) {
        let m = elements.mean_anomaly_at(t);
        let e = elements.e();
        let sol = self.config.kepler.solve(m, e);

        let [x, y, z] = position_from_eccentric_anomaly(
            elements.a(),
            e,
            elements.raan(),
            elements.i(),
            elements.omega(),
            sol.eccentric_anomaly,
        );

        let warning = (!sol.converged).then(|| ConvergenceWarning {
            t,
            mean_anomaly: m,
            eccentricity: e,
            iterations: sol.iterations,
            residual: residual(sol.eccentric_anomaly, m, e),
        });

        (TrajectorySample { t, x, y, z }, warning)
    }
}

// ── Time grids ──

/// `steps` evenly spaced offsets from 0 to `duration` inclusive.
pub fn time_span(duration: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let dt = duration / (steps - 1) as f64;
            (0..steps)
                .map(|k| if k == steps - 1 { duration } else { k as f64 * dt })
                .collect()
        }
    }
}

/// Time grid covering `orbits` periods of the slowest spacecraft.
pub fn fleet_time_span(fleet: &[OrbitalElements], orbits: f64, steps: usize) -> Vec<f64> {
    let max_period = fleet
        .iter()
        .map(OrbitalElements::period)
        .fold(0.0, f64::max);
    time_span(orbits * max_period, steps)
}

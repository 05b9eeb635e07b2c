//! Python bindings via PyO3.
use pyo3::prelude::*;

use crate::constants;
use crate::elements::OrbitalElements;
use crate::kepler::KeplerConfig;
use crate::propagator::{time_span, PropagatorConfig, TwoBodyPropagator};
use crate::tle::{load_tle_file, Tle};

// OrbitalElements
#[pyclass(name = "OrbitalElements")]
#[derive(Clone)]
pub struct PyOrbitalElements {
    pub(crate) inner: OrbitalElements,
}

#[pymethods]
impl PyOrbitalElements {
    /// Build elements from two TLE lines.
    #[staticmethod]
    #[pyo3(signature = (line1, line2, mu=constants::MU_EARTH))]
    fn from_tle(line1: &str, line2: &str, mu: f64) -> PyResult<Self> {
        Tle::parse(line1, line2)
            .map(|t| PyOrbitalElements { inner: OrbitalElements::from_tle_with_mu(&t, mu) })
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    /// Orbital period (seconds).
    fn period(&self) -> f64 { self.inner.period() }

    /// Epoch as an ISO 8601 UTC string.
    fn epoch_iso(&self) -> String { self.inner.epoch().to_rfc3339() }

    #[getter] fn name(&self) -> String { self.inner.name().to_string() }
    #[getter] fn a(&self) -> f64 { self.inner.a() }
    #[getter] fn e(&self) -> f64 { self.inner.e() }
    #[getter] fn i_deg(&self) -> f64 { self.inner.i() * constants::RAD2DEG }
    #[getter] fn raan_deg(&self) -> f64 { self.inner.raan() * constants::RAD2DEG }
    #[getter] fn omega_deg(&self) -> f64 { self.inner.omega() * constants::RAD2DEG }
    #[getter] fn m0_deg(&self) -> f64 { self.inner.m0() * constants::RAD2DEG }
    #[getter] fn n(&self) -> f64 { self.inner.n() }

    fn __repr__(&self) -> String {
        format!("{}", self.inner)
    }
}

// Propagator
#[pyclass(name = "Propagator")]
pub struct PyPropagator {
    inner: TwoBodyPropagator,
}

#[pymethods]
impl PyPropagator {
    /// Create a two-body propagator.
    ///
    /// Args:
    ///     tolerance: Kepler solver step tolerance in rad (default: 1e-8)
    ///     max_iterations: Kepler solver iteration cap (default: 10)
    #[new]
    #[pyo3(signature = (
        tolerance=constants::KEPLER_TOLERANCE,
        max_iterations=constants::KEPLER_MAX_ITERATIONS
    ))]
    fn new(tolerance: f64, max_iterations: usize) -> Self {
        let config = PropagatorConfig {
            kepler: KeplerConfig { tolerance, max_iterations },
        };
        PyPropagator { inner: TwoBodyPropagator::new(config) }
    }

    /// Propagate over time offsets (seconds from epoch).
    ///
    /// Returns (X, Y, Z) lists in km.
    fn propagate(
        &self,
        elements: &PyOrbitalElements,
        offsets: Vec<f64>,
    ) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let traj = self.inner.propagate(&elements.inner, &offsets);
        let x = traj.samples.iter().map(|s| s.x).collect();
        let y = traj.samples.iter().map(|s| s.y).collect();
        let z = traj.samples.iter().map(|s| s.z).collect();
        (x, y, z)
    }
}

// Free functions
#[pyfunction]
fn load_tle(path: &str) -> PyResult<Vec<PyOrbitalElements>> {
    load_tle_file(path)
        .map(|batch| {
            batch
                .to_elements()
                .into_iter()
                .map(|inner| PyOrbitalElements { inner })
                .collect()
        })
        .map_err(|e| pyo3::exceptions::PyIOError::new_err(e.to_string()))
}

#[pyfunction]
fn linspace(duration: f64, steps: usize) -> Vec<f64> {
    time_span(duration, steps)
}

// Module registration
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyOrbitalElements>()?;
    m.add_class::<PyPropagator>()?;
    m.add_function(wrap_pyfunction!(load_tle, m)?)?;
    m.add_function(wrap_pyfunction!(linspace, m)?)?;
    Ok(())
}

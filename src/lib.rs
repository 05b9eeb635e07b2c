//! # orbitsim
//!
//! Two-body satellite propagation from Two-Line Element sets.
//!
//! Parses NORAD TLE text, derives Keplerian elements, solves Kepler's
//! equation and rotates the result into an Earth-centred inertial frame.
//! Output is handed to a visualization sink as per-spacecraft X/Y/Z
//! series; rendering is left to the consumer.
//!
//! ```
//! use orbitsim::propagator::{time_span, TwoBodyPropagator};
//! use orbitsim::tle::Tle;
//!
//! let text = "\
//! 1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
//! 2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537
//! ";
//! let fleet = Tle::parse_batch(text).to_elements();
//! let offsets = time_span(fleet[0].period(), 100);
//! let trajectories = TwoBodyPropagator::default().propagate_fleet(&fleet, &offsets);
//! assert_eq!(trajectories[0].len(), 100);
//! ```

pub mod config;
pub mod constants;
pub mod elements;
pub mod frames;
pub mod kepler;
pub mod propagator;
pub mod sink;
pub mod tle;

#[cfg(feature = "python")]
mod pybridge;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn orbitsim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pybridge::register(m)?;
    Ok(())
}

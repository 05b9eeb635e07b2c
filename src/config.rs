//! Run configuration for the command-line front end.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::MU_EARTH;
use crate::propagator::PropagatorConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config value {field} = {value}: must be positive and finite")]
    NotPositive { field: &'static str, value: f64 },
}

/// Simulation settings. Missing JSON keys fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Gravitational parameter of the central body (km³/s²).
    pub mu: f64,
    /// Samples per trajectory.
    pub steps: usize,
    /// Time span, in periods of the slowest spacecraft.
    pub orbits: f64,
    pub propagator: PropagatorConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            mu: MU_EARTH,
            steps: 500,
            orbits: 2.0,
            propagator: PropagatorConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject settings that would turn every sample into NaN.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("mu", self.mu), ("orbits", self.orbits)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}

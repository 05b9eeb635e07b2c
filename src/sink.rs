//! Hand-off of trajectories to a visualization consumer.
//!
//! A [`Track`] is the column-oriented shape a plotting front end wants:
//! a label and equal-length X, Y, Z series (km) with their time offsets.
//! Rendering itself lives outside this crate.

use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::propagator::Trajectory;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Column-oriented trajectory for one spacecraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub label: String,
    pub t: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Track {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

impl From<&Trajectory> for Track {
    fn from(traj: &Trajectory) -> Self {
        let n = traj.samples.len();
        let mut track = Track {
            label: traj.name.clone(),
            t: Vec::with_capacity(n),
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
        };
        for s in &traj.samples {
            track.t.push(s.t);
            track.x.push(s.x);
            track.y.push(s.y);
            track.z.push(s.z);
        }
        track
    }
}

/// Consumer of propagated tracks.
pub trait TrajectorySink {
    fn accept(&mut self, track: &Track) -> Result<(), SinkError>;

    /// Called once after the last track.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// In-memory sink, mostly useful for front ends that render after the fact.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub tracks: Vec<Track>,
}

impl TrajectorySink for CollectSink {
    fn accept(&mut self, track: &Track) -> Result<(), SinkError> {
        self.tracks.push(track.clone());
        Ok(())
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    label: &'a str,
    t_s: f64,
    x_km: f64,
    y_km: f64,
    z_km: f64,
}

/// Writes one CSV row per sample: `label,t_s,x_km,y_km,z_km`.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        CsvSink {
            writer: csv::Writer::from_writer(inner),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> TrajectorySink for CsvSink<W> {
    fn accept(&mut self, track: &Track) -> Result<(), SinkError> {
        for k in 0..track.len() {
            self.writer.serialize(CsvRow {
                label: &track.label,
                t_s: track.t[k],
                x_km: track.x[k],
                y_km: track.y[k],
                z_km: track.z[k],
            })?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Feed every trajectory to `sink`, in order, then finish it.
pub fn emit<S: TrajectorySink + ?Sized>(
    sink: &mut S,
    trajectories: &[Trajectory],
) -> Result<(), SinkError> {
    for traj in trajectories {
        sink.accept(&Track::from(traj))?;
    }
    sink.finish()
}

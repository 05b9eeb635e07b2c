//! Two-Line Element (TLE) set parser.
//!
//! Parses the fixed-column NORAD TLE format and scans arbitrary text for
//! line pairs. Only the fields needed for two-body propagation are kept;
//! drag terms and mean motion derivatives are ignored.
//!
//! # TLE Format Reference
//! ```text
//! Line 1: 1 NNNNNC NNNNNAAA NNNNN.NNNNNNNN +.NNNNNNNN +NNNNN-N +NNNNN-N N NNNNN
//! Line 2: 2 NNNNN NNN.NNNN NNN.NNNN NNNNNNN NNN.NNNN NNN.NNNN NN.NNNNNNNNNNNNNN
//! ```
//!
//! # Example
//! ```
//! use orbitsim::tle::Tle;
//!
//! let line1 = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
//! let line2 = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";
//!
//! let tle = Tle::parse(line1, line2).unwrap();
//! assert_eq!(tle.norad_id, 25544);
//! assert_eq!(tle.epoch_year_2d, 8);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::elements::OrbitalElements;

/// TLE parsing and loading errors.
///
/// Everything except [`TleError::Io`] is a format error on a single pair.
#[derive(Error, Debug)]
pub enum TleError {
    #[error("Line 1 must start with '1', got {0:?}")]
    InvalidLine1Start(Option<char>),

    #[error("Line 2 must start with '2', got {0:?}")]
    InvalidLine2Start(Option<char>),

    #[error("Line 1 length must be 69 characters, got {0}")]
    InvalidLine1Length(usize),

    #[error("Line 2 length must be 69 characters, got {0}")]
    InvalidLine2Length(usize),

    #[error("Line {0} contains non-ASCII characters")]
    NonAscii(u8),

    #[error("Catalog numbers don't match between lines: {0} vs {1}")]
    CatalogMismatch(u32, u32),

    #[error("Failed to parse field '{field}': {source}")]
    ParseField {
        field: &'static str,
        source: std::num::ParseFloatError,
    },

    #[error("Failed to parse integer field '{field}': {source}")]
    ParseIntField {
        field: &'static str,
        source: std::num::ParseIntError,
    },

    #[error("Field '{0}' is not a finite number")]
    NonFinite(&'static str),

    #[error("Failed to parse implied-decimal field '{0}'")]
    ImpliedDecimal(String),

    #[error("Mean motion must be positive, got {0} rev/day")]
    NonPositiveMeanMotion(f64),

    #[error("Epoch day of year out of range: {0}")]
    EpochDayOutOfRange(f64),

    #[error("TLE pair at line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<TleError>,
    },

    #[error("Failed to read TLE file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Raw orbital parameters of one TLE pair, in TLE units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tle {
    /// Catalog number as written in columns 3-7 of line 2.
    pub catalog: String,
    /// NORAD catalog number.
    pub norad_id: u32,
    /// Epoch year, last two digits as written. See [`crate::elements::full_year`].
    pub epoch_year_2d: u16,
    /// Epoch day of year (fractional, 1.0 = Jan 1 00:00).
    pub epoch_day: f64,
    /// Inclination (degrees).
    pub inclination_deg: f64,
    /// Right ascension of ascending node (degrees).
    pub raan_deg: f64,
    /// Eccentricity (dimensionless).
    pub eccentricity: f64,
    /// Argument of perigee (degrees).
    pub arg_perigee_deg: f64,
    /// Mean anomaly (degrees).
    pub mean_anomaly_deg: f64,
    /// Mean motion (revolutions per day).
    pub mean_motion_rev_day: f64,
    /// Both line checksums matched.
    pub checksum_ok: bool,
}

impl Tle {
    /// Parse a TLE from its two lines.
    ///
    /// Whitespace around each line is ignored; what remains must be
    /// exactly 69 columns.
    pub fn parse(line1: &str, line2: &str) -> Result<Self, TleError> {
        let l1 = line1.trim();
        let l2 = line2.trim();

        if !l1.starts_with('1') {
            return Err(TleError::InvalidLine1Start(l1.chars().next()));
        }
        if !l2.starts_with('2') {
            return Err(TleError::InvalidLine2Start(l2.chars().next()));
        }
        if !l1.is_ascii() {
            return Err(TleError::NonAscii(1));
        }
        if !l2.is_ascii() {
            return Err(TleError::NonAscii(2));
        }
        if l1.len() != TLE_LINE_LEN {
            return Err(TleError::InvalidLine1Length(l1.len()));
        }
        if l2.len() != TLE_LINE_LEN {
            return Err(TleError::InvalidLine2Length(l2.len()));
        }

        let checksum_ok = checksum_matches(l1) && checksum_matches(l2);

        // ── Line 1 ──
        let norad_id_1 = parse_u32(&l1[2..7], "catalog number (line 1)")?;

        let epoch_year_2d = l1[18..20]
            .trim()
            .parse::<u16>()
            .map_err(|source| TleError::ParseIntField {
                field: "epoch_year",
                source,
            })?;

        let epoch_day = parse_f64(&l1[20..32], "epoch_day")?;
        if !(1.0..367.0).contains(&epoch_day) {
            return Err(TleError::EpochDayOutOfRange(epoch_day));
        }

        // ── Line 2 ──
        let catalog = l2[2..7].trim().to_string();
        let norad_id_2 = parse_u32(&l2[2..7], "catalog number (line 2)")?;
        if norad_id_1 != norad_id_2 {
            return Err(TleError::CatalogMismatch(norad_id_1, norad_id_2));
        }

        let inclination_deg = parse_f64(&l2[8..16], "inclination")?;
        let raan_deg = parse_f64(&l2[17..25], "raan")?;

        // Eccentricity has implied leading decimal point
        let ecc_digits = l2[26..33].trim();
        if ecc_digits.is_empty() || !ecc_digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TleError::ImpliedDecimal(ecc_digits.to_string()));
        }
        let eccentricity = parse_f64(&format!("0.{ecc_digits}"), "eccentricity")?;

        let arg_perigee_deg = parse_f64(&l2[34..42], "arg_perigee")?;
        let mean_anomaly_deg = parse_f64(&l2[43..51], "mean_anomaly")?;

        let mean_motion_rev_day = parse_f64(&l2[52..63], "mean_motion")?;
        if mean_motion_rev_day <= 0.0 {
            return Err(TleError::NonPositiveMeanMotion(mean_motion_rev_day));
        }

        Ok(Tle {
            catalog,
            norad_id: norad_id_1,
            epoch_year_2d,
            epoch_day,
            inclination_deg,
            raan_deg,
            eccentricity,
            arg_perigee_deg,
            mean_anomaly_deg,
            mean_motion_rev_day,
            checksum_ok,
        })
    }

    /// Scan text for TLE pairs.
    ///
    /// Lines are trimmed on both sides first, so indented records still
    /// pair up. A line starting with '1' directly followed by a line
    /// starting with '2' is a candidate pair. Any other line is skipped on its own.
    /// Candidate pairs that fail to parse are logged and collected in
    /// [`TleBatch::rejected`]; scanning always continues.
    pub fn parse_batch(input: &str) -> TleBatch {
        let lines: Vec<&str> = input.lines().map(str::trim).collect();
        let mut batch = TleBatch::default();
        let mut i = 0;

        while i < lines.len() {
            if lines[i].starts_with('1') && i + 1 < lines.len() && lines[i + 1].starts_with('2') {
                match Tle::parse(lines[i], lines[i + 1]) {
                    Ok(tle) => {
                        if !tle.checksum_ok {
                            log::warn!(
                                "Checksum mismatch in TLE for catalog {} at line {}",
                                tle.catalog,
                                i + 1
                            );
                        }
                        batch.tles.push(tle);
                    }
                    Err(error) => {
                        log::warn!("Skipping TLE pair at line {}: {}", i + 1, error);
                        batch.rejected.push(RejectedPair { line: i + 1, error });
                    }
                }
                i += 2;
            } else {
                if !lines[i].is_empty() {
                    batch.skipped_lines += 1;
                }
                i += 1;
            }
        }

        batch
    }

    /// Convert to orbital elements about Earth.
    pub fn to_elements(&self) -> OrbitalElements {
        OrbitalElements::from_tle(self)
    }
}

/// A candidate pair that failed to parse.
#[derive(Debug)]
pub struct RejectedPair {
    /// 1-based line number of the pair's first line.
    pub line: usize,
    pub error: TleError,
}

/// Result of scanning a TLE text.
#[derive(Debug, Default)]
pub struct TleBatch {
    /// Successfully parsed pairs, in input order.
    pub tles: Vec<Tle>,
    /// Candidate pairs that were skipped.
    pub rejected: Vec<RejectedPair>,
    /// Non-blank lines that were not part of any candidate pair.
    pub skipped_lines: usize,
}

impl TleBatch {
    pub fn len(&self) -> usize {
        self.tles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tles.is_empty()
    }

    /// Fail on the first rejected pair instead of skipping it.
    pub fn into_strict(self) -> Result<Vec<Tle>, TleError> {
        match self.rejected.into_iter().next() {
            Some(RejectedPair { line, error }) => Err(TleError::AtLine {
                line,
                source: Box::new(error),
            }),
            None => Ok(self.tles),
        }
    }

    /// Convert every parsed pair to orbital elements about Earth.
    pub fn to_elements(&self) -> Vec<OrbitalElements> {
        self.tles.iter().map(OrbitalElements::from_tle).collect()
    }
}

/// Read a TLE file once and scan it with [`Tle::parse_batch`].
pub fn load_tle_file(path: impl AsRef<Path>) -> Result<TleBatch, TleError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| TleError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let batch = Tle::parse_batch(&text);
    log::info!(
        "Loaded {} TLEs from {:?} ({} pairs rejected, {} lines skipped)",
        batch.len(),
        path,
        batch.rejected.len(),
        batch.skipped_lines
    );
    Ok(batch)
}

fn parse_f64(s: &str, field: &'static str) -> Result<f64, TleError> {
    let value = s
        .trim()
        .parse::<f64>()
        .map_err(|source| TleError::ParseField { field, source })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TleError::NonFinite(field))
    }
}

fn parse_u32(s: &str, field: &'static str) -> Result<u32, TleError> {
    s.trim()
        .parse::<u32>()
        .map_err(|source| TleError::ParseIntField { field, source })
}

fn checksum_matches(line: &str) -> bool {
    match line.as_bytes()[68] {
        b @ b'0'..=b'9' => b - b'0' == compute_checksum(&line[..68]),
        _ => false,
    }
}

/// Compute TLE checksum (mod-10 of sum of digits, '-' counts as 1).
fn compute_checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .map(|b| match b {
            b'0'..=b'9' => (b - b'0') as u32,
            b'-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}

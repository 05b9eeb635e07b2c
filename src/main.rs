use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use orbitsim::config::SimConfig;
use orbitsim::constants::{RAD2DEG, R_EARTH};
use orbitsim::elements::OrbitalElements;
use orbitsim::propagator::{fleet_time_span, TwoBodyPropagator};
use orbitsim::sink::{emit, CsvSink};
use orbitsim::tle::load_tle_file;

/// Propagate every satellite in a TLE file with two-body dynamics.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// TLE file (pairs of lines 1 and 2; other lines are skipped)
    tle_file: PathBuf,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Samples per trajectory
    #[arg(long)]
    steps: Option<usize>,
    /// Time span in periods of the slowest satellite
    #[arg(long)]
    orbits: Option<f64>,
    /// CSV output path (stdout if omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Abort on the first malformed TLE pair instead of skipping it
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(steps) = cli.steps {
        config.steps = steps;
    }
    if let Some(orbits) = cli.orbits {
        config.orbits = orbits;
    }
    config.validate()?;

    let batch = load_tle_file(&cli.tle_file)?;
    let tles = if cli.strict {
        batch.into_strict()?
    } else {
        batch.tles
    };
    if tles.is_empty() {
        bail!("no valid TLE pairs in {:?}", cli.tle_file);
    }

    let fleet: Vec<OrbitalElements> = tles
        .iter()
        .map(|tle| OrbitalElements::from_tle_with_mu(tle, config.mu))
        .collect();

    print_summary(&fleet);

    let offsets = fleet_time_span(&fleet, config.orbits, config.steps);
    let propagator = TwoBodyPropagator::new(config.propagator);
    let trajectories = propagator.propagate_fleet(&fleet, &offsets);

    let unconverged: usize = trajectories.iter().map(|t| t.warnings.len()).sum();
    if unconverged > 0 {
        log::warn!("{unconverged} samples used an unconverged Kepler estimate");
    }

    let out: Box<dyn Write> = match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };
    let mut sink = CsvSink::new(out);
    emit(&mut sink, &trajectories).context("Failed to write trajectories")?;

    log::info!(
        "Wrote {} trajectories of {} samples",
        trajectories.len(),
        offsets.len()
    );
    Ok(())
}

fn print_summary(fleet: &[OrbitalElements]) {
    eprintln!("Loaded {} satellites", fleet.len());
    eprintln!("{}", "-".repeat(60));
    for (k, sat) in fleet.iter().enumerate() {
        let epoch = sat.epoch().format("%Y-%m-%d %H:%M:%S%.3f UTC");
        eprintln!("{}. {} (epoch {})", k + 1, sat.name(), epoch);
        eprintln!("   Semi-major axis: {:.1} km", sat.a());
        eprintln!("   Eccentricity: {:.6}", sat.e());
        eprintln!("   Inclination: {:.2}°", sat.i() * RAD2DEG);
        eprintln!("   Perigee altitude: {:.1} km", sat.perigee_radius() - R_EARTH);
        eprintln!("   Period: {:.2} hours", sat.period() / 3600.0);
    }
}

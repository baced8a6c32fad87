//! Sweep the reference Earth orbit (apogee 46 071 km, perigee 6 971 km).
//!
//! ```text
//! cargo run --example orbit_sweep > sweep.csv
//! cargo run --example orbit_sweep --features progress > sweep.csv
//! ```
//!
//! Reports go to stderr, the CSV to stdout.
use std::io;

use kepsolve::anomaly_solver::{compare_methods, SolverConfig};
use kepsolve::constants::{EARTH_MASS, EARTH_MEAN_RADIUS_KM};
use kepsolve::time_series::export::{write_convergence_csv, write_kinematics_csv};
use kepsolve::time_series::{run_time_series_with, SweepParams};
use kepsolve::{derive_orbital_elements, KepsolveError, SolverMethod};

fn main() -> Result<(), KepsolveError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(io::stderr)
        .init();

    // Same orbit given as altitudes above the mean Earth surface
    let elements = derive_orbital_elements(
        46_071.0 - EARTH_MEAN_RADIUS_KM,
        6_971.0 - EARTH_MEAN_RADIUS_KM,
        EARTH_MEAN_RADIUS_KM,
        EARTH_MASS,
    )?;
    eprintln!("{elements}");

    // All four strategies on the epoch one hour after periapsis
    let mean_anomaly = elements.mean_anomaly_at(3_600.0);
    let config = SolverConfig::builder()
        .tolerance(1e-12)
        .max_iterations(5_000)
        .build()?;

    eprintln!("M = {mean_anomaly:.6} rad, e = {:.6}", elements.eccentricity());
    let report = compare_methods(mean_anomaly, elements.eccentricity(), &config)?;
    let mut solutions = Vec::with_capacity(report.len());
    for entry in report {
        match entry.outcome {
            Ok(solution) => {
                eprintln!(
                    "  {:<15} E = {:.12}  iterations = {:>3}  |E - E_ref| = {:.1e}",
                    entry.method.to_string(),
                    solution.eccentric_anomaly,
                    solution.iterations(),
                    entry.deviation.unwrap_or(f64::NAN),
                );
                solutions.push(solution);
            }
            Err(err) => eprintln!("  {:<15} failed: {err}", entry.method.to_string()),
        }
    }
    write_convergence_csv(io::stderr(), &solutions)?;

    // One-minute grid over a full period
    let params = SweepParams::builder()
        .method(SolverMethod::Newton)
        .tolerance(1e-10)
        .time_step(60.0)
        .build()?;
    eprintln!("{params:#}");

    let series = run_time_series_with(&elements, &params)?;
    eprintln!(
        "{} samples, {} solver iterations",
        series.len(),
        series.total_iterations()
    );
    eprintln!("{}", series.extrema());

    write_kinematics_csv(io::stdout().lock(), &series)
}

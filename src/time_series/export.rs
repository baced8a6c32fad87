//! Flat row views of a sweep and CSV writers.
//!
//! Three row layouts are available, each serialized with a header line:
//!
//! | Row                | Columns                          |
//! |--------------------|----------------------------------|
//! | [`KinematicsRow`]  | `time, radius, Vr, Vt, V`        |
//! | [`AnomalyRow`]     | `time, M, E, v`                  |
//! | [`ConvergenceRow`] | `method, iteration, residual`    |
//!
//! The writers accept any [`std::io::Write`] sink (file, stdout, `Vec<u8>`).
use serde::Serialize;
use std::io;

use super::{Sample, TimeSeries};
use crate::{anomaly_solver::{Solution, SolverMethod}, kepsolve_errors::KepsolveError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KinematicsRow {
    pub time: f64,
    pub radius: f64,
    #[serde(rename = "Vr")]
    pub radial_velocity: f64,
    #[serde(rename = "Vt")]
    pub tangential_velocity: f64,
    #[serde(rename = "V")]
    pub speed: f64,
}

impl From<&Sample> for KinematicsRow {
    fn from(s: &Sample) -> Self {
        KinematicsRow {
            time: s.time,
            radius: s.state.radius,
            radial_velocity: s.state.radial_velocity,
            tangential_velocity: s.state.tangential_velocity,
            speed: s.state.speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyRow {
    pub time: f64,
    #[serde(rename = "M")]
    pub mean_anomaly: f64,
    #[serde(rename = "E")]
    pub eccentric_anomaly: f64,
    #[serde(rename = "v")]
    pub true_anomaly: f64,
}

impl From<&Sample> for AnomalyRow {
    fn from(s: &Sample) -> Self {
        AnomalyRow {
            time: s.time,
            mean_anomaly: s.anomalies.mean_anomaly,
            eccentric_anomaly: s.anomalies.eccentric_anomaly,
            true_anomaly: s.anomalies.true_anomaly,
        }
    }
}

/// One residual of a convergence trace; `iteration` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergenceRow {
    pub method: SolverMethod,
    pub iteration: usize,
    pub residual: f64,
}

impl TimeSeries {
    pub fn kinematics_rows(&self) -> impl Iterator<Item = KinematicsRow> + '_ {
        self.samples.iter().map(KinematicsRow::from)
    }

    pub fn anomaly_rows(&self) -> impl Iterator<Item = AnomalyRow> + '_ {
        self.samples.iter().map(AnomalyRow::from)
    }
}

/// Rows of the convergence trace of `solution`.
pub fn convergence_rows(solution: &Solution) -> impl Iterator<Item = ConvergenceRow> + '_ {
    solution
        .trace
        .iter()
        .enumerate()
        .map(move |(i, &residual)| ConvergenceRow {
            method: solution.method,
            iteration: i + 1,
            residual,
        })
}

fn write_rows<W, R, I>(writer: W, rows: I) -> Result<(), KepsolveError>
where
    W: io::Write,
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `time, radius, Vr, Vt, V` for every sample.
pub fn write_kinematics_csv<W: io::Write>(writer: W, series: &TimeSeries) -> Result<(), KepsolveError> {
    write_rows(writer, series.kinematics_rows())
}

/// Write `time, M, E, v` for every sample.
pub fn write_anomalies_csv<W: io::Write>(writer: W, series: &TimeSeries) -> Result<(), KepsolveError> {
    write_rows(writer, series.anomaly_rows())
}

/// Write the traces of several solutions one after the other.
pub fn write_convergence_csv<'a, W, I>(writer: W, solutions: I) -> Result<(), KepsolveError>
where
    W: io::Write,
    I: IntoIterator<Item = &'a Solution>,
{
    write_rows(writer, solutions.into_iter().flat_map(convergence_rows))
}

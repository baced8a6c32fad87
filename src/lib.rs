//! Kepler's equation solvers and single-period orbit sweeps for elliptical two-body orbits.
//!
//! Entry points:
//!
//! * [`solve_kepler_equation`] – eccentric anomaly with one of four strategies.
//! * [`derive_orbital_elements`] – elements from apsides and central-body mass.
//! * [`compute_state_vector`] – radius and velocity components at an eccentric anomaly.
//! * [`run_time_series`] – one period of samples with extrema.
pub mod anomaly_solver;
pub mod constants;
pub mod kepler;
pub mod kepsolve_errors;
pub mod orbital_elements;
pub mod state_vector;
pub mod time_series;

pub use anomaly_solver::{compare_methods, solve_kepler_equation, SolverConfig, SolverMethod};
pub use kepsolve_errors::KepsolveError;
pub use orbital_elements::{derive_orbital_elements, OrbitalElements};
pub use state_vector::{compute_state_vector, StateVector, TrueAnomalyRange};
pub use time_series::{run_time_series, run_time_series_with, SweepParams, TimeSeries};

#[cfg(feature = "parallel")]
pub use time_series::run_time_series_par;

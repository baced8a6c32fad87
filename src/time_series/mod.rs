//! # Orbit sweep over one period
//!
//! The time-series driver samples an elliptical orbit at epochs `t ∈ [0, T]`
//! (time since periapsis passage) and, for each epoch:
//!
//! 1. computes the mean anomaly `M = n·t`,
//! 2. solves Kepler's equation for `E` with the configured strategy,
//! 3. derives the true anomaly `v` in the configured [`TrueAnomalyRange`],
//! 4. evaluates the [`StateVector`] `(r, Vr, Vt, V)`.
//!
//! Once every sample is available, the extrema of `r`, `Vr`, `Vt` and `V` are
//! located ([`SeriesExtrema`]). The resulting [`TimeSeries`] is read-only.
//!
//! ## Sampling
//!
//! * [`Sampling::Count`] – `n` epochs linearly spaced over the closed interval `[0, T]`
//!   (`n = 1` gives the single epoch `t = 0`).
//! * [`Sampling::Step`] – epochs `0, dt, 2dt, …` strictly below `T`.
//!
//! ## Failure policy
//!
//! The first sample whose solve fails aborts the sweep and its error is returned;
//! no partial series is ever produced.
//!
//! ## Cargo features
//!
//! * `progress` – live `indicatif` progress bar during sequential sweeps.
//! * `parallel` – [`run_time_series_par`], which evaluates samples on the `rayon`
//!   thread pool and returns the same series as the sequential sweep.
//!
//! ## Example
//!
//! ```rust
//! use kepsolve::anomaly_solver::SolverMethod;
//! use kepsolve::orbital_elements::derive_orbital_elements;
//! use kepsolve::time_series::run_time_series;
//! use kepsolve::constants::EARTH_MASS;
//!
//! let elements = derive_orbital_elements(46_071.0, 6_971.0, 0.0, EARTH_MASS).unwrap();
//! let series = run_time_series(&elements, SolverMethod::Newton, 1e-10, 181).unwrap();
//!
//! assert_eq!(series.len(), 181);
//! let extrema = series.extrema();
//! assert!((extrema.radius.min.value - 6_971.0).abs() < 1e-6);
//! ```
use itertools::{Itertools, MinMaxResult};
use std::fmt;

use crate::{
    anomaly_solver::{solve_kepler_equation, SolverConfig, SolverMethod},
    constants::{Radian, Second, DEFAULT_SAMPLE_COUNT},
    kepsolve_errors::KepsolveError,
    orbital_elements::OrbitalElements,
    state_vector::{AnomalyTriple, StateVector, TrueAnomalyRange},
};

pub mod export;

#[cfg(feature = "progress")]
pub(crate) mod progress_bar;

/// How sweep epochs are laid out over one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampling {
    /// Number of epochs over `[0, T]`, both ends included.
    Count(usize),
    /// Fixed time step (s); epochs `k·dt < T`.
    Step(Second),
}

impl Default for Sampling {
    fn default() -> Self {
        Sampling::Count(DEFAULT_SAMPLE_COUNT)
    }
}

impl Sampling {
    pub fn validate(&self) -> Result<(), KepsolveError> {
        match *self {
            Sampling::Count(0) => Err(KepsolveError::InvalidParameter(
                "sample count must be >= 1".into(),
            )),
            Sampling::Step(dt) if !(dt.is_finite() && dt > 0.0) => Err(
                KepsolveError::InvalidParameter(format!("time step must be finite and > 0, got {dt}")),
            ),
            _ => Ok(()),
        }
    }

    /// Epochs of the sweep for an orbit of period `period`.
    ///
    /// Errors
    /// -----------------
    /// * [`KepsolveError::InvalidParameter`] for a zero count or a non-positive step.
    pub fn epochs(&self, period: Second) -> Result<Vec<Second>, KepsolveError> {
        self.validate()?;
        let epochs = match *self {
            Sampling::Count(1) => vec![0.0],
            Sampling::Count(n) => {
                let last = (n - 1) as f64;
                (0..n).map(|i| period * (i as f64 / last)).collect()
            }
            Sampling::Step(dt) => (0..)
                .map(|k| k as f64 * dt)
                .take_while(|&t| t < period)
                .collect(),
        };
        Ok(epochs)
    }
}

impl fmt::Display for Sampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sampling::Count(n) => write!(f, "{n} samples over [0, T]"),
            Sampling::Step(dt) => write!(f, "every {dt} s over [0, T)"),
        }
    }
}

/// Configuration of a sweep.
///
/// `solver.bracket` and `solver.initial_guess`, when set, apply unchanged to every
/// sample; leave them unset to let each sample use its own `[M - 1, M + 1]` / `M`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepParams {
    pub solver: SolverConfig,
    pub anomaly_range: TrueAnomalyRange,
    pub sampling: Sampling,
}

impl SweepParams {
    pub fn builder() -> SweepParamsBuilder {
        SweepParamsBuilder::new()
    }

    pub fn validate(&self) -> Result<(), KepsolveError> {
        self.solver.validate()?;
        self.sampling.validate()
    }
}

/// Builder for [`SweepParams`].
#[derive(Debug, Clone, Default)]
pub struct SweepParamsBuilder {
    params: SweepParams,
}

impl SweepParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn solver(mut self, v: SolverConfig) -> Self {
        self.params.solver = v;
        self
    }
    pub fn method(mut self, v: SolverMethod) -> Self {
        self.params.solver.method = v;
        self
    }
    pub fn tolerance(mut self, v: f64) -> Self {
        self.params.solver.tolerance = v;
        self
    }
    pub fn max_iterations(mut self, v: usize) -> Self {
        self.params.solver.max_iterations = v;
        self
    }
    pub fn anomaly_range(mut self, v: TrueAnomalyRange) -> Self {
        self.params.anomaly_range = v;
        self
    }
    pub fn sample_count(mut self, v: usize) -> Self {
        self.params.sampling = Sampling::Count(v);
        self
    }
    pub fn time_step(mut self, v: Second) -> Self {
        self.params.sampling = Sampling::Step(v);
        self
    }

    /// Finalize the builder.
    ///
    /// Errors
    /// -----------------
    /// * [`KepsolveError::InvalidParameter`] for an invalid solver configuration,
    ///   a zero sample count or a non-positive time step.
    pub fn build(self) -> Result<SweepParams, KepsolveError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl fmt::Display for SweepParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Orbit Sweep Parameters")?;
            writeln!(f, "----------------------")?;
            writeln!(f, "  sampling        = {}", self.sampling)?;
            writeln!(f, "  true anomaly    = {}", self.anomaly_range)?;
            write!(f, "{:#}", self.solver)
        } else {
            write!(
                f,
                "SweepParams({}, v in {}, {})",
                self.sampling, self.anomaly_range, self.solver
            )
        }
    }
}

/// One epoch of the sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub index: usize,
    /// Time since periapsis passage (s).
    pub time: Second,
    pub anomalies: AnomalyTriple,
    pub state: StateVector,
    /// Iterations spent by the solver on this sample.
    pub iterations: usize,
}

/// Extreme value of one quantity and where it occurs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    pub value: f64,
    pub index: usize,
    pub time: Second,
}

/// Minimum and maximum of one quantity.
///
/// On ties the minimum is the earliest sample and the maximum the latest one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: Extremum,
    pub max: Extremum,
}

impl MinMax {
    fn over<F>(samples: &[Sample], key: F) -> Option<Self>
    where
        F: Fn(&Sample) -> f64,
    {
        let at = |s: &Sample| Extremum {
            value: key(s),
            index: s.index,
            time: s.time,
        };

        match samples.iter().minmax_by(|a, b| key(a).total_cmp(&key(b))) {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(s) => Some(MinMax { min: at(s), max: at(s) }),
            MinMaxResult::MinMax(lo, hi) => Some(MinMax { min: at(lo), max: at(hi) }),
        }
    }
}

/// Extrema of the kinematic quantities over a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesExtrema {
    pub radius: MinMax,
    pub radial_velocity: MinMax,
    pub tangential_velocity: MinMax,
    pub speed: MinMax,
}

impl SeriesExtrema {
    /// `None` for an empty slice.
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        Some(SeriesExtrema {
            radius: MinMax::over(samples, |s| s.state.radius)?,
            radial_velocity: MinMax::over(samples, |s| s.state.radial_velocity)?,
            tangential_velocity: MinMax::over(samples, |s| s.state.tangential_velocity)?,
            speed: MinMax::over(samples, |s| s.state.speed)?,
        })
    }
}

impl fmt::Display for SeriesExtrema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<22} {:>14} {:>12} {:>14} {:>12}",
            "quantity", "min", "t_min [s]", "max", "t_max [s]"
        )?;
        for (name, range) in [
            ("r [km]", &self.radius),
            ("Vr [km/s]", &self.radial_velocity),
            ("Vt [km/s]", &self.tangential_velocity),
            ("V [km/s]", &self.speed),
        ] {
            writeln!(
                f,
                "{:<22} {:>14.6} {:>12.1} {:>14.6} {:>12.1}",
                name, range.min.value, range.min.time, range.max.value, range.max.time
            )?;
        }
        Ok(())
    }
}

/// Samples of one sweep, in epoch order, with their extrema.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    elements: OrbitalElements,
    params: SweepParams,
    samples: Vec<Sample>,
    extrema: SeriesExtrema,
}

impl TimeSeries {
    fn new(elements: OrbitalElements, params: SweepParams, samples: Vec<Sample>) -> Result<Self, KepsolveError> {
        let extrema = SeriesExtrema::from_samples(&samples)
            .ok_or_else(|| KepsolveError::InvalidParameter("sweep produced no sample".into()))?;
        Ok(TimeSeries {
            elements,
            params,
            samples,
            extrema,
        })
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    pub fn params(&self) -> &SweepParams {
        &self.params
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn extrema(&self) -> &SeriesExtrema {
        &self.extrema
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Solver iterations summed over all samples.
    pub fn total_iterations(&self) -> usize {
        self.samples.iter().map(|s| s.iterations).sum()
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

fn sample_at(
    index: usize,
    time: Second,
    elements: &OrbitalElements,
    params: &SweepParams,
) -> Result<Sample, KepsolveError> {
    let eccentricity = elements.eccentricity();
    let mean_anomaly: Radian = elements.mean_anomaly_at(time);

    let solution = solve_kepler_equation(mean_anomaly, eccentricity, &params.solver).inspect_err(|err| {
        tracing::warn!(index, time, mean_anomaly, "sample aborted the sweep: {err}");
    })?;

    let anomalies = AnomalyTriple::new(
        mean_anomaly,
        solution.eccentric_anomaly,
        eccentricity,
        params.anomaly_range,
    );

    Ok(Sample {
        index,
        time,
        anomalies,
        state: StateVector::from_true_anomaly(anomalies.true_anomaly, elements),
        iterations: solution.iterations(),
    })
}

#[cfg(not(feature = "progress"))]
fn sweep(epochs: &[Second], elements: &OrbitalElements, params: &SweepParams) -> Result<Vec<Sample>, KepsolveError> {
    epochs
        .iter()
        .enumerate()
        .map(|(index, &time)| sample_at(index, time, elements, params))
        .collect()
}

#[cfg(feature = "progress")]
fn sweep(epochs: &[Second], elements: &OrbitalElements, params: &SweepParams) -> Result<Vec<Sample>, KepsolveError> {
    use progress_bar::{sweep_progress_bar, IterTimer};

    let pb = sweep_progress_bar(epochs.len());
    let mut timer = IterTimer::new(0.2);
    let mut samples = Vec::with_capacity(epochs.len());

    for (index, &time) in epochs.iter().enumerate() {
        pb.set_message(timer.message());
        match sample_at(index, time, elements, params) {
            Ok(sample) => samples.push(sample),
            Err(err) => {
                pb.abandon_with_message("sweep aborted");
                return Err(err);
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(samples)
}

/// Sweep one period with `sample_count` epochs over `[0, T]`.
///
/// Arguments
/// -----------------
/// * `elements`: the orbit.
/// * `method`: solver strategy used at every sample.
/// * `tolerance`: solver tolerance (the iteration budget is the default one).
/// * `sample_count`: number of epochs, `>= 1`.
///
/// Return
/// ----------
/// * A [`TimeSeries`] with true anomalies in `[0, 2π)`.
///
/// See also
/// ------------
/// * [`run_time_series_with`] – full control over solver, sampling and anomaly range.
pub fn run_time_series(
    elements: &OrbitalElements,
    method: SolverMethod,
    tolerance: f64,
    sample_count: usize,
) -> Result<TimeSeries, KepsolveError> {
    let params = SweepParams::builder()
        .method(method)
        .tolerance(tolerance)
        .sample_count(sample_count)
        .build()?;
    run_time_series_with(elements, &params)
}

/// Sweep one period with explicit [`SweepParams`].
///
/// Errors
/// -----------------
/// * [`KepsolveError::InvalidParameter`] for invalid parameters.
/// * The error of the first sample whose solve fails.
pub fn run_time_series_with(elements: &OrbitalElements, params: &SweepParams) -> Result<TimeSeries, KepsolveError> {
    params.validate()?;
    let epochs = params.sampling.epochs(elements.period())?;

    tracing::debug!(
        samples = epochs.len(),
        method = %params.solver.method,
        eccentricity = elements.eccentricity(),
        "starting orbit sweep"
    );

    let samples = sweep(&epochs, elements, params)?;
    let series = TimeSeries::new(*elements, params.clone(), samples)?;

    tracing::debug!(
        samples = series.len(),
        total_iterations = series.total_iterations(),
        "orbit sweep done"
    );
    Ok(series)
}

/// Parallel counterpart of [`run_time_series_with`].
///
/// Samples are evaluated on the `rayon` thread pool and reassembled by index; the
/// result is identical to the sequential sweep, and on failure the error of the
/// earliest failing sample is returned.
#[cfg(feature = "parallel")]
pub fn run_time_series_par(elements: &OrbitalElements, params: &SweepParams) -> Result<TimeSeries, KepsolveError> {
    use rayon::prelude::*;

    params.validate()?;
    let epochs = params.sampling.epochs(elements.period())?;

    tracing::debug!(
        samples = epochs.len(),
        method = %params.solver.method,
        threads = rayon::current_num_threads(),
        "starting parallel orbit sweep"
    );

    let outcomes: Vec<Result<Sample, KepsolveError>> = epochs
        .par_iter()
        .enumerate()
        .map(|(index, &time)| sample_at(index, time, elements, params))
        .collect();

    let samples = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;
    TimeSeries::new(*elements, params.clone(), samples)
}

#[cfg(test)]
mod time_series_test {
    use super::*;
    use crate::constants::EARTH_MASS;
    use crate::orbital_elements::derive_orbital_elements;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;

    fn reference_orbit() -> OrbitalElements {
        derive_orbital_elements(46_071.0, 6_971.0, 0.0, EARTH_MASS).unwrap()
    }

    #[test]
    fn test_count_epochs() {
        let epochs = Sampling::Count(5).epochs(100.0).unwrap();
        assert_eq!(epochs, vec![0.0, 25.0, 50.0, 75.0, 100.0]);

        assert_eq!(Sampling::Count(1).epochs(100.0).unwrap(), vec![0.0]);
        assert!(Sampling::Count(0).epochs(100.0).is_err());
    }

    #[test]
    fn test_step_epochs() {
        let epochs = Sampling::Step(30.0).epochs(100.0).unwrap();
        assert_eq!(epochs, vec![0.0, 30.0, 60.0, 90.0]);

        // T itself is excluded
        assert_eq!(Sampling::Step(25.0).epochs(100.0).unwrap().len(), 4);
        assert!(Sampling::Step(0.0).epochs(100.0).is_err());
        assert!(Sampling::Step(f64::NAN).epochs(100.0).is_err());
    }

    #[test]
    fn test_sweep_params_builder() {
        let params = SweepParams::builder()
            .method(SolverMethod::GoldenSection)
            .tolerance(1e-9)
            .time_step(60.0)
            .anomaly_range(TrueAnomalyRange::Signed)
            .build()
            .unwrap();

        assert_eq!(params.solver.method, SolverMethod::GoldenSection);
        assert_eq!(params.sampling, Sampling::Step(60.0));
        assert!(format!("{params:#}").contains("sampling        = every 60 s over [0, T)"));

        assert!(SweepParams::builder().sample_count(0).build().is_err());
        assert!(SweepParams::builder().tolerance(-1.0).build().is_err());
    }

    #[test]
    fn test_sweep_reference_orbit() {
        let elements = reference_orbit();
        let series = run_time_series(&elements, SolverMethod::Newton, 1e-12, 361).unwrap();

        assert_eq!(series.len(), 361);
        let first = &series.samples()[0];
        let last = &series.samples()[360];
        assert_eq!(first.time, 0.0);
        assert_eq!(last.time, elements.period());

        // periapsis at both ends, apoapsis at half period
        assert_relative_eq!(first.state.radius, 6_971.0, max_relative = 1e-10);
        assert_relative_eq!(last.state.radius, 6_971.0, max_relative = 1e-10);
        let half = &series.samples()[180];
        assert_abs_diff_eq!(half.anomalies.mean_anomaly, PI, epsilon = 1e-12);
        assert_relative_eq!(half.state.radius, 46_071.0, max_relative = 1e-10);

        for sample in &series {
            let v = sample.anomalies.true_anomaly;
            assert!((0.0..2.0 * PI).contains(&v));
            assert_eq!(sample.index, (sample.time / elements.period() * 360.0).round() as usize);
        }
    }

    #[test]
    fn test_extrema() {
        let elements = reference_orbit();
        let series = run_time_series(&elements, SolverMethod::Newton, 1e-12, 361).unwrap();
        let extrema = series.extrema();

        assert_eq!(extrema.radius.min.index, 0);
        assert_eq!(extrema.radius.max.index, 180);
        assert_relative_eq!(extrema.radius.max.value, 46_071.0, max_relative = 1e-10);

        // fastest at periapsis: the last equal sample wins a tie on the maximum
        assert!(extrema.speed.max.index == 0 || extrema.speed.max.index == 360);
        assert_eq!(extrema.speed.min.index, 180);
        assert_eq!(extrema.tangential_velocity.min.index, 180);

        // Vr > 0 going out, < 0 coming back
        assert!(extrema.radial_velocity.max.index < 180);
        assert!(extrema.radial_velocity.min.index > 180);
        assert_relative_eq!(
            extrema.radial_velocity.max.value,
            -extrema.radial_velocity.min.value,
            max_relative = 1e-3
        );

        assert!(extrema.to_string().contains("Vt [km/s]"));
    }

    #[test]
    fn test_circular_sweep() {
        let elements = derive_orbital_elements(7_000.0, 7_000.0, 0.0, EARTH_MASS).unwrap();
        let params = SweepParams::builder()
            .method(SolverMethod::Bisection)
            .time_step(60.0)
            .build()
            .unwrap();
        let series = run_time_series_with(&elements, &params).unwrap();

        assert_eq!(series.len(), 98);
        for sample in &series {
            assert_eq!(sample.anomalies.eccentric_anomaly, sample.anomalies.mean_anomaly);
            assert_eq!(sample.state.radius, 7_000.0);
            assert_eq!(sample.state.radial_velocity, 0.0);
            assert_eq!(sample.iterations, 1);
        }
    }

    #[test]
    fn test_signed_range() {
        let elements = reference_orbit();
        let params = SweepParams::builder()
            .sample_count(9)
            .anomaly_range(TrueAnomalyRange::Signed)
            .build()
            .unwrap();
        let series = run_time_series_with(&elements, &params).unwrap();

        for sample in series.iter().skip(5).take(3) {
            assert!(sample.anomalies.true_anomaly < 0.0);
        }
    }

    #[test]
    fn test_failing_sample_aborts() {
        let elements = reference_orbit();
        let params = SweepParams::builder()
            .method(SolverMethod::FixedPoint)
            .tolerance(1e-12)
            .max_iterations(5)
            .sample_count(10)
            .build()
            .unwrap();

        let err = run_time_series_with(&elements, &params).unwrap_err();
        assert_eq!(err.kind(), "DivergenceError");
    }

    #[test]
    fn test_fixed_point_sweep_high_eccentricity() {
        for e in [0.9, 0.95] {
            let elements = OrbitalElements::new(e, 20_000.0, 398_600.0).unwrap();
            let series = run_time_series(&elements, SolverMethod::FixedPoint, 1e-6, 50).unwrap();

            assert_eq!(series.len(), 50);
            let newton = run_time_series(&elements, SolverMethod::Newton, 1e-12, 50).unwrap();
            for (a, b) in series.iter().zip(newton.iter()) {
                assert_abs_diff_eq!(
                    a.anomalies.eccentric_anomaly,
                    b.anomalies.eccentric_anomaly,
                    epsilon = 1e-4
                );
            }
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let elements = reference_orbit();
        let params = SweepParams::builder()
            .method(SolverMethod::GoldenSection)
            .sample_count(500)
            .build()
            .unwrap();

        let sequential = run_time_series_with(&elements, &params).unwrap();
        let parallel = run_time_series_par(&elements, &params).unwrap();
        assert_eq!(sequential, parallel);
    }
}

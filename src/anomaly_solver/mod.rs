//! # Eccentric anomaly solvers
//!
//! This module solves **Kepler's equation** `E - e·sin(E) = M` for the eccentric
//! anomaly `E` of an elliptical orbit (`0 ≤ e < 1`), with four interchangeable
//! strategies sharing one contract ([`KeplerSolver`]):
//!
//! | Strategy                                   | Start / bracket          | Stopping rule             |
//! |--------------------------------------------|--------------------------|---------------------------|
//! | [`Newton`](newton::Newton)                 | `E₀ = M` (or guess)      | `|ΔE| < tol`              |
//! | [`FixedPoint`](fixed_point::FixedPoint)    | `E₀ = M` (or guess)      | `|E_new - E_old| < tol`   |
//! | [`Bisection`](bisection::Bisection)        | `[M - 1, M + 1]` default | bracket width `< tol`     |
//! | [`GoldenSection`](golden_section::GoldenSection) | `[M - 1, M + 1]` default | bracket width `< tol` |
//!
//! Every strategy records the absolute residual `|f(E)|` at its current best estimate
//! once per iteration in a [`ConvergenceTrace`] (the interval midpoint for the bracketing
//! methods), so that convergence rates can be compared on a log scale.
//!
//! ## Failure modes
//!
//! * [`KepsolveError::Bracket`] – the bracket of a bracketing method is degenerate
//!   (`a >= b`), non-finite, or `f(a)·f(b) > 0`.
//! * [`KepsolveError::Divergence`] – the iteration budget is exhausted.
//! * [`KepsolveError::InvalidParameter`] – `e ∉ [0, 1)`, non-finite `M`, or an invalid
//!   [`SolverConfig`].
//!
//! No strategy retries or returns a partial result.
//!
//! ## Circular orbits
//!
//! For `e = 0` Kepler's equation is the identity: every strategy returns `E = M`
//! exactly (after validating its inputs) with the one-entry trace `[0.0]`.
//!
//! ## Example
//!
//! ```rust
//! use kepsolve::anomaly_solver::{solve_kepler_equation, SolverConfig, SolverMethod};
//!
//! let config = SolverConfig::builder()
//!     .method(SolverMethod::Newton)
//!     .tolerance(1e-6)
//!     .build()
//!     .unwrap();
//!
//! let solution = solve_kepler_equation(1.0, 0.5, &config).unwrap();
//! assert!((solution.eccentric_anomaly - 1.4987).abs() < 1e-4);
//! assert!(solution.iterations() <= 5);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{
    constants::{Radian, DEFAULT_BRACKET_HALF_WIDTH, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE},
    kepler::{kepler_derivative, kepler_residual, principal_angle, reference_eccentric_anomaly},
    kepsolve_errors::KepsolveError,
};

pub mod bisection;
pub mod fixed_point;
pub mod golden_section;
pub mod newton;

use bisection::Bisection;
use fixed_point::FixedPoint;
use golden_section::GoldenSection;
use newton::Newton;

/// Selector over the four root-finding strategies.
///
/// Serialized in camelCase (`"newton"`, `"bisection"`, `"goldenSection"`, `"fixedPoint"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolverMethod {
    Newton,
    Bisection,
    GoldenSection,
    FixedPoint,
}

impl SolverMethod {
    /// All strategies, in the order used by comparison reports.
    pub const ALL: [SolverMethod; 4] = [
        SolverMethod::Newton,
        SolverMethod::Bisection,
        SolverMethod::GoldenSection,
        SolverMethod::FixedPoint,
    ];

    /// `true` for the strategies that need a sign-changing bracket.
    pub fn is_bracketing(&self) -> bool {
        matches!(self, SolverMethod::Bisection | SolverMethod::GoldenSection)
    }
}

impl fmt::Display for SolverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverMethod::Newton => "newton",
            SolverMethod::Bisection => "bisection",
            SolverMethod::GoldenSection => "golden-section",
            SolverMethod::FixedPoint => "fixed-point",
        };
        f.write_str(name)
    }
}

impl FromStr for SolverMethod {
    type Err = KepsolveError;

    /// Accepts both the display names (`golden-section`) and the serialized
    /// names (`goldenSection`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "newton" => Ok(SolverMethod::Newton),
            "bisection" => Ok(SolverMethod::Bisection),
            "goldensection" | "golden" => Ok(SolverMethod::GoldenSection),
            "fixedpoint" | "iteration" => Ok(SolverMethod::FixedPoint),
            _ => Err(KepsolveError::InvalidParameter(format!(
                "unknown solver method '{s}'"
            ))),
        }
    }
}

/// Ordered residual magnitudes `|f(E_k)|`, one per solver iteration.
///
/// The first entry belongs to the earliest iteration. Traces are diagnostics only and
/// never feed back into a computation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvergenceTrace(Vec<f64>);

impl ConvergenceTrace {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    #[inline]
    pub(crate) fn push(&mut self, residual: f64) {
        self.0.push(residual.abs());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    /// Residual recorded at the last iteration.
    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    /// `true` if the last `n` entries never increase.
    pub fn is_non_increasing_tail(&self, n: usize) -> bool {
        let start = self.0.len().saturating_sub(n);
        self.0[start..].windows(2).all(|w| w[1] <= w[0])
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ConvergenceTrace {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of a successful solve: the eccentric anomaly and how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub eccentric_anomaly: Radian,
    pub trace: ConvergenceTrace,
    pub method: SolverMethod,
}

impl Solution {
    pub(crate) fn new(eccentric_anomaly: Radian, trace: ConvergenceTrace, method: SolverMethod) -> Self {
        Self {
            eccentric_anomaly,
            trace,
            method,
        }
    }

    /// Number of iterations performed (length of the trace).
    pub fn iterations(&self) -> usize {
        self.trace.len()
    }
}

/// One instance of Kepler's equation, `E - e·sin(E) = M`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerProblem {
    pub mean_anomaly: Radian,
    pub eccentricity: f64,
}

impl KeplerProblem {
    /// Validate `M` (finite) and `e ∈ [0, 1)`.
    pub fn new(mean_anomaly: Radian, eccentricity: f64) -> Result<Self, KepsolveError> {
        if !mean_anomaly.is_finite() {
            return Err(KepsolveError::InvalidParameter(format!(
                "mean anomaly must be finite, got {mean_anomaly}"
            )));
        }
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(KepsolveError::InvalidParameter(format!(
                "eccentricity must lie in [0, 1), got {eccentricity}"
            )));
        }
        Ok(Self {
            mean_anomaly,
            eccentricity,
        })
    }

    #[inline]
    pub fn residual(&self, eccentric_anomaly: Radian) -> f64 {
        kepler_residual(eccentric_anomaly, self.eccentricity, self.mean_anomaly)
    }

    #[inline]
    pub fn derivative(&self, eccentric_anomaly: Radian) -> f64 {
        kepler_derivative(eccentric_anomaly, self.eccentricity)
    }

    /// `[M - 1, M + 1]`, which always brackets the root when `e < 1`.
    pub fn default_bracket(&self) -> (Radian, Radian) {
        (
            self.mean_anomaly - DEFAULT_BRACKET_HALF_WIDTH,
            self.mean_anomaly + DEFAULT_BRACKET_HALF_WIDTH,
        )
    }

    /// Resolve and check the bracket of a bracketing strategy.
    ///
    /// Return
    /// ----------
    /// * The requested bracket (or the default one) if `a < b` and `f(a)·f(b) ≤ 0`.
    /// * [`KepsolveError::Bracket`] otherwise.
    pub fn bracket(&self, requested: Option<(Radian, Radian)>) -> Result<(Radian, Radian), KepsolveError> {
        let (lower, upper) = requested.unwrap_or_else(|| self.default_bracket());
        let f_lower = self.residual(lower);
        let f_upper = self.residual(upper);

        let ordered = lower.is_finite() && upper.is_finite() && lower < upper;
        if !ordered || f_lower * f_upper > 0.0 {
            return Err(KepsolveError::Bracket {
                lower,
                upper,
                f_lower,
                f_upper,
            });
        }
        Ok((lower, upper))
    }

    /// Exact root at one of the bracket ends, if any.
    pub(crate) fn endpoint_root(&self, lower: Radian, upper: Radian) -> Option<Radian> {
        if self.residual(lower) == 0.0 {
            Some(lower)
        } else if self.residual(upper) == 0.0 {
            Some(upper)
        } else {
            None
        }
    }

    /// Problem with `M` reduced into `[0, 2π)`, and the whole turns `M - M_red` to add
    /// back to the reduced root.
    ///
    /// Far from the origin `M ± 1` rounds back to `M` and the default bracket collapses,
    /// so the solvers work on the reduced anomaly. An explicit bracket or initial guess is
    /// expressed in the caller's coordinates: the problem is then left untouched.
    pub fn reduced(&self, config: &SolverConfig) -> (KeplerProblem, Radian) {
        if config.bracket.is_some() || config.initial_guess.is_some() {
            return (*self, 0.0);
        }
        let mean_anomaly = principal_angle(self.mean_anomaly);
        let turns = self.mean_anomaly - mean_anomaly;
        (
            KeplerProblem {
                mean_anomaly,
                eccentricity: self.eccentricity,
            },
            turns,
        )
    }

    pub fn is_circular(&self) -> bool {
        self.eccentricity == 0.0
    }

    pub(crate) fn diverged(&self, method: SolverMethod, iterations: usize, last_estimate: Radian) -> KepsolveError {
        KepsolveError::Divergence {
            method,
            iterations,
            last_estimate,
            last_residual: self.residual(last_estimate).abs(),
        }
    }
}

/// Configuration of a single Kepler solve.
///
/// Fields
/// -----------------
/// * `method` – strategy to run.
/// * `tolerance` – stopping threshold (step size or bracket width, see module docs).
/// * `max_iterations` – iteration budget; exhausting it is a [`KepsolveError::Divergence`].
/// * `bracket` – initial interval for the bracketing strategies (default `[M - 1, M + 1]`).
/// * `initial_guess` – starting point for Newton and fixed-point (default `M`).
///
/// Defaults
/// -----------------
/// * `method`: Newton
/// * `tolerance`: 1e-10
/// * `max_iterations`: 1000
/// * `bracket`, `initial_guess`: `None`
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub method: SolverMethod,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub bracket: Option<(Radian, Radian)>,
    pub initial_guess: Option<Radian>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            method: SolverMethod::Newton,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            bracket: None,
            initial_guess: None,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder::new()
    }

    /// Same configuration with another strategy.
    pub fn with_method(&self, method: SolverMethod) -> Self {
        SolverConfig {
            method,
            ..self.clone()
        }
    }

    /// Check the numeric fields.
    ///
    /// The bracket ordering and sign change are checked per problem at solve time,
    /// since they depend on `M` and `e`.
    pub fn validate(&self) -> Result<(), KepsolveError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(KepsolveError::InvalidParameter(format!(
                "tolerance must be finite and > 0, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(KepsolveError::InvalidParameter(
                "max_iterations must be >= 1".into(),
            ));
        }
        if let Some(guess) = self.initial_guess {
            if !guess.is_finite() {
                return Err(KepsolveError::InvalidParameter(format!(
                    "initial_guess must be finite, got {guess}"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`SolverConfig`], with validation.
#[derive(Debug, Clone, Default)]
pub struct SolverConfigBuilder {
    config: SolverConfig,
}

impl SolverConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    pub fn method(mut self, v: SolverMethod) -> Self {
        self.config.method = v;
        self
    }
    pub fn tolerance(mut self, v: f64) -> Self {
        self.config.tolerance = v;
        self
    }
    pub fn max_iterations(mut self, v: usize) -> Self {
        self.config.max_iterations = v;
        self
    }
    pub fn bracket(mut self, lower: Radian, upper: Radian) -> Self {
        self.config.bracket = Some((lower, upper));
        self
    }
    pub fn initial_guess(mut self, v: Radian) -> Self {
        self.config.initial_guess = Some(v);
        self
    }

    /// Finalize the builder.
    ///
    /// Errors
    /// -----------------
    /// * [`KepsolveError::InvalidParameter`] if `tolerance ≤ 0`, `max_iterations = 0`
    ///   or `initial_guess` is not finite.
    pub fn build(self) -> Result<SolverConfig, KepsolveError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl fmt::Display for SolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Kepler Solver Configuration")?;
            writeln!(f, "---------------------------")?;
            writeln!(f, "  method          = {}", self.method)?;
            writeln!(f, "  tolerance       = {:.1e}", self.tolerance)?;
            writeln!(f, "  max_iterations  = {}", self.max_iterations)?;
            match self.bracket {
                Some((a, b)) => writeln!(f, "  bracket         = [{a:.6}, {b:.6}]")?,
                None => writeln!(f, "  bracket         = [M - 1, M + 1]")?,
            }
            match self.initial_guess {
                Some(g) => writeln!(f, "  initial_guess   = {g:.6}"),
                None => writeln!(f, "  initial_guess   = M"),
            }
        } else {
            write!(
                f,
                "SolverConfig(method={}, tol={:.1e}, max_it={})",
                self.method, self.tolerance, self.max_iterations
            )
        }
    }
}

/// Shared contract of the anomaly solvers.
///
/// Implementors provide [`KeplerSolver::iterate`]; callers use the provided
/// [`KeplerSolver::solve`], which validates the inputs, checks the bracket of the
/// bracketing strategies and handles the circular case before iterating.
pub trait KeplerSolver {
    /// Strategy implemented by this solver.
    fn method(&self) -> SolverMethod;

    /// Run the iteration on a validated problem.
    fn iterate(&self, problem: &KeplerProblem, config: &SolverConfig) -> Result<Solution, KepsolveError>;

    /// Solve `E - e·sin(E) = M`.
    fn solve(
        &self,
        mean_anomaly: Radian,
        eccentricity: f64,
        config: &SolverConfig,
    ) -> Result<Solution, KepsolveError> {
        config.validate()?;
        let (problem, turns) = KeplerProblem::new(mean_anomaly, eccentricity)?.reduced(config);
        let method = self.method();

        if method.is_bracketing() {
            problem.bracket(config.bracket)?;
        }

        if problem.is_circular() {
            let mut trace = ConvergenceTrace::with_capacity(1);
            trace.push(0.0);
            return Ok(Solution::new(mean_anomaly, trace, method));
        }

        self.iterate(&problem, config)
            .map(|solution| Solution {
                eccentric_anomaly: solution.eccentric_anomaly + turns,
                ..solution
            })
            .map_err(|err| match err {
                KepsolveError::Divergence {
                    method,
                    iterations,
                    last_estimate,
                    last_residual,
                } => KepsolveError::Divergence {
                    method,
                    iterations,
                    last_estimate: last_estimate + turns,
                    last_residual,
                },
                other => other,
            })
            .inspect_err(|err| {
                tracing::debug!(
                    %method,
                    mean_anomaly,
                    eccentricity,
                    "Kepler solve failed: {err}"
                );
            })
    }
}

impl KeplerSolver for SolverMethod {
    fn method(&self) -> SolverMethod {
        *self
    }

    fn iterate(&self, problem: &KeplerProblem, config: &SolverConfig) -> Result<Solution, KepsolveError> {
        match self {
            SolverMethod::Newton => Newton.iterate(problem, config),
            SolverMethod::Bisection => Bisection.iterate(problem, config),
            SolverMethod::GoldenSection => GoldenSection.iterate(problem, config),
            SolverMethod::FixedPoint => FixedPoint.iterate(problem, config),
        }
    }
}

/// Solve Kepler's equation with the strategy selected in `config`.
///
/// Arguments
/// -----------------
/// * `mean_anomaly`: mean anomaly `M` (radians).
/// * `eccentricity`: eccentricity `e ∈ [0, 1)`.
/// * `config`: strategy, tolerance, iteration budget and optional bracket / initial guess.
///
/// Return
/// ----------
/// * A [`Solution`] holding `E` and its [`ConvergenceTrace`].
///
/// See also
/// ------------
/// * [`compare_methods`] – run every strategy on the same instance.
pub fn solve_kepler_equation(
    mean_anomaly: Radian,
    eccentricity: f64,
    config: &SolverConfig,
) -> Result<Solution, KepsolveError> {
    config.method.solve(mean_anomaly, eccentricity, config)
}

/// Outcome of one strategy in a [`compare_methods`] report.
#[derive(Debug)]
pub struct MethodComparison {
    pub method: SolverMethod,
    pub outcome: Result<Solution, KepsolveError>,
    /// `|E_method - E_reference|` when the strategy succeeded.
    pub deviation: Option<f64>,
}

/// Run the four strategies on one `(M, e)` instance.
///
/// Each strategy reuses `config` with its own method; failures are reported per
/// method rather than aborting the comparison. Deviations are measured against
/// [`reference_eccentric_anomaly`] (Brent's method, independent of the strategies).
///
/// Errors
/// -----------------
/// * [`KepsolveError::InvalidParameter`] for invalid `M`, `e` or `config`.
/// * [`KepsolveError::RootFindingError`] if the reference solve fails.
pub fn compare_methods(
    mean_anomaly: Radian,
    eccentricity: f64,
    config: &SolverConfig,
) -> Result<Vec<MethodComparison>, KepsolveError> {
    config.validate()?;
    let (reduced, turns) = KeplerProblem::new(mean_anomaly, eccentricity)?.reduced(&SolverConfig::default());
    let reference = reference_eccentric_anomaly(reduced.mean_anomaly, eccentricity, 1e-13)? + turns;

    let report = SolverMethod::ALL
        .iter()
        .map(|&method| {
            let outcome = method.solve(mean_anomaly, eccentricity, &config.with_method(method));
            let deviation = outcome
                .as_ref()
                .ok()
                .map(|s| (s.eccentric_anomaly - reference).abs());

            tracing::trace!(%method, ?deviation, "method comparison");

            MethodComparison {
                method,
                outcome,
                deviation,
            }
        })
        .collect();

    Ok(report)
}

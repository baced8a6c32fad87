//! Newton–Raphson iteration on Kepler's equation.
//!
//! Starting from `E₀ = M` (or the configured initial guess), each step applies
//!
//! ```text
//! E ← E - (E - e·sin E - M) / (1 - e·cos E)
//! ```
//!
//! and the iteration stops once `|ΔE| < tol`. Convergence is quadratic near the root.
//!
//! Plain Newton from `E₀ = M` can bounce far away from the root when `e` approaches 1
//! (the derivative `1 - e·cos E` becomes tiny near periapsis). Every step is therefore
//! kept inside a bracket that starts as `[M - 1, M + 1]` and is tightened with the sign
//! of each residual; a step landing outside it is replaced by the bracket midpoint.
use super::{ConvergenceTrace, KeplerProblem, KeplerSolver, Solution, SolverConfig, SolverMethod};
use crate::kepsolve_errors::KepsolveError;

/// Safeguarded Newton–Raphson strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Newton;

impl KeplerSolver for Newton {
    fn method(&self) -> SolverMethod {
        SolverMethod::Newton
    }

    fn iterate(&self, problem: &KeplerProblem, config: &SolverConfig) -> Result<Solution, KepsolveError> {
        let (mut lower, mut upper) = problem.default_bracket();
        let mut e_anom = config.initial_guess.unwrap_or(problem.mean_anomaly);
        let mut trace = ConvergenceTrace::with_capacity(config.max_iterations.min(32));

        for _ in 0..config.max_iterations {
            let residual = problem.residual(e_anom);
            if residual == 0.0 {
                trace.push(0.0);
                return Ok(Solution::new(e_anom, trace, SolverMethod::Newton));
            }

            // f is increasing: the root lies above E when f(E) < 0
            if residual < 0.0 {
                lower = lower.max(e_anom);
            } else {
                upper = upper.min(e_anom);
            }

            let mut next = e_anom - residual / problem.derivative(e_anom);
            if !(lower..=upper).contains(&next) {
                next = 0.5 * (lower + upper);
            }

            let step = next - e_anom;
            e_anom = next;
            trace.push(problem.residual(e_anom));

            if step.abs() < config.tolerance {
                return Ok(Solution::new(e_anom, trace, SolverMethod::Newton));
            }
        }

        Err(problem.diverged(SolverMethod::Newton, trace.len(), e_anom))
    }
}

#[cfg(test)]
mod newton_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn config(tolerance: f64) -> SolverConfig {
        SolverConfig::builder()
            .method(SolverMethod::Newton)
            .tolerance(tolerance)
            .build()
            .unwrap()
    }

    #[test]
    fn test_reference_case() {
        let solution = Newton.solve(1.0, 0.5, &config(1e-6)).unwrap();

        assert_abs_diff_eq!(solution.eccentric_anomaly, 1.4987, epsilon = 1e-4);
        assert_abs_diff_eq!(
            solution.eccentric_anomaly,
            1.498_701_133_517_9,
            epsilon = 1e-10
        );
        assert!(solution.iterations() <= 5);
        assert_eq!(solution.method, SolverMethod::Newton);
    }

    #[test]
    fn test_quadratic_tail() {
        let solution = Newton.solve(1.0, 0.5, &config(1e-12)).unwrap();
        let trace = solution.trace.as_slice();

        assert!(solution.trace.is_non_increasing_tail(trace.len()));
        // each residual is at most the square of the previous one, up to a constant
        for w in trace.windows(2).filter(|w| w[1] > 0.0) {
            assert!(w[1] <= w[0] * w[0] * 10.0 || w[1] < 1e-15);
        }
    }

    #[test]
    fn test_high_eccentricity_does_not_oscillate() {
        // plain Newton from E0 = M wanders off for this instance
        let solution = Newton.solve(0.1658062789394613, 0.99, &config(1e-12)).unwrap();
        let problem = KeplerProblem::new(0.1658062789394613, 0.99).unwrap();
        assert_abs_diff_eq!(problem.residual(solution.eccentric_anomaly), 0.0, epsilon = 1e-12);
        assert!(solution.iterations() < 60);
    }

    #[test]
    fn test_initial_guess() {
        let cfg = SolverConfig::builder()
            .initial_guess(3.0)
            .tolerance(1e-12)
            .build()
            .unwrap();
        let solution = Newton.solve(1.0, 0.5, &cfg).unwrap();
        assert_abs_diff_eq!(solution.eccentric_anomaly, 1.498_701_133_517_9, epsilon = 1e-10);
    }

    #[test]
    fn test_budget_exhausted() {
        let cfg = SolverConfig::builder()
            .tolerance(1e-12)
            .max_iterations(1)
            .build()
            .unwrap();
        let err = Newton.solve(1.0, 0.5, &cfg).unwrap_err();
        assert_eq!(
            err,
            KepsolveError::Divergence {
                method: SolverMethod::Newton,
                iterations: 1,
                last_estimate: 0.0,
                last_residual: 0.0,
            }
        );
    }
}

//! Bisection on a sign-changing bracket.
//!
//! Each iteration evaluates the midpoint, records its residual and keeps the half in
//! which `f` changes sign. The solve stops when the bracket is narrower than the
//! tolerance (or the midpoint is an exact root), so the returned midpoint is within
//! `tol / 2` of the root. Convergence is linear and guaranteed once the bracket is valid.
use super::{ConvergenceTrace, KeplerProblem, KeplerSolver, Solution, SolverConfig, SolverMethod};
use crate::kepsolve_errors::KepsolveError;

/// Interval-halving strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bisection;

impl KeplerSolver for Bisection {
    fn method(&self) -> SolverMethod {
        SolverMethod::Bisection
    }

    fn iterate(&self, problem: &KeplerProblem, config: &SolverConfig) -> Result<Solution, KepsolveError> {
        let (mut lower, mut upper) = problem.bracket(config.bracket)?;
        let mut trace = ConvergenceTrace::with_capacity(config.max_iterations.min(64));

        if let Some(root) = problem.endpoint_root(lower, upper) {
            trace.push(0.0);
            return Ok(Solution::new(root, trace, SolverMethod::Bisection));
        }

        let mut f_lower = problem.residual(lower);

        for _ in 0..config.max_iterations {
            let mid = 0.5 * (lower + upper);
            let f_mid = problem.residual(mid);
            trace.push(f_mid);

            if f_mid == 0.0 || upper - lower < config.tolerance {
                return Ok(Solution::new(mid, trace, SolverMethod::Bisection));
            }

            if f_lower.signum() != f_mid.signum() {
                upper = mid;
            } else {
                lower = mid;
                f_lower = f_mid;
            }
        }

        Err(problem.diverged(
            SolverMethod::Bisection,
            trace.len(),
            0.5 * (lower + upper),
        ))
    }
}

#[cfg(test)]
mod bisection_test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_custom_bracket() {
        let config = SolverConfig::builder()
            .method(SolverMethod::Bisection)
            .tolerance(1e-12)
            .bracket(0.0, PI)
            .build()
            .unwrap();
        let solution = Bisection.solve(1.0, 0.5, &config).unwrap();

        assert_abs_diff_eq!(
            solution.eccentric_anomaly,
            1.498_701_133_517_9,
            epsilon = 1e-11
        );
        // width π halves below 1e-12 after 42 halvings
        assert_eq!(solution.iterations(), 43);
    }

    #[test]
    fn test_residuals_bounded_by_bracket() {
        let (m, e) = (1.0, 0.5);
        let config = SolverConfig::builder().tolerance(1e-12).build().unwrap();
        let solution = Bisection.solve(m, e, &config).unwrap();

        // |f(mid_k)| <= (1 + e)·|mid_k - E| <= (1 + e)·w / 2^(k+1)
        let width = 2.0;
        for (k, residual) in solution.trace.iter().enumerate() {
            let bound = (1.0 + e) * width / 2f64.powi(k as i32 + 1);
            assert!(*residual <= bound + 1e-15, "iteration {k}: {residual} > {bound}");
        }
        assert!(solution.trace.last().unwrap() < solution.trace.as_slice()[0]);
    }

    #[test]
    fn test_invalid_bracket() {
        let config = SolverConfig::builder()
            .method(SolverMethod::Bisection)
            .bracket(2.0, 3.0)
            .build()
            .unwrap();
        let err = Bisection.solve(1.0, 0.5, &config).unwrap_err();
        assert_eq!(err.kind(), "BracketError");
    }

    #[test]
    fn test_root_on_bracket_end() {
        // M = 0 has the root E = 0
        let config = SolverConfig::builder()
            .method(SolverMethod::Bisection)
            .bracket(0.0, 1.0)
            .build()
            .unwrap();
        let solution = Bisection.solve(0.0, 0.4, &config).unwrap();
        assert_eq!(solution.eccentric_anomaly, 0.0);
        assert_eq!(solution.iterations(), 1);
    }
}

//! Successive substitution `E ← M + e·sin(E)`.
//!
//! The map is a contraction of rate about `e`, so the number of iterations grows as
//! the orbit becomes more eccentric. The loop is bounded by `max_iterations`.
use super::{ConvergenceTrace, KeplerProblem, KeplerSolver, Solution, SolverConfig, SolverMethod};
use crate::kepsolve_errors::KepsolveError;

/// Fixed-point (successive approximation) strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPoint;

impl KeplerSolver for FixedPoint {
    fn method(&self) -> SolverMethod {
        SolverMethod::FixedPoint
    }

    fn iterate(&self, problem: &KeplerProblem, config: &SolverConfig) -> Result<Solution, KepsolveError> {
        let mut e_anom = config.initial_guess.unwrap_or(problem.mean_anomaly);
        let mut trace = ConvergenceTrace::with_capacity(config.max_iterations.min(256));

        for _ in 0..config.max_iterations {
            let next = problem.mean_anomaly + problem.eccentricity * e_anom.sin();
            let step = next - e_anom;
            e_anom = next;
            trace.push(problem.residual(e_anom));

            if step.abs() < config.tolerance {
                return Ok(Solution::new(e_anom, trace, SolverMethod::FixedPoint));
            }
        }

        Err(problem.diverged(SolverMethod::FixedPoint, trace.len(), e_anom))
    }
}

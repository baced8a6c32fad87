//! Golden-section search on `|f|` inside a sign-changing bracket.
//!
//! Two interior points split the bracket `[a, b]` in the golden ratio,
//!
//! ```text
//! x₁ = b - ρ·(b - a),   x₂ = a + ρ·(b - a),   ρ = (√5 - 1) / 2
//! ```
//!
//! and one outer part is discarded at each step, so the bracket shrinks by `ρ`:
//!
//! * `f(x₁)` and `f(x₂)` straddle zero: the root lies in `[x₁, x₂]`; drop the side whose
//!   interior residual is larger (`[x₂, b]` if `|f(x₁)| < |f(x₂)|`, else `[a, x₁]`).
//! * they share a sign: the root lies in an outer part; keep `[a, x₂]` when `f(a)` and
//!   `f(x₁)` differ in sign, `[x₁, b]` otherwise.
//!
//! The solve stops when the bracket is narrower than the tolerance and returns its midpoint.
use super::{ConvergenceTrace, KeplerProblem, KeplerSolver, Solution, SolverConfig, SolverMethod};
use crate::{constants::INV_GOLDEN_RATIO, kepsolve_errors::KepsolveError};

/// Golden-section strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoldenSection;

impl KeplerSolver for GoldenSection {
    fn method(&self) -> SolverMethod {
        SolverMethod::GoldenSection
    }

    fn iterate(&self, problem: &KeplerProblem, config: &SolverConfig) -> Result<Solution, KepsolveError> {
        let (mut lower, mut upper) = problem.bracket(config.bracket)?;
        let mut trace = ConvergenceTrace::with_capacity(config.max_iterations.min(96));

        if let Some(root) = problem.endpoint_root(lower, upper) {
            trace.push(0.0);
            return Ok(Solution::new(root, trace, SolverMethod::GoldenSection));
        }

        let mut f_lower = problem.residual(lower);

        for _ in 0..config.max_iterations {
            let width = upper - lower;
            let mid = lower + 0.5 * width;
            trace.push(problem.residual(mid));

            if width < config.tolerance {
                return Ok(Solution::new(mid, trace, SolverMethod::GoldenSection));
            }

            let x1 = upper - INV_GOLDEN_RATIO * width;
            let x2 = lower + INV_GOLDEN_RATIO * width;
            let f1 = problem.residual(x1);
            let f2 = problem.residual(x2);

            if f1 == 0.0 {
                return Ok(Solution::new(x1, trace, SolverMethod::GoldenSection));
            }
            if f2 == 0.0 {
                return Ok(Solution::new(x2, trace, SolverMethod::GoldenSection));
            }

            if f1.signum() != f2.signum() {
                if f1.abs() < f2.abs() {
                    upper = x2;
                } else {
                    lower = x1;
                    f_lower = f1;
                }
            } else if f_lower.signum() != f1.signum() {
                upper = x2;
            } else {
                lower = x1;
                f_lower = f1;
            }
        }

        Err(problem.diverged(
            SolverMethod::GoldenSection,
            trace.len(),
            0.5 * (lower + upper),
        ))
    }
}

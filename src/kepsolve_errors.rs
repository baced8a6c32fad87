use thiserror::Error;

use crate::anomaly_solver::SolverMethod;

#[derive(Error, Debug)]
pub enum KepsolveError {
    #[error(
        "Bracket [{lower}, {upper}] does not contain a sign change of the Kepler residual (f(a) = {f_lower}, f(b) = {f_upper})"
    )]
    Bracket {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },

    #[error(
        "{method} did not converge after {iterations} iterations (last estimate {last_estimate}, residual {last_residual:e})"
    )]
    Divergence {
        method: SolverMethod,
        iterations: usize,
        last_estimate: f64,
        last_residual: f64,
    },

    #[error("Invalid orbital elements: {0}")]
    InvalidElements(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("ROOTS finding error: {0}")]
    RootFindingError(#[from] roots::SearchError),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),
}

impl PartialEq for KepsolveError {
    fn eq(&self, other: &Self) -> bool {
        use KepsolveError::*;
        match (self, other) {
            (
                Bracket {
                    lower: a0,
                    upper: b0,
                    ..
                },
                Bracket {
                    lower: a1,
                    upper: b1,
                    ..
                },
            ) => a0 == a1 && b0 == b1,
            (
                Divergence {
                    method: m0,
                    iterations: i0,
                    ..
                },
                Divergence {
                    method: m1,
                    iterations: i1,
                    ..
                },
            ) => m0 == m1 && i0 == i1,
            (InvalidElements(a), InvalidElements(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (RootFindingError(a), RootFindingError(b)) => a == b,

            // Ces erreurs ne sont pas comparables : égalité si même variant
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            _ => false,
        }
    }
}

impl KepsolveError {
    /// Short taxonomy name of the error, stable across message changes.
    pub fn kind(&self) -> &'static str {
        match self {
            KepsolveError::Bracket { .. } => "BracketError",
            KepsolveError::Divergence { .. } => "DivergenceError",
            KepsolveError::InvalidElements(_) => "InvalidElementsError",
            KepsolveError::InvalidParameter(_) => "InvalidParameterError",
            KepsolveError::RootFindingError(_) => "RootFindingError",
            KepsolveError::IoError(_) => "IoError",
            KepsolveError::CsvError(_) => "CsvError",
        }
    }
}

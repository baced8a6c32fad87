//! # Kepler equation primitives
//!
//! Scalar building blocks shared by every anomaly solver:
//!
//! - [`kepler_residual`] – `f(E) = E - e·sin(E) - M`, whose root is the eccentric anomaly.
//! - [`kepler_derivative`] – `f'(E) = 1 - e·cos(E)`, strictly positive for `e < 1`.
//! - [`principal_angle`] / [`signed_angle`] – angle normalisation helpers.
//! - [`reference_eccentric_anomaly`] – an independent Brent solve (via the `roots` crate)
//!   used to check the in-house strategies against each other.
use roots::{find_root_brent, SimpleConvergency};

use crate::{
    constants::{Radian, DEFAULT_BRACKET_HALF_WIDTH, DPI},
    kepsolve_errors::KepsolveError,
};
use std::f64::consts::PI;

/// Residual of Kepler's equation, `E - e·sin(E) - M`.
#[inline]
pub fn kepler_residual(eccentric_anomaly: Radian, eccentricity: f64, mean_anomaly: Radian) -> f64 {
    eccentric_anomaly - eccentricity * eccentric_anomaly.sin() - mean_anomaly
}

/// Derivative of the Kepler residual with respect to `E`.
#[inline]
pub fn kepler_derivative(eccentric_anomaly: Radian, eccentricity: f64) -> f64 {
    1.0 - eccentricity * eccentric_anomaly.cos()
}

/// Retourne la valeur principale d'un angle en radians dans [0, 2π).
pub fn principal_angle(a: f64) -> f64 {
    let r = a.rem_euclid(DPI);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if r >= DPI {
        0.0
    } else {
        r
    }
}

/// Angle ramené dans l'intervalle (-π, π].
pub fn signed_angle(a: f64) -> f64 {
    let r = principal_angle(a);
    if r > PI {
        r - DPI
    } else {
        r
    }
}

/// Solve Kepler's equation with Brent's method from the `roots` crate.
///
/// This is deliberately independent from the strategies of
/// [`anomaly_solver`](crate::anomaly_solver): it is the yardstick used by
/// [`compare_methods`](crate::anomaly_solver::compare_methods) to report how far each
/// strategy lands from the root.
///
/// Arguments
/// -----------------
/// * `mean_anomaly`: mean anomaly `M` (radians).
/// * `eccentricity`: eccentricity `e ∈ [0, 1)`.
/// * `tolerance`: absolute tolerance on `E` and on the residual.
///
/// Return
/// ----------
/// * The eccentric anomaly in `[M - 1, M + 1]`, or a [`KepsolveError::RootFindingError`].
pub fn reference_eccentric_anomaly(
    mean_anomaly: Radian,
    eccentricity: f64,
    tolerance: f64,
) -> Result<Radian, KepsolveError> {
    let f = |e_anom: f64| kepler_residual(e_anom, eccentricity, mean_anomaly);

    let mut convergency = SimpleConvergency {
        eps: tolerance,
        max_iter: 200,
    };

    Ok(find_root_brent(
        mean_anomaly - DEFAULT_BRACKET_HALF_WIDTH,
        mean_anomaly + DEFAULT_BRACKET_HALF_WIDTH,
        &f,
        &mut convergency,
    )?)
}

#[cfg(test)]
mod kepler_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_principal_angle() {
        assert_eq!(principal_angle(0.0), 0.0);
        assert_abs_diff_eq!(principal_angle(-PI / 2.0), 1.5 * PI, epsilon = 1e-15);
        assert_abs_diff_eq!(principal_angle(5.0 * PI), PI, epsilon = 1e-14);
        assert!(principal_angle(-1e-18) < DPI);
    }

    #[test]
    fn test_signed_angle() {
        assert_abs_diff_eq!(signed_angle(1.5 * PI), -0.5 * PI, epsilon = 1e-15);
        assert_abs_diff_eq!(signed_angle(PI), PI, epsilon = 1e-15);
        assert_abs_diff_eq!(signed_angle(-0.25), -0.25, epsilon = 1e-15);
    }

    #[test]
    fn test_residual_and_derivative() {
        assert_eq!(kepler_residual(1.0, 0.0, 1.0), 0.0);
        assert_abs_diff_eq!(
            kepler_residual(PI / 2.0, 0.5, 0.0),
            PI / 2.0 - 0.5,
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(kepler_derivative(0.0, 0.3), 0.7, epsilon = 1e-15);
        assert_abs_diff_eq!(kepler_derivative(PI, 0.3), 1.3, epsilon = 1e-15);
    }

    #[test]
    fn test_reference_eccentric_anomaly() {
        let e_anom = reference_eccentric_anomaly(1.0, 0.5, 1e-13).unwrap();
        assert_abs_diff_eq!(e_anom, 1.498_701_133_517_9, epsilon = 1e-10);
        assert_abs_diff_eq!(kepler_residual(e_anom, 0.5, 1.0), 0.0, epsilon = 1e-12);
    }
}

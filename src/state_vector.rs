//! # Anomalies and in-plane kinematics
//!
//! Conversion between eccentric and true anomaly, and the orbital radius and
//! velocity components at a point of an elliptical orbit.
//!
//! ## True anomaly
//!
//! [`true_anomaly`] uses the quadrant-safe `atan2` form
//!
//! ```text
//! sin v ∝ √(1 - e²)·sin E
//! cos v ∝ cos E - e
//! ```
//!
//! (the common positive factor `1 / (1 - e·cos E)` is dropped), followed by a
//! normalisation into the interval selected by [`TrueAnomalyRange`].
//!
//! ## State vector
//!
//! With `p = a(1 - e²)`:
//!
//! ```text
//! r  = p / (1 + e·cos v)
//! Vr = √(μ/p) · e · sin v
//! Vt = √(μ/p) · (1 + e·cos v)
//! V  = √(Vr² + Vt²)
//! ```
//!
//! These formulas assume `e < 1`; [`OrbitalElements`] enforces it at construction.
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{
    constants::{Kilometer, KilometerPerSecond, Radian},
    kepler::{principal_angle, signed_angle},
    kepsolve_errors::KepsolveError,
    orbital_elements::OrbitalElements,
};

/// Interval into which true (and recovered eccentric) anomalies are reduced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrueAnomalyRange {
    /// `[0, 2π)`
    #[default]
    Positive,
    /// `(-π, π]`
    Signed,
}

impl TrueAnomalyRange {
    pub fn normalize(&self, angle: Radian) -> Radian {
        match self {
            TrueAnomalyRange::Positive => principal_angle(angle),
            TrueAnomalyRange::Signed => signed_angle(angle),
        }
    }
}

impl fmt::Display for TrueAnomalyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrueAnomalyRange::Positive => f.write_str("[0, 2π)"),
            TrueAnomalyRange::Signed => f.write_str("(-π, π]"),
        }
    }
}

impl FromStr for TrueAnomalyRange {
    type Err = KepsolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "[0, 2π)" | "0..2pi" => Ok(TrueAnomalyRange::Positive),
            "signed" | "(-π, π]" | "-pi..pi" => Ok(TrueAnomalyRange::Signed),
            _ => Err(KepsolveError::InvalidParameter(format!(
                "unknown true anomaly range '{s}'"
            ))),
        }
    }
}

/// True anomaly from the eccentric anomaly.
///
/// Arguments
/// -----------------
/// * `eccentric_anomaly`: `E` (radians), any real value.
/// * `eccentricity`: `e ∈ [0, 1)`.
/// * `range`: output interval.
///
/// Return
/// ----------
/// * `v`, normalised into `range`.
///
/// See also
/// ------------
/// * [`true_anomaly_half_angle`] – tangent half-angle form, for cross-checks.
/// * [`eccentric_anomaly_from_true`] – inverse transformation.
pub fn true_anomaly(eccentric_anomaly: Radian, eccentricity: f64, range: TrueAnomalyRange) -> Radian {
    let (sin_e, cos_e) = eccentric_anomaly.sin_cos();
    // √(1-e²) written as √((1-e)(1+e)) to keep precision when e → 1
    let beta = ((1.0 - eccentricity) * (1.0 + eccentricity)).sqrt();
    range.normalize((beta * sin_e).atan2(cos_e - eccentricity))
}

/// True anomaly from the tangent half-angle relation
/// `tan(v/2) = √((1+e)/(1-e))·tan(E/2)`.
///
/// The result lies in `(-π, π)`; it is undefined at `E = ±π` where `tan(E/2)` blows up.
pub fn true_anomaly_half_angle(eccentric_anomaly: Radian, eccentricity: f64) -> Radian {
    let k = ((1.0 + eccentricity) / (1.0 - eccentricity)).sqrt();
    2.0 * (k * (0.5 * eccentric_anomaly).tan()).atan()
}

/// Eccentric anomaly from the true anomaly, normalised into `range`.
pub fn eccentric_anomaly_from_true(true_anomaly: Radian, eccentricity: f64, range: TrueAnomalyRange) -> Radian {
    let (sin_v, cos_v) = true_anomaly.sin_cos();
    let beta = ((1.0 - eccentricity) * (1.0 + eccentricity)).sqrt();
    range.normalize((beta * sin_v).atan2(eccentricity + cos_v))
}

/// The three anomalies of one epoch, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyTriple {
    pub mean_anomaly: Radian,
    pub eccentric_anomaly: Radian,
    pub true_anomaly: Radian,
}

impl AnomalyTriple {
    /// Complete `(M, E)` with the true anomaly in `range`.
    pub fn new(mean_anomaly: Radian, eccentric_anomaly: Radian, eccentricity: f64, range: TrueAnomalyRange) -> Self {
        AnomalyTriple {
            mean_anomaly,
            eccentric_anomaly,
            true_anomaly: true_anomaly(eccentric_anomaly, eccentricity, range),
        }
    }
}

/// Radius and velocity components at one point of the orbit.
///
/// Units: km and km/s (those of [`OrbitalElements`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub radius: Kilometer,
    pub radial_velocity: KilometerPerSecond,
    pub tangential_velocity: KilometerPerSecond,
    pub speed: KilometerPerSecond,
}

impl StateVector {
    /// State at true anomaly `v`.
    pub fn from_true_anomaly(true_anomaly: Radian, elements: &OrbitalElements) -> Self {
        let e = elements.eccentricity();
        let p = elements.focal_parameter();
        let (sin_v, cos_v) = true_anomaly.sin_cos();

        let one_plus_ecosv = 1.0 + e * cos_v;
        let velocity_scale = (elements.gravitational_parameter() / p).sqrt();

        let radial_velocity = velocity_scale * e * sin_v;
        let tangential_velocity = velocity_scale * one_plus_ecosv;

        StateVector {
            radius: p / one_plus_ecosv,
            radial_velocity,
            tangential_velocity,
            speed: radial_velocity.hypot(tangential_velocity),
        }
    }

    /// Specific angular momentum `r·Vt`, constant along the orbit and equal to `√(μp)`.
    pub fn angular_momentum(&self) -> f64 {
        self.radius * self.tangential_velocity
    }
}

/// Position in the perifocal frame (x towards periapsis), km.
pub fn perifocal_position(true_anomaly: Radian, elements: &OrbitalElements) -> Vector2<f64> {
    let e = elements.eccentricity();
    let (sin_v, cos_v) = true_anomaly.sin_cos();
    let r = elements.focal_parameter() / (1.0 + e * cos_v);
    Vector2::new(r * cos_v, r * sin_v)
}

/// Velocity in the perifocal frame, km/s.
pub fn perifocal_velocity(true_anomaly: Radian, elements: &OrbitalElements) -> Vector2<f64> {
    let e = elements.eccentricity();
    let (sin_v, cos_v) = true_anomaly.sin_cos();
    let scale = (elements.gravitational_parameter() / elements.focal_parameter()).sqrt();
    Vector2::new(-scale * sin_v, scale * (e + cos_v))
}

/// State vector at eccentric anomaly `E`.
///
/// Arguments
/// -----------------
/// * `eccentric_anomaly`: `E` (radians).
/// * `elements`: orbit shape and gravitational parameter.
///
/// Return
/// ----------
/// * [`StateVector`] at the true anomaly corresponding to `E`.
pub fn compute_state_vector(eccentric_anomaly: Radian, elements: &OrbitalElements) -> StateVector {
    let v = true_anomaly(
        eccentric_anomaly,
        elements.eccentricity(),
        TrueAnomalyRange::Positive,
    );
    StateVector::from_true_anomaly(v, elements)
}

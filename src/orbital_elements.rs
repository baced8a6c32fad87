//! # Planar elliptical orbital elements
//!
//! This module defines [`OrbitalElements`], the immutable set of two-body quantities
//! needed to sweep an elliptical orbit over one period:
//!
//! 1. **e** – Eccentricity (unitless, `0 ≤ e < 1`)
//! 2. **a** – Semi-major axis (km)
//! 3. **p** – Focal parameter / semi-latus rectum `a(1 - e²)` (km)
//! 4. **μ** – Gravitational parameter of the central body (km³/s²)
//! 5. **n** – Mean motion `√(μ / a³)` (rad/s)
//! 6. **T** – Period `2π / n` (s)
//!
//! ## Derivation from apsides
//!
//! [`OrbitalElements::from_apsides`] follows the convention where the apsidal
//! distances may be measured from the **surface** of the central body, the planet
//! radius `R` being added back on both sides:
//!
//! ```text
//! e = (r_a - r_p) / (r_a + r_p + 2R)
//! a = (r_a + r_p) / 2 + R
//! ```
//!
//! With `R = 0` the inputs are plain focal distances.
//!
//! ## Example
//!
//! ```rust
//! use kepsolve::orbital_elements::derive_orbital_elements;
//! use kepsolve::constants::EARTH_MASS;
//!
//! let elements = derive_orbital_elements(46_071.0, 6_971.0, 0.0, EARTH_MASS).unwrap();
//! assert!((elements.eccentricity() - 0.7372).abs() < 1e-4);
//! assert!((elements.semi_major_axis() - 26_521.0).abs() < 1e-9);
//! ```
use std::fmt;

use crate::{
    constants::{Kilogram, Kilometer, Radian, Second, DPI, GRAVITATIONAL_CONSTANT_KM},
    kepsolve_errors::KepsolveError,
};

/// Two-body elements of an elliptical orbit (`0 ≤ e < 1`).
///
/// Units
/// -----
/// * `semi_major_axis`, `focal_parameter`: km.
/// * `gravitational_parameter`: km³/s².
/// * `mean_motion`: rad/s.
/// * `period`: s.
///
/// Fields are private: an instance is validated once at construction and never
/// modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    eccentricity: f64,
    semi_major_axis: Kilometer,
    focal_parameter: Kilometer,
    gravitational_parameter: f64,
    mean_motion: f64,
    period: Second,
}

impl OrbitalElements {
    /// Build elements from shape and gravitational parameter.
    ///
    /// Arguments
    /// ---------
    /// * `eccentricity` – `e ∈ [0, 1)`.
    /// * `semi_major_axis` – `a > 0` (km).
    /// * `gravitational_parameter` – `μ > 0` (km³/s²).
    ///
    /// Errors
    /// ------
    /// * [`KepsolveError::InvalidElements`] when one of the bounds above is violated
    ///   or an input is not finite.
    pub fn new(
        eccentricity: f64,
        semi_major_axis: Kilometer,
        gravitational_parameter: f64,
    ) -> Result<Self, KepsolveError> {
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(KepsolveError::InvalidElements(format!(
                "eccentricity {eccentricity} outside [0, 1): only elliptical orbits are supported"
            )));
        }
        if !(semi_major_axis.is_finite() && semi_major_axis > 0.0) {
            return Err(KepsolveError::InvalidElements(format!(
                "semi-major axis must be finite and > 0, got {semi_major_axis}"
            )));
        }
        if !(gravitational_parameter.is_finite() && gravitational_parameter > 0.0) {
            return Err(KepsolveError::InvalidElements(format!(
                "gravitational parameter must be finite and > 0, got {gravitational_parameter}"
            )));
        }

        let focal_parameter = semi_major_axis * (1.0 - eccentricity) * (1.0 + eccentricity);
        let mean_motion = (gravitational_parameter / semi_major_axis.powi(3)).sqrt();

        Ok(Self {
            eccentricity,
            semi_major_axis,
            focal_parameter,
            gravitational_parameter,
            mean_motion,
            period: DPI / mean_motion,
        })
    }

    /// Derive elements from apogee/perigee radii and the central-body mass.
    ///
    /// `μ = G·M` with `G` in km³·kg⁻¹·s⁻² ([`GRAVITATIONAL_CONSTANT_KM`]), so the radii
    /// are expected in km.
    ///
    /// See also
    /// --------
    /// * [`OrbitalElements::from_apsides_with_mu`] – same derivation with `μ` given directly.
    pub fn from_apsides(
        apogee: Kilometer,
        perigee: Kilometer,
        planet_radius: Kilometer,
        central_mass: Kilogram,
    ) -> Result<Self, KepsolveError> {
        if !(central_mass.is_finite() && central_mass > 0.0) {
            return Err(KepsolveError::InvalidElements(format!(
                "central mass must be finite and > 0, got {central_mass}"
            )));
        }
        Self::from_apsides_with_mu(
            apogee,
            perigee,
            planet_radius,
            GRAVITATIONAL_CONSTANT_KM * central_mass,
        )
    }

    /// Derive elements from apogee/perigee radii and a gravitational parameter.
    ///
    /// Errors
    /// ------
    /// * [`KepsolveError::InvalidElements`] if `apogee < perigee`, if a radius is
    ///   negative or not finite, or if the derived elements are not elliptical.
    pub fn from_apsides_with_mu(
        apogee: Kilometer,
        perigee: Kilometer,
        planet_radius: Kilometer,
        gravitational_parameter: f64,
    ) -> Result<Self, KepsolveError> {
        for (name, value) in [
            ("apogee", apogee),
            ("perigee", perigee),
            ("planet radius", planet_radius),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(KepsolveError::InvalidElements(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        if apogee < perigee {
            return Err(KepsolveError::InvalidElements(format!(
                "apogee ({apogee}) must not be less than perigee ({perigee})"
            )));
        }

        let span = apogee + perigee + 2.0 * planet_radius;
        if span <= 0.0 {
            return Err(KepsolveError::InvalidElements(
                "apsidal radii and planet radius are all zero".into(),
            ));
        }

        let eccentricity = (apogee - perigee) / span;
        let semi_major_axis = 0.5 * span;

        Self::new(eccentricity, semi_major_axis, gravitational_parameter)
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn semi_major_axis(&self) -> Kilometer {
        self.semi_major_axis
    }

    pub fn focal_parameter(&self) -> Kilometer {
        self.focal_parameter
    }

    pub fn gravitational_parameter(&self) -> f64 {
        self.gravitational_parameter
    }

    pub fn mean_motion(&self) -> f64 {
        self.mean_motion
    }

    pub fn period(&self) -> Second {
        self.period
    }

    /// Closest focal distance, `a(1 - e)`.
    pub fn periapsis_radius(&self) -> Kilometer {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Farthest focal distance, `a(1 + e)`.
    pub fn apoapsis_radius(&self) -> Kilometer {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    /// Mean anomaly `n·t` at time `t` past periapsis.
    pub fn mean_anomaly_at(&self, time: Second) -> Radian {
        self.mean_motion * time
    }
}

/// Derive [`OrbitalElements`] from apsides and central-body mass.
///
/// Free-function form of [`OrbitalElements::from_apsides`].
pub fn derive_orbital_elements(
    apogee: Kilometer,
    perigee: Kilometer,
    planet_radius: Kilometer,
    central_mass: Kilogram,
) -> Result<OrbitalElements, KepsolveError> {
    OrbitalElements::from_apsides(apogee, perigee, planet_radius, central_mass)
}

impl fmt::Display for OrbitalElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Orbital Elements (two-body, elliptical)")?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "  e   (eccentricity)          = {:.6}",
            self.eccentricity
        )?;
        writeln!(
            f,
            "  a   (semi-major axis)       = {:.3} km",
            self.semi_major_axis
        )?;
        writeln!(
            f,
            "  p   (focal parameter)       = {:.3} km",
            self.focal_parameter
        )?;
        writeln!(
            f,
            "  μ   (gravitational param.)  = {:.6e} km³/s²",
            self.gravitational_parameter
        )?;
        writeln!(
            f,
            "  n   (mean motion)           = {:.6e} rad/s",
            self.mean_motion
        )?;
        writeln!(
            f,
            "  T   (period)                = {:.3} s ({:.4} h)",
            self.period,
            self.period / 3600.0
        )
    }
}

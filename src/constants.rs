//! # Constants and type definitions for kepsolve
//!
//! This module centralizes the **physical constants**, **numerical defaults** and
//! **unit aliases** shared by the solver, the element derivation and the time-series
//! driver.
//!
//! ## Units
//!
//! The element derivation works in **kilometres, kilograms and seconds**: the
//! gravitational constant is expressed in km³·kg⁻¹·s⁻², so apsidal radii are given
//! in km, the period comes out in seconds and velocities in km/s.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Newtonian gravitational constant in SI units, m³·kg⁻¹·s⁻² (CODATA 2018)
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;

/// Newtonian gravitational constant in km³·kg⁻¹·s⁻²
pub const GRAVITATIONAL_CONSTANT_KM: f64 = GRAVITATIONAL_CONSTANT * 1e-9;

/// Earth mass in kilograms
pub const EARTH_MASS: f64 = 5.972e24;

/// Earth mean radius in kilometres
pub const EARTH_MEAN_RADIUS_KM: f64 = 6_371.0;

// -------------------------------------------------------------------------------------------------
// Numerical defaults
// -------------------------------------------------------------------------------------------------

/// Default convergence tolerance of the anomaly solvers (radians)
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default iteration budget of the anomaly solvers.
///
/// Fixed-point iteration contracts at a rate close to `e`, so it needs a few hundred
/// steps at `e ≈ 0.95`.
pub const DEFAULT_MAX_ITERATIONS: usize = 1_000;

/// Half-width of the default bracket `[M - w, M + w]` used by the bracketing solvers.
///
/// Since `|E - M| = e·|sin E| <= e < 1`, this bracket always contains the root of
/// Kepler's equation for elliptical orbits.
pub const DEFAULT_BRACKET_HALF_WIDTH: f64 = 1.0;

/// Default number of epochs of a time-series sweep (one per degree of mean anomaly, both ends included)
pub const DEFAULT_SAMPLE_COUNT: usize = 361;

/// Inverse golden ratio `(√5 - 1) / 2`
pub const INV_GOLDEN_RATIO: f64 = 0.618_033_988_749_894_8;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Velocity in kilometers per second
pub type KilometerPerSecond = f64;
/// Duration in seconds
pub type Second = f64;
/// Mass in kilograms
pub type Kilogram = f64;

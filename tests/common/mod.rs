#![allow(dead_code)]

use kepsolve::anomaly_solver::{SolverConfig, SolverMethod};
use kepsolve::constants::EARTH_MASS;
use kepsolve::orbital_elements::{derive_orbital_elements, OrbitalElements};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Apogee 46 071 km, perigee 6 971 km around the Earth.
pub fn reference_orbit() -> OrbitalElements {
    derive_orbital_elements(46_071.0, 6_971.0, 0.0, EARTH_MASS).unwrap()
}

/// Seeded `(M, e)` pairs with `M ∈ [0, 2π)` and `e ∈ [0, 0.99]`.
pub fn random_cases(seed: u64, count: usize) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let m = rng.random::<f64>() * std::f64::consts::TAU;
            let e = rng.random_range(0.0..=0.99);
            (m, e)
        })
        .collect()
}

/// Configuration with a budget large enough for fixed-point iteration at e = 0.99.
pub fn generous_config(method: SolverMethod, tolerance: f64) -> SolverConfig {
    SolverConfig::builder()
        .method(method)
        .tolerance(tolerance)
        .max_iterations(50_000)
        .build()
        .unwrap()
}

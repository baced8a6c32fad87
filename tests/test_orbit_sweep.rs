mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use kepsolve::anomaly_solver::SolverMethod;
use kepsolve::constants::{DPI, EARTH_MASS, GRAVITATIONAL_CONSTANT_KM};
use kepsolve::orbital_elements::derive_orbital_elements;
use kepsolve::state_vector::compute_state_vector;
use kepsolve::time_series::export::{write_anomalies_csv, write_kinematics_csv};
use kepsolve::time_series::{run_time_series, run_time_series_with, Sampling, SweepParams};

use crate::common::reference_orbit;

#[test]
fn circular_elements_and_period() {
    let elements = derive_orbital_elements(7_000.0, 7_000.0, 0.0, EARTH_MASS).unwrap();
    let mu = GRAVITATIONAL_CONSTANT_KM * EARTH_MASS;

    assert_eq!(elements.eccentricity(), 0.0);
    assert_eq!(elements.semi_major_axis(), 7_000.0);
    assert_relative_eq!(
        elements.period(),
        DPI * (7_000.0f64.powi(3) / mu).sqrt(),
        max_relative = 1e-14
    );

    let series = run_time_series(&elements, SolverMethod::GoldenSection, 1e-10, 50).unwrap();
    for sample in &series {
        assert_eq!(sample.state.radius, 7_000.0);
        assert_eq!(sample.state.radial_velocity, 0.0);
    }
}

#[test]
fn every_method_gives_the_same_sweep() {
    let elements = reference_orbit();
    let newton = run_time_series(&elements, SolverMethod::Newton, 1e-12, 200).unwrap();

    for method in [
        SolverMethod::Bisection,
        SolverMethod::GoldenSection,
        SolverMethod::FixedPoint,
    ] {
        let params = SweepParams::builder()
            .method(method)
            .tolerance(1e-12)
            .max_iterations(10_000)
            .sample_count(200)
            .build()
            .unwrap();
        let series = run_time_series_with(&elements, &params).unwrap();

        assert_eq!(series.len(), newton.len());
        for (a, b) in newton.iter().zip(series.iter()) {
            assert_eq!(a.time, b.time);
            assert_abs_diff_eq!(
                a.anomalies.eccentric_anomaly,
                b.anomalies.eccentric_anomaly,
                epsilon = 1e-9
            );
            assert_relative_eq!(a.state.speed, b.state.speed, max_relative = 1e-8);
        }
    }

    // Newton needs far fewer iterations in total than bisection
    let bisection = run_time_series(&elements, SolverMethod::Bisection, 1e-12, 200).unwrap();
    assert!(newton.total_iterations() < bisection.total_iterations());
}

#[test]
fn samples_match_state_vector_computer() {
    let elements = reference_orbit();
    let series = run_time_series(&elements, SolverMethod::Newton, 1e-12, 73).unwrap();

    for sample in &series {
        let state = compute_state_vector(sample.anomalies.eccentric_anomaly, &elements);
        assert_eq!(state, sample.state);
        assert_relative_eq!(
            sample.anomalies.mean_anomaly,
            elements.mean_motion() * sample.time,
            max_relative = 1e-15
        );
    }
}

#[test]
fn one_minute_grid() {
    let elements = reference_orbit();
    let params = SweepParams::builder().time_step(60.0).build().unwrap();
    let series = run_time_series_with(&elements, &params).unwrap();

    let expected = (elements.period() / 60.0).ceil() as usize;
    assert_eq!(series.len(), expected);
    assert_eq!(series.params().sampling, Sampling::Step(60.0));
    assert!(series.samples().last().unwrap().time < elements.period());

    let extrema = series.extrema();
    assert_eq!(extrema.radius.min.index, 0);
    assert_relative_eq!(extrema.radius.min.value, 6_971.0, max_relative = 1e-10);
    assert!(extrema.radius.max.value <= 46_071.0 + 1e-6);
}

#[test]
fn single_sample_sweep() {
    let elements = reference_orbit();
    let series = run_time_series(&elements, SolverMethod::Newton, 1e-10, 1).unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series.samples()[0].time, 0.0);
    let extrema = series.extrema();
    assert_eq!(extrema.speed.min, extrema.speed.max);

    assert!(run_time_series(&elements, SolverMethod::Newton, 1e-10, 0).is_err());
}

#[test]
fn csv_exports() {
    let elements = reference_orbit();
    let series = run_time_series(&elements, SolverMethod::Newton, 1e-10, 25).unwrap();

    let mut kinematics = Vec::new();
    write_kinematics_csv(&mut kinematics, &series).unwrap();
    let mut reader = csv::Reader::from_reader(kinematics.as_slice());
    assert_eq!(
        reader.headers().unwrap(),
        vec!["time", "radius", "Vr", "Vt", "V"]
    );
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 25);

    let radius: f64 = records[12][1].parse().unwrap();
    assert_relative_eq!(radius, 46_071.0, max_relative = 1e-9);

    let mut anomalies = Vec::new();
    write_anomalies_csv(&mut anomalies, &series).unwrap();
    let mut reader = csv::Reader::from_reader(anomalies.as_slice());
    assert_eq!(reader.headers().unwrap(), vec!["time", "M", "E", "v"]);
    assert_eq!(reader.records().count(), 25);
}

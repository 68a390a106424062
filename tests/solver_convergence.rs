//! Convergence tests for integration methods
//!
//! These tests verify that methods exhibit the expected
//! convergence rates when refining the sub-step.

use pendulum_rs::models::{PendulumParameters, GRAVITY};
use pendulum_rs::physics::PhysicalSystem;
use pendulum_rs::solver::{MethodKind, Solver, SolverConfiguration};

mod common;
use common::{relative_error, single_pendulum, solve_serial, ExponentialDecay, HarmonicOscillator};

fn decay_error(method: MethodKind, integration_step: f64) -> f64 {
    let mut system = ExponentialDecay::new(5, 0.3);
    let config = SolverConfiguration::new(method, 1.0, integration_step);
    Solver::from_configuration(&system, config)
        .unwrap()
        .solve(&mut system, 10.0)
        .unwrap();
    (system.state[0] - system.analytical_solution(10.0)).abs()
}

#[test]
fn test_euler_first_order_convergence() {
    // Euler should have first-order convergence: error ~ O(h)
    let steps = [0.1, 0.05, 0.025, 0.0125];
    let errors: Vec<f64> = steps.iter().map(|h| decay_error(MethodKind::Euler, *h)).collect();

    for pair in errors.windows(2) {
        let ratio = pair[0] / pair[1];
        assert!(ratio > 1.8 && ratio < 2.2, "Convergence ratio {ratio} not first-order");
    }
}

#[test]
fn test_rk4_fourth_order_convergence() {
    // Halving h should divide the error by ~16
    let steps = [0.5, 0.25, 0.125];
    let errors: Vec<f64> = steps.iter().map(|h| decay_error(MethodKind::Rk4, *h)).collect();

    for pair in errors.windows(2) {
        let ratio = pair[0] / pair[1];
        assert!(ratio > 12.0 && ratio < 20.0, "Convergence ratio {ratio} not fourth-order");
    }
}

#[test]
fn test_merson_behaves_like_rk4() {
    for h in [0.5, 0.1] {
        assert_eq!(decay_error(MethodKind::Merson, h), decay_error(MethodKind::Rk4, h));
    }
}

#[test]
fn test_rk4_harmonic_oscillator() {
    let mut system = HarmonicOscillator::new(2.0);
    let config = SolverConfiguration::new(MethodKind::Rk4, 0.5, 0.01);
    let summary = Solver::from_configuration(&system, config)
        .unwrap()
        .solve(&mut system, 5.0)
        .unwrap();

    assert_eq!(summary.records(), 11);
    for (time, snapshot) in system.history.iter() {
        let (x, v) = system.analytical_solution(time);
        assert!((snapshot[0] - x).abs() < 1e-7, "x at t = {time}");
        assert!((snapshot[1] - v).abs() < 1e-7, "v at t = {time}");
    }
}

#[test]
fn test_euler_gains_energy_on_oscillator() {
    let mut system = HarmonicOscillator::new(1.0);
    let config = SolverConfiguration::new(MethodKind::Euler, 1.0, 0.01);
    Solver::from_configuration(&system, config)
        .unwrap()
        .solve(&mut system, 10.0)
        .unwrap();

    let energy = system.state[0].powi(2) + system.state[1].powi(2);
    assert!(energy > 1.05, "energy {energy} should drift upward");
}

#[test]
fn test_pendulum_rk4_self_convergence() {
    // Moderate amplitude, no closed form: compare against a fine reference
    let run = |h: f64| {
        let mut grid = single_pendulum(0.5, -0.1, PendulumParameters::default());
        solve_serial(&mut grid, SolverConfiguration::new(MethodKind::Rk4, 1.0, h), 1.0);
        grid.state().to_vec()
    };

    let reference = run(0.001);
    let error = |h: f64| {
        run(h)
            .iter()
            .zip(&reference)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    };

    let ratio = error(0.02) / error(0.01);
    assert!(ratio > 12.0 && ratio < 20.0, "Convergence ratio {ratio} not fourth-order");
}

#[test]
fn test_pendulum_small_angle_normal_mode() {
    // Linearised with unit masses and lengths, φ₂ = √2·φ₁ is the slow normal
    // mode with ω² = g·(2 − √2); both links then oscillate as cos(ωt).
    let amplitude = 1e-3;
    let mut grid = single_pendulum(
        amplitude,
        2.0_f64.sqrt() * amplitude,
        PendulumParameters::default(),
    );
    let phi_1_start = grid.state()[0];
    let phi_2_start = grid.state()[1];

    solve_serial(&mut grid, SolverConfiguration::new(MethodKind::Rk4, 0.25, 0.005), 2.0);

    let omega = (GRAVITY * (2.0 - 2.0_f64.sqrt())).sqrt();
    for (time, snapshot) in grid.history().iter() {
        let expected_1 = phi_1_start * (omega * time).cos();
        let expected_2 = phi_2_start * (omega * time).cos();
        assert!(
            (snapshot[0] - expected_1).abs() < 1e-5 * amplitude,
            "φ₁ at t = {time}: {} vs {expected_1}",
            snapshot[0]
        );
        assert!(
            (snapshot[1] - expected_2).abs() < 2e-5 * amplitude,
            "φ₂ at t = {time}: {} vs {expected_2}",
            snapshot[1]
        );
    }
    assert!(relative_error(grid.time(), 2.0) < 1e-12);
}

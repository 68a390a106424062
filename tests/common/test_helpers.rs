//! Helper functions for integration tests

use pendulum_rs::models::{AngleBounds, PendulumGrid, PendulumParameters};
use pendulum_rs::solver::{Solver, SolverConfiguration, SolveSummary};

/// Assert that two slices are close element-wise (relative, with an absolute floor)
pub fn assert_slices_close(actual: &[f64], expected: &[f64], tolerance: f64, message: &str) {
    assert_eq!(actual.len(), expected.len(), "{}: dimension mismatch", message);

    for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        let scale = e.abs().max(1.0);
        assert!(
            (a - e).abs() <= tolerance * scale,
            "{}: element {} is {} instead of {} (tolerance {})",
            message, i, a, e, tolerance
        );
    }
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

/// Grid with unit masses/lengths and asymmetric bounds (no symmetric cells)
pub fn test_grid(size_x: usize, size_y: usize) -> PendulumGrid {
    PendulumGrid::new(
        size_x,
        size_y,
        AngleBounds::new(-2.9, 3.1, -3.0, 2.7),
        PendulumParameters::default(),
    )
    .unwrap()
}

/// 1×1 grid whose only cell starts at (phi_1, phi_2)
///
/// A single cell sits at the midpoint of each bound range.
pub fn single_pendulum(phi_1: f64, phi_2: f64, parameters: PendulumParameters) -> PendulumGrid {
    PendulumGrid::new(
        1,
        1,
        AngleBounds::new(phi_1 - 0.5, phi_1 + 0.5, phi_2 - 0.5, phi_2 + 0.5),
        parameters,
    )
    .unwrap()
}

/// Integrates the whole grid on the calling thread
pub fn solve_serial(
    grid: &mut PendulumGrid,
    configuration: SolverConfiguration,
    time_max: f64,
) -> SolveSummary {
    Solver::from_configuration(&*grid, configuration)
        .unwrap()
        .solve(grid, time_max)
        .unwrap()
}

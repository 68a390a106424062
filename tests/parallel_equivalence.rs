//! Row-band decomposition against single-threaded integration

use pendulum_rs::physics::PhysicalSystem;
use pendulum_rs::solver::{
    row_bands, CancellationToken, MethodKind, ParallelCoordinator, Solver, SolverConfiguration,
};

mod common;
use common::{assert_slices_close, solve_serial, test_grid};

#[test]
fn test_bands_match_serial_for_every_worker_count() {
    for method in MethodKind::ALL {
        let config = SolverConfiguration::new(method, 0.25, 0.05);

        let mut serial = test_grid(4, 5);
        solve_serial(&mut serial, config, 1.0);

        for workers in 1..=5 {
            let mut grid = test_grid(4, 5);
            let summary = ParallelCoordinator::new(workers, config)
                .unwrap()
                .run(&mut grid, 1.0)
                .unwrap();

            assert_eq!(summary.workers(), workers);
            assert!(!summary.cancelled());
            assert_eq!(summary.steps_completed(), 4);
            assert_eq!(grid.history().len(), serial.history().len());
            assert_eq!(grid.time(), serial.time());

            let message = format!("{method} on {workers} workers");
            for ((t_par, par), (t_ser, ser)) in grid.history().iter().zip(serial.history().iter()) {
                assert_eq!(t_par, t_ser, "{message}");
                assert_slices_close(par.as_slice(), ser.as_slice(), 1e-12, &message);
            }
            assert_slices_close(grid.state(), serial.state(), 1e-12, &message);
        }
    }
}

#[test]
fn test_more_workers_than_rows() {
    let config = SolverConfiguration::new(MethodKind::Rk4, 0.5, 0.1);

    let mut serial = test_grid(3, 2);
    solve_serial(&mut serial, config, 1.0);

    let mut grid = test_grid(3, 2);
    let summary = ParallelCoordinator::new(8, config)
        .unwrap()
        .run(&mut grid, 1.0)
        .unwrap();

    assert_eq!(summary.workers(), 2);
    assert_slices_close(grid.state(), serial.state(), 1e-12, "capped workers");
}

#[test]
fn test_band_layout() {
    let bands = row_bands(10, 3).unwrap();
    assert_eq!(bands, vec![0..4, 4..7, 7..10]);

    let bands = row_bands(7, 7).unwrap();
    assert!(bands.iter().all(|band| band.len() == 1));

    assert!(row_bands(4, 0).is_err());
    assert!(row_bands(2, 3).is_err());
}

#[test]
fn test_cancelled_before_start_keeps_initial_snapshot() {
    let config = SolverConfiguration::new(MethodKind::Rk4, 0.1, 0.01);
    let coordinator = ParallelCoordinator::new(3, config).unwrap();
    coordinator.cancellation_token().cancel();

    let mut grid = test_grid(4, 6);
    let initial = grid.state().to_vec();
    let summary = coordinator.run(&mut grid, 1.0).unwrap();

    assert!(summary.cancelled());
    assert_eq!(summary.steps_completed(), 0);
    assert_eq!(grid.history().len(), 1);
    assert_eq!(grid.time(), 0.0);
    assert_eq!(grid.state(), initial.as_slice());
    assert!(!coordinator.monitor().is_running());
}

#[test]
fn test_resume_after_reset() {
    let config = SolverConfiguration::new(MethodKind::Euler, 0.5, 0.1);
    let coordinator = ParallelCoordinator::new(2, config).unwrap();

    let mut grid = test_grid(2, 4);
    coordinator.run(&mut grid, 1.0).unwrap();
    assert_eq!(grid.history().len(), 3);

    // A second run continues from the grid clock
    let token: CancellationToken = coordinator.cancellation_token();
    token.reset();
    let summary = coordinator.run(&mut grid, 2.0).unwrap();
    assert_eq!(summary.steps_completed(), 2);
    assert_eq!(grid.history().len(), 5);
    assert!((grid.time() - 2.0).abs() < 1e-12);

    let mut serial = test_grid(2, 4);
    let mut solver = Solver::from_configuration(&serial, config).unwrap();
    solver.solve(&mut serial, 2.0).unwrap();
    assert_slices_close(grid.state(), serial.state(), 1e-12, "resumed run");
}

#[test]
fn test_progress_reaches_one() {
    let config = SolverConfiguration::new(MethodKind::Rk4, 0.25, 0.05);
    let coordinator = ParallelCoordinator::new(2, config).unwrap();
    let monitor = coordinator.monitor();

    let mut grid = test_grid(2, 2);
    coordinator.run(&mut grid, 1.0).unwrap();

    assert!(!monitor.is_running());
    assert_eq!(monitor.progress(), 1.0);
}

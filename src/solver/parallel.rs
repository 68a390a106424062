//! Row-wise domain decomposition
//!
//! Cells of a [`PendulumGrid`] never interact, so a grid can be cut into
//! contiguous row bands that are integrated independently and stitched back
//! together afterwards. The result is bit-identical to integrating the whole
//! grid with the same `Δt`/`h`.
//!
//! # Workflow
//!
//! ```text
//!            ┌──────────────┐
//!            │ PendulumGrid │
//!            └──────┬───────┘
//!                   │ row_bands(size_y, N) + extract_rows
//!     ┌─────────────┼─────────────┐
//! ┌───▼───┐     ┌───▼───┐     ┌───▼───┐
//! │ band 0│     │ band 1│ ... │band N-1│   one Solver per band,
//! └───┬───┘     └───┬───┘     └───┬───┘   at most one rayon thread
//!     │             │             │         per hardware thread
//!     └─────────────┼─────────────┘
//!                   │ join, then merge in row order
//!            ┌──────▼───────┐
//!            │ PendulumGrid │
//!            └──────────────┘
//! ```
//!
//! Workers share nothing but a [`CancellationToken`] and write into their own
//! [`ProgressSlot`]. Merging runs on the calling thread after every worker has
//! returned, so no simulation state is ever locked.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use log::{info, warn};
use rayon::prelude::*;

use crate::error::{PendulumError, Result};
use crate::models::PendulumGrid;
use crate::physics::PhysicalSystem;
use crate::solver::{CancellationToken, ProgressSlot, SolveSummary, Solver, SolverConfiguration};

// =================================================================================================
// Band layout
// =================================================================================================

/// Splits `size_y` rows into `workers` contiguous bands
///
/// Every band gets `size_y / workers` rows and the first `size_y % workers`
/// bands one more, so band sizes differ by at most one.
///
/// # Errors
///
/// `Configuration` unless `1 ≤ workers ≤ size_y`.
///
/// # Example
///
/// ```rust
/// use pendulum_rs::solver::row_bands;
///
/// assert_eq!(row_bands(7, 3).unwrap(), vec![0..3, 3..5, 5..7]);
/// ```
pub fn row_bands(size_y: usize, workers: usize) -> Result<Vec<Range<usize>>> {
    if workers == 0 || workers > size_y {
        return Err(PendulumError::configuration(format!(
            "worker count must be between 1 and the number of rows ({size_y}), got {workers}"
        )));
    }

    let base = size_y / workers;
    let remainder = size_y % workers;

    let mut bands = Vec::with_capacity(workers);
    let mut start = 0;
    for band in 0..workers {
        let rows = base + usize::from(band < remainder);
        bands.push(start..start + rows);
        start += rows;
    }
    Ok(bands)
}

// =================================================================================================
// Run monitor
// =================================================================================================

/// Read-only view of a coordinator's current run
///
/// Cloneable and `Send`, meant for a thread that polls "is a run in progress"
/// and "how far along is it" while [`ParallelCoordinator::run`] blocks.
#[derive(Debug, Clone, Default)]
pub struct RunMonitor {
    running: Arc<AtomicBool>,
    slots: Arc<RwLock<Vec<ProgressSlot>>>,
}

impl RunMonitor {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Mean of the per-worker progress fractions, 0.0 before the first run
    pub fn progress(&self) -> f32 {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        if slots.is_empty() {
            return 0.0;
        }
        slots.iter().map(ProgressSlot::get).sum::<f32>() / slots.len() as f32
    }

    /// Installs fresh slots and raises the running flag until the guard drops
    fn begin(&self, slots: Vec<ProgressSlot>) -> RunningGuard<'_> {
        *self.slots.write().unwrap_or_else(PoisonError::into_inner) = slots;
        self.running.store(true, Ordering::Relaxed);
        RunningGuard { monitor: self }
    }
}

/// Lowers the running flag on every exit path of a run
struct RunningGuard<'a> {
    monitor: &'a RunMonitor,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.monitor.running.store(false, Ordering::Relaxed);
    }
}

// =================================================================================================
// Coordinator
// =================================================================================================

/// Outcome of a decomposed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Row range handled by each worker
    pub bands: Vec<Range<usize>>,
    /// Per-band solver outcome, in band order
    pub solves: Vec<SolveSummary>,
}

impl RunSummary {
    pub fn workers(&self) -> usize {
        self.bands.len()
    }

    /// Whether any band stopped on a cancellation request
    pub fn cancelled(&self) -> bool {
        self.solves.iter().any(|s| s.cancelled)
    }

    /// Coarse steps completed by the slowest band
    pub fn steps_completed(&self) -> usize {
        self.solves.iter().map(|s| s.steps_completed).min().unwrap_or(0)
    }
}

/// Runs one [`Solver`] per row band of a grid on a dedicated rayon pool
///
/// # Example
///
/// ```rust
/// use pendulum_rs::models::{AngleBounds, PendulumGrid, PendulumParameters};
/// use pendulum_rs::solver::{MethodKind, ParallelCoordinator, SolverConfiguration};
///
/// let mut grid = PendulumGrid::new(4, 6, AngleBounds::full_circle(), PendulumParameters::default())?;
/// let config = SolverConfiguration::new(MethodKind::Rk4, 0.1, 0.01);
///
/// let coordinator = ParallelCoordinator::new(3, config)?;
/// let summary = coordinator.run(&mut grid, 0.3)?;
///
/// assert_eq!(summary.bands, vec![0..2, 2..4, 4..6]);
/// assert_eq!(grid.history().len(), 4);
/// # Ok::<(), pendulum_rs::PendulumError>(())
/// ```
#[derive(Debug)]
pub struct ParallelCoordinator {
    workers: usize,
    configuration: SolverConfiguration,
    cancellation: CancellationToken,
    monitor: RunMonitor,
}

impl ParallelCoordinator {
    /// # Errors
    ///
    /// `Configuration` for zero workers or an invalid solver configuration.
    pub fn new(workers: usize, configuration: SolverConfiguration) -> Result<Self> {
        if workers == 0 {
            return Err(PendulumError::configuration("at least one worker is required"));
        }
        configuration.validate()?;

        Ok(Self {
            workers,
            configuration,
            cancellation: CancellationToken::new(),
            monitor: RunMonitor::default(),
        })
    }

    /// One worker per available hardware thread
    pub fn with_available_parallelism(configuration: SolverConfiguration) -> Result<Self> {
        let workers = std::thread::available_parallelism().map_or(1, |n| n.get());
        Self::new(workers, configuration)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn configuration(&self) -> &SolverConfiguration {
        &self.configuration
    }

    /// Handle that stops the current (or next) run when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn monitor(&self) -> RunMonitor {
        self.monitor.clone()
    }

    /// Integrates `grid` up to `time_max`, one worker per row band
    ///
    /// The worker count is capped at `size_y`. Bands are scheduled on a pool no
    /// larger than the available hardware parallelism, so asking for more
    /// bands than cores queues them instead of oversubscribing. After all
    /// workers return (finished or cancelled), every band's history and live
    /// state are merged into `grid` in row order.
    ///
    /// # Errors
    ///
    /// `Configuration` when the pool cannot be built or a band fails to
    /// integrate. `grid` is left untouched in that case.
    pub fn run(&self, grid: &mut PendulumGrid, time_max: f64) -> Result<RunSummary> {
        let (size_x, size_y) = grid.size();
        let workers = self.workers.min(size_y);
        if workers < self.workers {
            info!(
                "{} workers requested for {} rows, using {}",
                self.workers, size_y, workers
            );
        }

        let bands = row_bands(size_y, workers)?;
        info!(
            "Decomposing {}×{} grid into {} bands: {:?}",
            size_x, size_y, workers, bands
        );

        let mut parts = bands
            .iter()
            .map(|rows| grid.extract_rows(rows.clone()))
            .collect::<Result<Vec<_>>>()?;

        let threads = pool_size(workers);
        if threads < workers {
            info!("Scheduling {} bands on {} threads", workers, threads);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("pendulum-band-{index}"))
            .build()
            .map_err(|e| PendulumError::configuration(format!("cannot start worker pool: {e}")))?;

        let slots: Vec<ProgressSlot> = (0..workers).map(|_| ProgressSlot::new()).collect();
        let solves = {
            let _running = self.monitor.begin(slots.clone());
            let configuration = self.configuration;
            let cancellation = &self.cancellation;

            pool.install(|| {
                parts
                    .par_iter_mut()
                    .zip(slots.par_iter())
                    .map(|(part, slot)| {
                        let mut solver = Solver::from_configuration(&*part, configuration)?
                            .with_progress(slot.clone())
                            .with_cancellation(cancellation.clone());
                        solver.solve(part, time_max)
                    })
                    .collect::<Result<Vec<_>>>()
            })?
        };

        for (part, rows) in parts.iter().zip(&bands) {
            grid.merge(part, rows.start)?;
        }

        let summary = RunSummary { bands, solves };
        if summary
            .solves
            .windows(2)
            .any(|pair| pair[0].steps_completed != pair[1].steps_completed)
        {
            warn!(
                "Bands stopped after different step counts; merged history has partially zero-filled snapshots"
            );
        }
        if summary.cancelled() {
            warn!(
                "Run cancelled after {} coarse steps, grid clock at t = {}",
                summary.steps_completed(),
                grid.time()
            );
        } else {
            info!("Merged {} bands, grid clock at t = {}", summary.workers(), grid.time());
        }

        Ok(summary)
    }
}

/// Pool threads for `workers` bands: never more than the hardware offers
fn pool_size(workers: usize) -> usize {
    let hardware = std::thread::available_parallelism().map_or(1, |n| n.get());
    workers.clamp(1, hardware)
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AngleBounds, PendulumParameters};
    use crate::solver::MethodKind;

    fn grid(size_x: usize, size_y: usize) -> PendulumGrid {
        PendulumGrid::new(
            size_x,
            size_y,
            AngleBounds::full_circle(),
            PendulumParameters::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_row_bands_even_split() {
        assert_eq!(row_bands(6, 3).unwrap(), vec![0..2, 2..4, 4..6]);
        assert_eq!(row_bands(4, 1).unwrap(), vec![0..4]);
    }

    #[test]
    fn test_row_bands_remainder_goes_first() {
        let bands = row_bands(10, 4).unwrap();
        assert_eq!(bands, vec![0..3, 3..6, 6..8, 8..10]);

        for (size_y, workers) in [(5, 2), (17, 5), (9, 9), (100, 7)] {
            let bands = row_bands(size_y, workers).unwrap();
            assert_eq!(bands.len(), workers);
            assert_eq!(bands.first().unwrap().start, 0);
            assert_eq!(bands.last().unwrap().end, size_y);
            for pair in bands.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
                assert!(pair[0].len() >= pair[1].len());
                assert!(pair[0].len() - pair[1].len() <= 1);
            }
        }
    }

    #[test]
    fn test_row_bands_rejects_bad_counts() {
        assert!(row_bands(4, 0).is_err());
        assert!(row_bands(4, 5).is_err());
    }

    #[test]
    fn test_coordinator_rejects_zero_workers() {
        let result = ParallelCoordinator::new(0, SolverConfiguration::default());
        assert!(matches!(result, Err(PendulumError::Configuration(_))));
    }

    #[test]
    fn test_workers_capped_by_rows() {
        let mut grid = grid(3, 2);
        let config = SolverConfiguration::new(MethodKind::Euler, 0.1, 0.05);
        let coordinator = ParallelCoordinator::new(8, config).unwrap();

        let summary = coordinator.run(&mut grid, 0.2).unwrap();
        assert_eq!(summary.workers(), 2);
        assert_eq!(grid.history().len(), 3);
    }

    #[test]
    fn test_run_matches_serial_solver() {
        let config = SolverConfiguration::new(MethodKind::Rk4, 0.1, 0.02);

        let mut serial = grid(3, 5);
        Solver::from_configuration(&serial, config)
            .unwrap()
            .solve(&mut serial, 0.5)
            .unwrap();

        let mut decomposed = grid(3, 5);
        ParallelCoordinator::new(2, config)
            .unwrap()
            .run(&mut decomposed, 0.5)
            .unwrap();

        let serial_times: Vec<f64> = serial.history().times().collect();
        let decomposed_times: Vec<f64> = decomposed.history().times().collect();
        assert_eq!(serial_times, decomposed_times);

        for (time, snapshot) in serial.history().iter() {
            assert_eq!(decomposed.history().lookup(time).unwrap(), snapshot);
        }
        assert_eq!(serial.state(), decomposed.state());
        assert_eq!(serial.time(), decomposed.time());
    }

    #[test]
    fn test_cancelled_run_merges_initial_state() {
        let mut grid = grid(2, 4);
        let initial = grid.state().to_vec();
        let coordinator = ParallelCoordinator::new(2, SolverConfiguration::default()).unwrap();
        coordinator.cancellation_token().cancel();

        let summary = coordinator.run(&mut grid, 1.0).unwrap();

        assert!(summary.cancelled());
        assert_eq!(summary.steps_completed(), 0);
        assert_eq!(grid.history().len(), 1);
        assert_eq!(grid.history().lookup(0.0).unwrap().as_slice(), initial.as_slice());
        assert_eq!(grid.time(), 0.0);
    }

    #[test]
    fn test_monitor_after_run() {
        let mut grid = grid(2, 4);
        let coordinator =
            ParallelCoordinator::new(4, SolverConfiguration::new(MethodKind::Euler, 0.1, 0.1))
                .unwrap();
        let monitor = coordinator.monitor();
        assert!(!monitor.is_running());
        assert_eq!(monitor.progress(), 0.0);

        coordinator.run(&mut grid, 0.3).unwrap();

        assert!(!monitor.is_running());
        assert_eq!(monitor.progress(), 1.0);
    }

    #[test]
    fn test_pool_size_bounded_by_hardware() {
        let hardware = std::thread::available_parallelism().map_or(1, |n| n.get());
        assert_eq!(pool_size(1), 1);
        assert_eq!(pool_size(hardware), hardware);
        assert_eq!(pool_size(hardware * 64), hardware);
    }

    #[test]
    fn test_more_bands_than_threads() {
        let config = SolverConfiguration::new(MethodKind::Rk4, 0.1, 0.05);
        let bands = 4 * std::thread::available_parallelism().map_or(1, |n| n.get());

        let mut serial = grid(2, bands);
        Solver::from_configuration(&serial, config)
            .unwrap()
            .solve(&mut serial, 0.2)
            .unwrap();

        let mut decomposed = grid(2, bands);
        let summary = ParallelCoordinator::new(bands, config)
            .unwrap()
            .run(&mut decomposed, 0.2)
            .unwrap();

        assert_eq!(summary.workers(), bands);
        assert!(summary.bands.iter().all(|rows| rows.len() == 1));
        assert_eq!(serial.state(), decomposed.state());
        assert_eq!(serial.history().len(), decomposed.history().len());
    }
}

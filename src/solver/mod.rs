//! Numerical solvers
//!
//! This module advances [`PhysicalSystem`](crate::physics::PhysicalSystem)s
//! in time and splits large grids across worker threads.
//!
//! # The Architecture (WHAT vs HOW)
//!
//! 1. **Integration method** ([`IntegrationMethod`]): how ONE coarse step is
//!    taken (Euler, RK4, Merson), sub-stepping included
//! 2. **Configuration** ([`SolverConfiguration`]): which method, coarse step
//!    `Δt` and sub-step `h`
//! 3. **Driver** ([`Solver`]): how MANY coarse steps, recording, progress and
//!    cancellation
//! 4. **Decomposition** ([`ParallelCoordinator`]): one driver per row band
//!    of a [`PendulumGrid`](crate::models::PendulumGrid)
//!
//! # Module Organization
//!
//! - **`traits`**: `IntegrationMethod`, `MethodKind`, `SolverConfiguration`
//! - **`methods`**: `EulerMethod`, `RK4Method`, `MersonMethod` and the
//!   runtime-selected `Method`
//! - **`control`**: `CancellationToken`, `ProgressSlot`
//! - **`driver`**: `Solver`, `SolveSummary`
//! - **`parallel`**: `ParallelCoordinator`, `RunMonitor`, `row_bands`
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌──────────────────────┐
//! │ SolverConfiguration  │ ← method, Δt, h
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐     ┌───────────────────┐
//! │ Solver::solve        │────►│ IntegrationMethod │ ← one Δt in steps of h
//! │ (record, progress,   │◄────│ (Euler/RK4/Merson)│
//! │  cancellation)       │     └───────────────────┘
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │ StateHistory         │ ← one snapshot per coarse step
//! └──────────────────────┘
//! ```
//!
//! # Quick Start Example
//!
//! ```rust
//! use pendulum_rs::models::{AngleBounds, PendulumGrid, PendulumParameters};
//! use pendulum_rs::solver::{MethodKind, ParallelCoordinator, SolverConfiguration};
//!
//! let mut grid = PendulumGrid::new(8, 8, AngleBounds::full_circle(), PendulumParameters::default())?;
//!
//! // 10 coarse steps over 1 s, sub-steps of 10 ms
//! let config = SolverConfiguration::from_step_count(MethodKind::Rk4, 1.0, 10, 0.01);
//!
//! let coordinator = ParallelCoordinator::new(4, config)?;
//! coordinator.run(&mut grid, 1.0)?;
//!
//! let final_phi_1 = grid.phi_1_at(3, 5, 1.0)?;
//! assert!(final_phi_1.is_finite());
//! # Ok::<(), pendulum_rs::PendulumError>(())
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`crate::Result`]. Setup problems (zero
//! sub-step, mismatched scratch buffers, too many workers) are
//! `PendulumError::Configuration`. NaN/Inf produced by the equations are not
//! errors; the driver logs a warning the first time one shows up.

// =================================================================================================
// Module Declarations
// =================================================================================================

mod control;
mod driver;
mod methods;
mod parallel;
mod traits;

// =================================================================================================
// Per-evaluation threading
// =================================================================================================
//
// Independent of the row-band decomposition: a single grid may also spread one
// right-hand side evaluation over rayon's global pool once its state is large
// enough. The cut-off is a process-wide atomic so tests and benchmarks can
// move it without locking the hot path.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// State length above which a grid evaluates its cells with rayon
/// (a bit under 16 × 16 cells of 4 components).
const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Current cut-off for threaded right-hand side evaluation
///
/// [`PendulumGrid`](crate::models::PendulumGrid) walks its cells on the
/// calling thread while its state holds at most this many values. Above it,
/// and only with the `parallel` feature, cells are split across rayon's
/// global pool. Both paths give bit-identical derivatives.
///
/// ```rust
/// use pendulum_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Moves the cut-off for threaded right-hand side evaluation
///
/// # Panics
///
/// When `threshold` is zero.
///
/// ```rust
/// use pendulum_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let previous = parallel_threshold();
/// set_parallel_threshold(4096);
/// assert_eq!(parallel_threshold(), 4096);
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// Restores the previous cut-off when dropped
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
}

#[cfg(test)]
impl ThresholdGuard {
    pub(crate) fn save(threshold: usize) -> Self {
        let previous = parallel_threshold();
        set_parallel_threshold(threshold);
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use control::{CancellationToken, ProgressSlot};
pub use driver::{SolveSummary, Solver};
pub use methods::{EulerMethod, MersonMethod, Method, RK4Method};
pub use parallel::{row_bands, ParallelCoordinator, RunMonitor, RunSummary};
pub use traits::{IntegrationMethod, MethodKind, SolverConfiguration};

// =================================================================================================
// Tests
// =================================================================================================

//! pendulum-rs: grids of double pendulums
//!
//! Simulates a rectangular grid of independent double pendulums whose initial
//! angles sweep two ranges, records every cell at fixed time points and
//! reads/writes those records as plain-text files.
//!
//! # Architecture
//!
//! pendulum-rs is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - Physical systems define equations (what to solve)
//!    - Integration methods advance them (how to solve)
//!
//! 2. **Decomposition without locks**
//!    - Cells never interact, so row bands are integrated on separate
//!      threads and merged afterwards
//!    - The merged result is bit-identical to a single-threaded run
//!
//! # Quick Start
//!
//! ```rust
//! use pendulum_rs::prelude::*;
//!
//! # fn main() -> pendulum_rs::Result<()> {
//! // 1. Build a grid of pendulums
//! let mut grid = PendulumGrid::new(
//!     16, 16,
//!     AngleBounds::full_circle(),
//!     PendulumParameters::default(),
//! )?;
//!
//! // 2. Configure the solver: 20 coarse steps over 2 s, sub-steps of 10 ms
//! let config = SolverConfiguration::from_step_count(MethodKind::Rk4, 2.0, 20, 0.01);
//!
//! // 3. Run on 4 workers
//! let coordinator = ParallelCoordinator::new(4, config)?;
//! coordinator.run(&mut grid, 2.0)?;
//!
//! // 4. Access results
//! assert_eq!(grid.history().len(), 21);
//! let phases = grid.phase_map(1.0)?;
//! assert_eq!(phases.dim(), (16, 16));
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`physics`]: system contract, state history, angle helpers
//! - [`models`]: the double-pendulum grid
//! - [`solver`]: integration methods, driver, parallel decomposition
//! - [`output`]: state file export and import
//! - [`config`]: TOML run configuration
//! - [`error`]: crate error type

// Core modules
pub mod error;
pub mod physics;

pub mod models;
pub mod solver;

pub mod config;
pub mod output;

pub use error::{PendulumError, Result};

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use pendulum_rs::prelude::*;
    //! ```
    pub use crate::error::{PendulumError, Result};
    pub use crate::models::{AngleBounds, Component, PendulumGrid, PendulumParameters};
    pub use crate::physics::{PhaseQuadrant, PhysicalSystem, StateHistory};
    pub use crate::solver::{
        CancellationToken, IntegrationMethod, MethodKind, ParallelCoordinator, ProgressSlot,
        Solver, SolverConfiguration,
    };
}

//! Persistence of simulation histories
//!
//! - **Export**: one plain-text file per recorded time
//! - **Import**: single files or whole folders back into a
//!   [`PendulumGrid`](crate::models::PendulumGrid) for playback
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← This file
//! ├── import.rs           ← Reader, folder loader
//! └── export/             ← Writers
//!     ├── mod.rs          ← Exporter trait
//!     └── text.rs
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use pendulum_rs::models::{AngleBounds, PendulumGrid, PendulumParameters};
//! use pendulum_rs::output::{export_history, load_folder};
//! use pendulum_rs::physics::PhysicalSystem;
//!
//! let dir = tempfile::tempdir().unwrap();
//!
//! let mut grid = PendulumGrid::new(3, 2, AngleBounds::full_circle(), PendulumParameters::default())?;
//! grid.record();
//! export_history(&grid, dir.path())?;
//!
//! let session = load_folder(dir.path(), PendulumParameters::default(), AngleBounds::full_circle())?;
//! assert_eq!(session.grid.size(), (3, 2));
//! # Ok::<(), pendulum_rs::PendulumError>(())
//! ```

pub mod export;
pub mod import;

// Re-export commonly used items for convenience
pub use export::{export_history, write_state_file, Exporter, TextExporter};
pub use import::{load_file, load_folder, read_state_file, LoadedSession, StateFile};

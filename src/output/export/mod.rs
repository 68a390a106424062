//! Export of simulation histories
//!
//! # Architecture
//!
//! This module defines the [`Exporter`] trait that abstracts the file format.
//! Each format is an independent implementation in its own sub-module; adding
//! a format means adding a file.
//!
//! # Available formats
//!
//! | Format | Module    | Reader |
//! |--------|-----------|--------|
//! | Plain text, one file per recorded time | [`text`] | [`crate::output::import`] |
//!
//! # Usage example
//!
//! ```rust,no_run
//! use pendulum_rs::models::{AngleBounds, PendulumGrid, PendulumParameters};
//! use pendulum_rs::output::export::{Exporter, TextExporter};
//! use pendulum_rs::physics::PhysicalSystem;
//!
//! let mut grid = PendulumGrid::new(16, 16, AngleBounds::full_circle(), PendulumParameters::default())?;
//! grid.record();
//!
//! let exporter = TextExporter::default();
//! let files = exporter.export_history(&grid, "results".as_ref())?;
//! println!("wrote {} files", files.len());
//! # Ok::<(), pendulum_rs::PendulumError>(())
//! ```

pub mod text;

pub use text::{export_history, write_state_file, TextExporter};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{PendulumError, Result};
use crate::models::PendulumGrid;

/// Abstraction trait for history export formats
///
/// Implementors only describe how ONE snapshot is written and how its file is
/// named; [`export_history`](Self::export_history) walks the history.
pub trait Exporter {
    /// File name (no directory) used for the snapshot recorded at `time`
    fn file_name(&self, time: f64) -> String;

    /// Writes the snapshot nearest to `time` into `path`
    ///
    /// # Errors
    ///
    /// `EmptyHistory` when nothing was recorded, `Io` when the file cannot be
    /// created or written.
    fn write_snapshot(&self, grid: &PendulumGrid, time: f64, path: &Path) -> Result<()>;

    /// Writes every recorded snapshot into `folder`, creating it if needed
    ///
    /// Returns the written paths in time order. Nothing is written when two
    /// snapshots map to the same file name.
    fn export_history(&self, grid: &PendulumGrid, folder: &Path) -> Result<Vec<PathBuf>> {
        if grid.history().is_empty() {
            return Err(PendulumError::EmptyHistory);
        }

        let mut names = HashSet::with_capacity(grid.history().len());
        let mut planned = Vec::with_capacity(grid.history().len());
        for time in grid.history().times() {
            let name = self.file_name(time);
            if !names.insert(name.clone()) {
                return Err(PendulumError::configuration(format!(
                    "snapshot t = {time} would overwrite {name}"
                )));
            }
            planned.push((time, folder.join(name)));
        }

        fs::create_dir_all(folder).map_err(|e| PendulumError::io(folder, e))?;

        let mut written = Vec::with_capacity(planned.len());
        for (time, path) in planned {
            self.write_snapshot(grid, time, &path)?;
            written.push(path);
        }

        info!(
            "Exported {} snapshots of a {}×{} grid to {}",
            written.len(),
            grid.size_x(),
            grid.size_y(),
            folder.display()
        );
        Ok(written)
    }
}

//! Plain-text state files
//!
//! One file holds one snapshot of a [`PendulumGrid`]:
//!
//! ```text
//! 1.000000000000000e0                  ← recorded time, scientific notation
//! 2 2                                  ← grid size, size_x then size_y
//!                                      ← blank
//! 0 0 <φ₁> <φ₂> <ω₁> <ω₂>              ← one line per grid point,
//! 1 0 <φ₁> <φ₂> <ω₁> <ω₂>                i fastest, then j
//!                                      ← blank after each row
//! 0 1 <φ₁> <φ₂> <ω₁> <ω₂>
//! 1 1 <φ₁> <φ₂> <ω₁> <ω₂>
//!
//! ```
//!
//! Values use the same notation as the time. The declared size lets a reader
//! detect truncated files; masses, lengths and bounds are not stored.
//!
//! Files are named `State_<time>.txt` with the time zero-padded to nanosecond
//! resolution so that file name order is time order for non-negative times.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{PendulumError, Result};
use crate::models::{Component, PendulumGrid};
use crate::output::export::Exporter;

/// Digits after the decimal point used by default
pub const DEFAULT_PRECISION: usize = 15;

/// Writer of the plain-text state format
///
/// # Example
///
/// ```rust
/// use pendulum_rs::output::export::{Exporter, TextExporter};
///
/// let exporter = TextExporter::default();
/// assert_eq!(exporter.file_name(2.5), "State_000000002.500000000.txt");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextExporter {
    /// Digits after the decimal point of the mantissa
    pub precision: usize,
}

impl Default for TextExporter {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl TextExporter {
    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    fn write_to<W: Write>(
        &self,
        grid: &PendulumGrid,
        time: f64,
        snapshot: &[f64],
        out: &mut W,
    ) -> std::io::Result<()> {
        let precision = self.precision;
        writeln!(out, "{time:.precision$e}")?;
        writeln!(out, "{} {}", grid.size_x(), grid.size_y())?;
        writeln!(out)?;

        for j in 0..grid.size_y() {
            for i in 0..grid.size_x() {
                write!(out, "{i} {j}")?;
                for component in Component::ALL {
                    let value = snapshot[grid.index(i, j, component)];
                    write!(out, " {value:.precision$e}")?;
                }
                writeln!(out)?;
            }
            writeln!(out)?;
        }
        out.flush()
    }
}

impl Exporter for TextExporter {
    fn file_name(&self, time: f64) -> String {
        format!("State_{time:019.9}.txt")
    }

    fn write_snapshot(&self, grid: &PendulumGrid, time: f64, path: &Path) -> Result<()> {
        let (recorded, snapshot) = grid.history().lookup_entry(time)?;

        let file = File::create(path).map_err(|e| PendulumError::io(path, e))?;
        let mut out = BufWriter::new(file);
        self.write_to(grid, recorded, snapshot.as_slice(), &mut out)
            .map_err(|e| PendulumError::io(path, e))?;

        debug!("Wrote snapshot t = {} to {}", recorded, path.display());
        Ok(())
    }
}

/// Writes the snapshot nearest to `time` with the default [`TextExporter`]
pub fn write_state_file(grid: &PendulumGrid, time: f64, path: impl AsRef<Path>) -> Result<()> {
    TextExporter::default().write_snapshot(grid, time, path.as_ref())
}

/// Writes every snapshot into `folder` with the default [`TextExporter`]
pub fn export_history(grid: &PendulumGrid, folder: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    TextExporter::default().export_history(grid, folder.as_ref())
}

// =================================================================================================
// Tests
// =================================================================================================

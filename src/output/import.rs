//! Reading plain-text state files back
//!
//! Counterpart of [`export::text`](crate::output::export::text). A single file
//! gives one snapshot; a folder of files rebuilds a whole history for
//! playback.
//!
//! # Validation
//!
//! - line 1 must be a number (the recorded time)
//! - line 2 must declare the grid size as two positive integers `size_x size_y`
//! - every other non-blank line must be `i j φ₁ φ₂ ω₁ ω₂` with
//!   `i < size_x` and `j < size_y`
//! - the number of data lines must equal `size_x × size_y` and no `(i, j)`
//!   may repeat
//!
//! Nothing is committed before a file has been read completely, so a bad file
//! never leaves a half-filled grid behind.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use nalgebra::DVector;

use crate::error::{PendulumError, Result};
use crate::models::{AngleBounds, COMPONENTS, PendulumGrid, PendulumParameters};
use crate::physics::StateHistory;

// =================================================================================================
// Single file
// =================================================================================================

/// One snapshot read from disk
#[derive(Debug, Clone, PartialEq)]
pub struct StateFile {
    pub time: f64,
    pub size_x: usize,
    pub size_y: usize,
    /// Flat state buffer in grid layout
    pub values: DVector<f64>,
}

struct DataLine {
    line: usize,
    i: usize,
    j: usize,
    values: [f64; COMPONENTS],
}

/// Parses one state file
///
/// # Errors
///
/// - `Io` when the file cannot be read
/// - `Parse` for a malformed header or data line, a grid point outside the
///   declared size, or a repeated grid point
/// - `CountMismatch` when the number of data lines differs from the declared size
pub fn read_state_file(path: impl AsRef<Path>) -> Result<StateFile> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| PendulumError::io(path, e))?;
    parse_state(path, &content)
}

fn parse_state(path: &Path, content: &str) -> Result<StateFile> {
    let mut lines = content.lines().enumerate().map(|(n, text)| (n + 1, text));

    let time = match lines.next() {
        Some((_, text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| PendulumError::parse(path, 1, format!("invalid time '{}': {e}", text.trim())))?,
        None => return Err(PendulumError::parse(path, 1, "empty file")),
    };

    let (size_x, size_y) = match lines.next() {
        Some((line, text)) => parse_size(path, line, text)?,
        None => return Err(PendulumError::parse(path, 2, "missing grid size")),
    };
    let expected = size_x
        .checked_mul(size_y)
        .filter(|cells| cells.checked_mul(COMPONENTS).is_some())
        .ok_or_else(|| {
            PendulumError::parse(path, 2, format!("grid size {size_x}×{size_y} is too large"))
        })?;

    let data = lines
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(line, text)| parse_data_line(path, line, text))
        .collect::<Result<Vec<_>>>()?;

    if let Some(point) = data.iter().find(|p| p.i >= size_x || p.j >= size_y) {
        return Err(PendulumError::parse(
            path,
            point.line,
            format!(
                "grid point ({}, {}) outside the declared {size_x}×{size_y} grid",
                point.i, point.j
            ),
        ));
    }
    if data.len() != expected {
        return Err(PendulumError::CountMismatch {
            path: path.to_path_buf(),
            expected,
            found: data.len(),
        });
    }

    let mut values = DVector::zeros(expected * COMPONENTS);
    let mut seen = vec![false; expected];
    for point in &data {
        let cell = point.j * size_x + point.i;
        if std::mem::replace(&mut seen[cell], true) {
            return Err(PendulumError::parse(
                path,
                point.line,
                format!("grid point ({}, {}) listed twice", point.i, point.j),
            ));
        }
        values.as_mut_slice()[cell * COMPONENTS..(cell + 1) * COMPONENTS]
            .copy_from_slice(&point.values);
    }

    Ok(StateFile {
        time,
        size_x,
        size_y,
        values,
    })
}

fn parse_size(path: &Path, line: usize, text: &str) -> Result<(usize, usize)> {
    let invalid = || PendulumError::parse(path, line, format!("invalid grid size '{}'", text.trim()));
    let fields: Vec<&str> = text.split_whitespace().collect();
    let [x, y] = fields.as_slice() else {
        return Err(invalid());
    };
    match (x.parse::<usize>(), y.parse::<usize>()) {
        (Ok(size_x), Ok(size_y)) if size_x > 0 && size_y > 0 => Ok((size_x, size_y)),
        _ => Err(invalid()),
    }
}

fn parse_data_line(path: &Path, line: usize, text: &str) -> Result<DataLine> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 2 + COMPONENTS {
        return Err(PendulumError::parse(
            path,
            line,
            format!("expected {} fields, found {}", 2 + COMPONENTS, fields.len()),
        ));
    }

    let index = |field: &str| {
        field
            .parse::<usize>()
            .map_err(|e| PendulumError::parse(path, line, format!("invalid index '{field}': {e}")))
    };
    let number = |field: &str| {
        field
            .parse::<f64>()
            .map_err(|e| PendulumError::parse(path, line, format!("invalid value '{field}': {e}")))
    };

    Ok(DataLine {
        line,
        i: index(fields[0])?,
        j: index(fields[1])?,
        values: [
            number(fields[2])?,
            number(fields[3])?,
            number(fields[4])?,
            number(fields[5])?,
        ],
    })
}

// =================================================================================================
// Grid reconstruction
// =================================================================================================

/// Grid rebuilt from disk, plus the files that could not be read
#[derive(Debug)]
pub struct LoadedSession {
    pub grid: PendulumGrid,
    /// Files skipped because they could not be opened or decoded as text
    pub skipped: Vec<PathBuf>,
}

/// Grid holding the single snapshot stored in `path`
///
/// Masses, lengths and bounds are not part of the file format and are taken
/// from the arguments.
pub fn load_file(
    path: impl AsRef<Path>,
    parameters: PendulumParameters,
    bounds: AngleBounds,
) -> Result<PendulumGrid> {
    parameters.validate()?;
    bounds.validate()?;

    let state = read_state_file(path)?;
    let mut history = StateHistory::new();
    history.record(state.time, state.values);
    PendulumGrid::from_history(state.size_x, state.size_y, bounds, parameters, history)
}

/// Rebuilds a full history from every `*.txt` file in `folder`
///
/// Files are read in file-name order. Files that cannot be read are skipped
/// with a warning and listed in [`LoadedSession::skipped`]; a malformed file
/// aborts the whole load. The grid's live state is its latest snapshot.
///
/// # Errors
///
/// - `Io` when `folder` cannot be listed
/// - `Parse` / `CountMismatch` from any readable file
/// - `Configuration` when files disagree on the grid size, or none is readable
pub fn load_folder(
    folder: impl AsRef<Path>,
    parameters: PendulumParameters,
    bounds: AngleBounds,
) -> Result<LoadedSession> {
    let folder = folder.as_ref();
    parameters.validate()?;
    bounds.validate()?;

    let mut files: Vec<PathBuf> = fs::read_dir(folder)
        .map_err(|e| PendulumError::io(folder, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();

    let mut history = StateHistory::new();
    let mut extent: Option<(usize, usize, PathBuf)> = None;
    let mut skipped = Vec::new();

    for path in files {
        let state = match read_state_file(&path) {
            Ok(state) => state,
            Err(PendulumError::Io { source, .. }) => {
                warn!("Skipping unreadable state file {}: {}", path.display(), source);
                skipped.push(path);
                continue;
            }
            Err(e) => return Err(e),
        };

        match &extent {
            Some((size_x, size_y, first)) if (*size_x, *size_y) != (state.size_x, state.size_y) => {
                return Err(PendulumError::configuration(format!(
                    "{} holds a {}×{} grid, {} holds {}×{}",
                    path.display(),
                    state.size_x,
                    state.size_y,
                    first.display(),
                    size_x,
                    size_y
                )));
            }
            Some(_) => {}
            None => extent = Some((state.size_x, state.size_y, path.clone())),
        }

        history.record(state.time, state.values);
    }

    let Some((size_x, size_y, _)) = extent else {
        return Err(PendulumError::configuration(format!(
            "no readable state files in {}",
            folder.display()
        )));
    };

    info!(
        "Loaded {} snapshots of a {}×{} grid from {} ({} skipped)",
        history.len(),
        size_x,
        size_y,
        folder.display(),
        skipped.len()
    );

    let grid = PendulumGrid::from_history(size_x, size_y, bounds, parameters, history)?;
    Ok(LoadedSession { grid, skipped })
}

// =================================================================================================
// Tests
// =================================================================================================

//! Crate-wide error type
//!
//! Every fallible operation of the crate returns [`Result<T>`], whose error
//! side is [`PendulumError`]. The variants follow the failure classes of the
//! simulation:
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | `EmptyHistory` | nearest-time lookup before anything was recorded |
//! | `Configuration` | invalid steps, sizes, row ranges, scratch buffer mismatch |
//! | `Parse` / `CountMismatch` | reading per-time-step state files |
//! | `Io` | opening, creating or listing files |
//! | `Config` | malformed TOML configuration |
//!
//! Numerical singularities are not part of this list: they show up as
//! NaN/Inf inside the state and are left to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PendulumError>;

#[derive(Error, Debug)]
pub enum PendulumError {
    /// Lookup in a history that never recorded a snapshot.
    #[error("state history is empty")]
    EmptyHistory,

    /// Inconsistent solver, grid or decomposition setup.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Malformed line in a state file.
    #[error("failed to parse {path}, line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Number of data lines differs from the grid extent the file declares.
    #[error("{path}: expected {expected} grid points, found {found}")]
    CountMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// File could not be opened, created or listed.
    #[error("i/o failure on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be decoded.
    #[error("invalid configuration file: {0}")]
    Config(String),
}

impl PendulumError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(PendulumError::EmptyHistory.to_string(), "state history is empty");

        let error = PendulumError::configuration("integration step must be positive");
        assert_eq!(
            error.to_string(),
            "invalid configuration: integration step must be positive"
        );

        let error = PendulumError::CountMismatch {
            path: PathBuf::from("State_1.txt"),
            expected: 4,
            found: 3,
        };
        assert_eq!(error.to_string(), "State_1.txt: expected 4 grid points, found 3");
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error;

        let error = PendulumError::io(
            "missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(error.source().is_some());
    }
}

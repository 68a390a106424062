//! Run configuration files
//!
//! A [`SimulationConfig`] describes a complete headless run and is read from
//! TOML. Every key is optional; missing keys take the defaults below.
//!
//! ```toml
//! [grid]
//! size_x = 256
//! size_y = 256
//!
//! [grid.bounds]
//! phi_1_min = -3.141592653589793
//! phi_1_max = 3.141592653589793
//! phi_2_min = -3.141592653589793
//! phi_2_max = 3.141592653589793
//!
//! [grid.parameters]
//! mass_1 = 1.0
//! mass_2 = 1.0
//! length_1 = 1.0
//! length_2 = 1.0
//!
//! [run]
//! max_time = 10.0
//! step_count = 100        # coarse steps, Δt = max_time / step_count
//! integration_step = 0.01 # sub-step h
//! method = "rk4"          # euler | rk4 | merson
//! # workers = 8           # default: available parallelism
//!
//! [output]
//! folder = "results"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{PendulumError, Result};
use crate::models::{AngleBounds, PendulumGrid, PendulumParameters};
use crate::solver::{MethodKind, SolverConfiguration};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub grid: GridConfig,
    pub run: RunConfig,
    pub output: OutputConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub size_x: usize,
    pub size_y: usize,
    pub bounds: AngleBounds,
    pub parameters: PendulumParameters,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size_x: 256,
            size_y: 256,
            bounds: AngleBounds::full_circle(),
            parameters: PendulumParameters::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub max_time: f64,
    pub step_count: usize,
    pub integration_step: f64,
    pub method: MethodKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_time: 10.0,
            step_count: 100,
            integration_step: 0.01,
            method: MethodKind::Rk4,
            workers: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub folder: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("results"),
        }
    }
}

impl SimulationConfig {
    /// Reads and validates a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PendulumError::io(path, e))?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| PendulumError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PendulumError::Config(e.to_string()))
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|e| PendulumError::io(path, e))
    }

    /// Checks every section for values a run cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.grid.size_x == 0 || self.grid.size_y == 0 {
            return Err(PendulumError::configuration(format!(
                "grid size must be at least 1 × 1, got {} × {}",
                self.grid.size_x, self.grid.size_y
            )));
        }
        self.grid.bounds.validate()?;
        self.grid.parameters.validate()?;

        if !(self.run.max_time.is_finite() && self.run.max_time > 0.0) {
            return Err(PendulumError::configuration(format!(
                "max_time must be finite and positive, got {}",
                self.run.max_time
            )));
        }
        if self.run.step_count == 0 {
            return Err(PendulumError::configuration("step_count must be at least 1"));
        }
        if self.run.workers == Some(0) {
            return Err(PendulumError::configuration("workers must be at least 1"));
        }
        self.solver_configuration().validate()
    }

    /// Method, Δt and h of the run
    pub fn solver_configuration(&self) -> SolverConfiguration {
        SolverConfiguration::from_step_count(
            self.run.method,
            self.run.max_time,
            self.run.step_count,
            self.run.integration_step,
        )
    }

    /// Configured worker count, or the available hardware parallelism
    pub fn worker_count(&self) -> usize {
        self.run
            .workers
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()))
    }

    /// Fresh grid at time 0
    pub fn build_grid(&self) -> Result<PendulumGrid> {
        PendulumGrid::new(
            self.grid.size_x,
            self.grid.size_y,
            self.grid.bounds,
            self.grid.parameters,
        )
    }
}

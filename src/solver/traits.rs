//! Integration method contract and solver configuration
//!
//! # Design Philosophy
//!
//! - [`IntegrationMethod`]: how ONE coarse step is advanced (sub-stepping,
//!   stage evaluations, scratch buffers)
//! - [`MethodKind`]: serialisable name of a method, used by configuration
//!   files and the command line
//! - [`SolverConfiguration`]: which method, with which coarse step `Δt` and
//!   which sub-step `h`
//!
//! The [`Solver`](crate::solver::Solver) driver combines the three and decides
//! how MANY coarse steps are taken.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PendulumError, Result};
use crate::physics::PhysicalSystem;

// =================================================================================================
// Integration Method Trait
// =================================================================================================

/// One-coarse-step advance of a [`PhysicalSystem`]
///
/// # Contract
///
/// `integrate_step(system, Δt, h)` moves the system clock from `t₀` to exactly
/// `t₀ + Δt`, committing state updates only at sub-step granularity. The
/// sub-step is `τ = min(h, t₀ + Δt − t)`, so the last one is shrunk to land on
/// the end of the coarse step.
///
/// Methods own their scratch buffers. [`setup`](Self::setup) sizes them for a
/// number of degrees of freedom; integrating a system of any other size is a
/// [`PendulumError::Configuration`] error until `setup` is called again.
///
/// Dispatch is static (`S: PhysicalSystem + ?Sized`), which keeps the
/// right-hand side inlinable for concrete systems while still accepting
/// `dyn PhysicalSystem`.
pub trait IntegrationMethod: Send {
    /// Human-readable name (used for logging)
    fn name(&self) -> &'static str;

    /// Sizes the scratch buffers for `degrees_of_freedom` components
    fn setup(&mut self, degrees_of_freedom: usize);

    /// Number of components the scratch buffers are sized for
    fn degrees_of_freedom(&self) -> usize;

    /// Advances `system` by `time_step` in sub-steps of at most `integration_step`
    ///
    /// # Errors
    ///
    /// `Configuration` when the method was set up for a different number of
    /// degrees of freedom, or when a step is zero, negative or non-finite.
    fn integrate_step<S: PhysicalSystem + ?Sized>(
        &mut self,
        system: &mut S,
        time_step: f64,
        integration_step: f64,
    ) -> Result<()>;
}

// =================================================================================================
// Method selection
// =================================================================================================

/// Available integration methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Forward Euler, first order
    Euler,
    /// Classical four-stage Runge-Kutta
    #[default]
    Rk4,
    /// Runge-Kutta-Merson (same stage weights as RK4, no error estimate)
    Merson,
}

impl MethodKind {
    pub const ALL: [MethodKind; 3] = [MethodKind::Euler, MethodKind::Rk4, MethodKind::Merson];

    /// Lower-case identifier, as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Euler => "euler",
            MethodKind::Rk4 => "rk4",
            MethodKind::Merson => "merson",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodKind {
    type Err = PendulumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euler" => Ok(MethodKind::Euler),
            "rk4" | "runge-kutta" => Ok(MethodKind::Rk4),
            "merson" => Ok(MethodKind::Merson),
            other => Err(PendulumError::configuration(format!(
                "unknown integration method '{other}' (expected euler, rk4 or merson)"
            ))),
        }
    }
}

// =================================================================================================
// Solver Configuration
// =================================================================================================

/// Relative tolerance under which a coarse-step count is considered integral
const STEP_COUNT_TOLERANCE: f64 = 1e-9;

/// Numerical parameters of a run
///
/// # Example
///
/// ```rust
/// use pendulum_rs::solver::{MethodKind, SolverConfiguration};
///
/// // 100 coarse steps over 10 s, sub-steps of 0.01 s
/// let config = SolverConfiguration::from_step_count(MethodKind::Rk4, 10.0, 100, 0.01);
/// config.validate().unwrap();
///
/// assert_eq!(config.time_step, 0.1);
/// assert_eq!(config.coarse_steps(10.0), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfiguration {
    /// Integration method
    pub method: MethodKind,

    /// Coarse step Δt, one history record per coarse step
    pub time_step: f64,

    /// Sub-step h used inside a coarse step
    pub integration_step: f64,
}

impl SolverConfiguration {
    pub fn new(method: MethodKind, time_step: f64, integration_step: f64) -> Self {
        Self {
            method,
            time_step,
            integration_step,
        }
    }

    /// Δt chosen so that `step_count` coarse steps cover `max_time`
    ///
    /// A zero `step_count` produces an infinite Δt, rejected by
    /// [`validate`](Self::validate).
    pub fn from_step_count(
        method: MethodKind,
        max_time: f64,
        step_count: usize,
        integration_step: f64,
    ) -> Self {
        Self::new(method, max_time / step_count as f64, integration_step)
    }

    /// Both steps must be finite and strictly positive
    pub fn validate(&self) -> Result<()> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(PendulumError::configuration(format!(
                "time step must be finite and positive, got {}",
                self.time_step
            )));
        }
        if !(self.integration_step.is_finite() && self.integration_step > 0.0) {
            return Err(PendulumError::configuration(format!(
                "integration step must be finite and positive, got {}",
                self.integration_step
            )));
        }
        Ok(())
    }

    /// Coarse steps needed to cover `span`
    ///
    /// `ceil(span / Δt)`, except that a ratio within a relative 1e-9 of an
    /// integer is rounded to it (`1.0 / 0.1` gives 10 steps, not 11). Zero
    /// for a non-positive or NaN span.
    pub fn coarse_steps(&self, span: f64) -> usize {
        if !(span > 0.0) {
            return 0;
        }

        let ratio = span / self.time_step;
        let nearest = ratio.round();
        let steps = if (ratio - nearest).abs() <= STEP_COUNT_TOLERANCE * nearest.max(1.0) {
            nearest
        } else {
            ratio.ceil()
        };
        steps as usize
    }
}

impl Default for SolverConfiguration {
    /// RK4, Δt = 0.1, h = 0.01 (100 coarse steps over 10 s)
    fn default() -> Self {
        Self::new(MethodKind::Rk4, 0.1, 0.01)
    }
}

// =================================================================================================
// Tests
// =================================================================================================

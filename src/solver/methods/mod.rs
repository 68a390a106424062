//! Explicit integration methods
//!
//! This module contains concrete implementations of the
//! [`IntegrationMethod`](crate::solver::IntegrationMethod) trait.
//!
//! # Available Methods
//!
//! - **[`EulerMethod`]**: Forward Euler
//!   - Order: first-order O(h)
//!   - Cost: 1 right-hand side evaluation per sub-step
//!
//! - **[`RK4Method`]**: classical fourth-order Runge-Kutta
//!   - Order: fourth-order O(h⁴)
//!   - Cost: 4 right-hand side evaluations per sub-step
//!
//! - **[`MersonMethod`]**: Runge-Kutta-Merson as used by long unattended runs
//!   - Same stages and weights as RK4, no embedded error estimate
//!
//! [`Method`] wraps all three behind one type so that the method can be picked
//! at runtime (configuration file, command line) without boxing.
//!
//! # Sub-stepping
//!
//! Every method advances a coarse step Δt through fixed sub-steps
//! `τ = min(h, t₀ + Δt − t)`. A remainder smaller than `1e-12 · max(1, |t₀ + Δt|)`
//! counts as zero, and the clock is finally set onto `t₀ + Δt` exactly, so
//! every band of a decomposed grid lands on bit-identical record times.
//!
//! # Example
//!
//! ```rust
//! use pendulum_rs::models::{AngleBounds, PendulumGrid, PendulumParameters};
//! use pendulum_rs::physics::PhysicalSystem;
//! use pendulum_rs::solver::{IntegrationMethod, Method, MethodKind};
//!
//! let mut grid = PendulumGrid::new(2, 2, AngleBounds::full_circle(), PendulumParameters::default())?;
//!
//! let mut method = Method::from(MethodKind::Rk4);
//! method.setup(grid.degrees_of_freedom());
//! method.integrate_step(&mut grid, 0.1, 0.01)?;
//!
//! assert!((grid.time() - 0.1).abs() < 1e-15);
//! # Ok::<(), pendulum_rs::PendulumError>(())
//! ```

mod euler;
mod merson;
mod rk4;

pub use euler::EulerMethod;
pub use merson::MersonMethod;
pub use rk4::RK4Method;

use crate::error::{PendulumError, Result};
use crate::physics::PhysicalSystem;
use crate::solver::{IntegrationMethod, MethodKind};

// =================================================================================================
// Runtime-selected method
// =================================================================================================

/// Any of the built-in methods
#[derive(Debug, Clone)]
pub enum Method {
    Euler(EulerMethod),
    RungeKutta4(RK4Method),
    Merson(MersonMethod),
}

impl Method {
    /// Which method this is
    pub fn kind(&self) -> MethodKind {
        match self {
            Method::Euler(_) => MethodKind::Euler,
            Method::RungeKutta4(_) => MethodKind::Rk4,
            Method::Merson(_) => MethodKind::Merson,
        }
    }
}

impl From<MethodKind> for Method {
    fn from(kind: MethodKind) -> Self {
        match kind {
            MethodKind::Euler => Method::Euler(EulerMethod::new()),
            MethodKind::Rk4 => Method::RungeKutta4(RK4Method::new()),
            MethodKind::Merson => Method::Merson(MersonMethod::new()),
        }
    }
}

impl IntegrationMethod for Method {
    fn name(&self) -> &'static str {
        match self {
            Method::Euler(method) => method.name(),
            Method::RungeKutta4(method) => method.name(),
            Method::Merson(method) => method.name(),
        }
    }

    fn setup(&mut self, degrees_of_freedom: usize) {
        match self {
            Method::Euler(method) => method.setup(degrees_of_freedom),
            Method::RungeKutta4(method) => method.setup(degrees_of_freedom),
            Method::Merson(method) => method.setup(degrees_of_freedom),
        }
    }

    fn degrees_of_freedom(&self) -> usize {
        match self {
            Method::Euler(method) => method.degrees_of_freedom(),
            Method::RungeKutta4(method) => method.degrees_of_freedom(),
            Method::Merson(method) => method.degrees_of_freedom(),
        }
    }

    fn integrate_step<S: PhysicalSystem + ?Sized>(
        &mut self,
        system: &mut S,
        time_step: f64,
        integration_step: f64,
    ) -> Result<()> {
        match self {
            Method::Euler(method) => method.integrate_step(system, time_step, integration_step),
            Method::RungeKutta4(method) => {
                method.integrate_step(system, time_step, integration_step)
            }
            Method::Merson(method) => method.integrate_step(system, time_step, integration_step),
        }
    }
}

// =================================================================================================
// Shared helpers
// =================================================================================================

/// Rejects a system/step combination the method cannot integrate
pub(crate) fn check_step<S: PhysicalSystem + ?Sized>(
    method_dof: usize,
    system: &S,
    time_step: f64,
    integration_step: f64,
) -> Result<()> {
    let system_dof = system.degrees_of_freedom();
    if method_dof != system_dof {
        return Err(PendulumError::configuration(format!(
            "method scratch buffers hold {method_dof} degrees of freedom, system '{}' has {system_dof}",
            system.name()
        )));
    }
    if !(integration_step.is_finite() && integration_step > 0.0) {
        return Err(PendulumError::configuration(format!(
            "integration step must be finite and positive, got {integration_step}"
        )));
    }
    if !(time_step.is_finite() && time_step >= 0.0) {
        return Err(PendulumError::configuration(format!(
            "time step must be finite and non-negative, got {time_step}"
        )));
    }
    Ok(())
}

/// Calls `sub_step(system, τ)` for each sub-step of a coarse step
///
/// `sub_step` updates the state only; the clock is advanced here, and set
/// onto `t₀ + time_step` after the last sub-step.
pub(crate) fn for_each_sub_step<S, F>(
    system: &mut S,
    time_step: f64,
    integration_step: f64,
    mut sub_step: F,
) where
    S: PhysicalSystem + ?Sized,
    F: FnMut(&mut S, f64),
{
    let end = system.time() + time_step;
    let negligible = 1e-12 * end.abs().max(1.0);

    loop {
        let remaining = end - system.time();
        if remaining <= negligible {
            break;
        }
        let tau = integration_step.min(remaining);
        sub_step(system, tau);
        system.advance_time(tau);
    }

    let drift = end - system.time();
    if drift != 0.0 {
        system.advance_time(drift);
    }
}

// =================================================================================================
// Test systems
// =================================================================================================


// =================================================================================================
// Tests
// =================================================================================================

//! Forward Euler method
//!
//! # Mathematical Background
//!
//! The simplest explicit scheme for dy/dt = f(t, y):
//!
//! ```text
//! y_{n+1} = y_n + τ · f(t_n, y_n)
//! ```
//!
//! # Characteristics
//!
//! - **Order**: first-order accurate (global error ~ O(h))
//! - **Stability**: conditionally stable, energy drifts upward on oscillators
//! - **Complexity**: 1 right-hand side evaluation per sub-step
//! - **Memory**: one scratch vector
//!
//! Mostly useful as a cheap reference when comparing methods; a double
//! pendulum integrated with Euler gains energy visibly within a few periods.

use nalgebra::DVector;

use crate::error::Result;
use crate::physics::PhysicalSystem;
use crate::solver::IntegrationMethod;
use crate::solver::methods::{check_step, for_each_sub_step};

/// Forward Euler with a reusable derivative buffer
#[derive(Debug, Clone)]
pub struct EulerMethod {
    rhs: DVector<f64>,
}

impl EulerMethod {
    /// Method with empty scratch buffers; call [`setup`](IntegrationMethod::setup) before use
    pub fn new() -> Self {
        Self {
            rhs: DVector::zeros(0),
        }
    }
}

impl Default for EulerMethod {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrationMethod for EulerMethod {
    fn name(&self) -> &'static str {
        "Forward Euler"
    }

    fn setup(&mut self, degrees_of_freedom: usize) {
        self.rhs = DVector::zeros(degrees_of_freedom);
    }

    fn degrees_of_freedom(&self) -> usize {
        self.rhs.len()
    }

    fn integrate_step<S: PhysicalSystem + ?Sized>(
        &mut self,
        system: &mut S,
        time_step: f64,
        integration_step: f64,
    ) -> Result<()> {
        check_step(self.rhs.len(), system, time_step, integration_step)?;

        let rhs = &mut self.rhs;
        for_each_sub_step(system, time_step, integration_step, |system, tau| {
            system.derivative(system.time(), system.state(), rhs.as_mut_slice());
            for (y, k) in system.state_mut().iter_mut().zip(rhs.iter()) {
                *y += tau * k;
            }
        });
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================

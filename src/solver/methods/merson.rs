//! Runge-Kutta-Merson method
//!
//! The method used by long unattended runs. Its stages and weights are those
//! of the classical scheme in [`rk4`](super::rk4): four evaluations at
//! offsets `0, τ/2, τ/2, τ` combined as `τ/6 · (k₁ + 2k₂ + 2k₃ + k₄)`.
//!
//! No fifth stage and no local error estimate are computed, so the step size
//! stays the fixed `h` of the configuration. Results are bit-identical to
//! [`RK4Method`](super::RK4Method) for the same steps.

use crate::error::Result;
use crate::physics::PhysicalSystem;
use crate::solver::IntegrationMethod;
use crate::solver::methods::rk4::RungeKuttaStages;
use crate::solver::methods::{check_step, for_each_sub_step};

/// Runge-Kutta-Merson with fixed sub-steps
#[derive(Debug, Clone)]
pub struct MersonMethod {
    stages: RungeKuttaStages,
}

impl MersonMethod {
    pub fn new() -> Self {
        Self {
            stages: RungeKuttaStages::new(),
        }
    }
}

impl Default for MersonMethod {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrationMethod for MersonMethod {
    fn name(&self) -> &'static str {
        "Runge-Kutta-Merson"
    }

    fn setup(&mut self, degrees_of_freedom: usize) {
        self.stages = RungeKuttaStages::with_size(degrees_of_freedom);
    }

    fn degrees_of_freedom(&self) -> usize {
        self.stages.len()
    }

    fn integrate_step<S: PhysicalSystem + ?Sized>(
        &mut self,
        system: &mut S,
        time_step: f64,
        integration_step: f64,
    ) -> Result<()> {
        check_step(self.stages.len(), system, time_step, integration_step)?;

        let stages = &mut self.stages;
        for_each_sub_step(system, time_step, integration_step, |system, tau| {
            stages.advance(system, tau)
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::methods::RK4Method;
    use crate::solver::methods::test_systems::ExponentialDecay;

    #[test]
    fn test_merson_matches_rk4() {
        let mut merson_system = ExponentialDecay::new(3, 0.7);
        let mut rk4_system = ExponentialDecay::new(3, 0.7);

        let mut merson = MersonMethod::new();
        let mut rk4 = RK4Method::new();
        merson.setup(3);
        rk4.setup(3);

        for _ in 0..5 {
            merson.integrate_step(&mut merson_system, 0.25, 0.03).unwrap();
            rk4.integrate_step(&mut rk4_system, 0.25, 0.03).unwrap();
        }

        assert_eq!(merson_system.state, rk4_system.state);
        assert_eq!(merson_system.time, rk4_system.time);
        assert_eq!(merson_system.evaluations.get(), rk4_system.evaluations.get());
    }
}

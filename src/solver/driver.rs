//! Solver driver
//!
//! A [`Solver`] repeats coarse steps of an [`IntegrationMethod`] until a target
//! time is reached, recording the system after each one.
//!
//! # Algorithm
//!
//! ```text
//! steps = coarse_steps(time_max − t₀)
//! record()                                  ← initial state
//! for k in 0..steps:
//!     if cancelled: stop                    ← checked once per coarse step
//!     integrate_step(Δt, h)
//!     record()
//!     progress ← (k + 1) / steps
//! ```
//!
//! A full run records `steps + 1` snapshots. Cancellation is a normal end of
//! the run, reported through [`SolveSummary::cancelled`], never as an error.
//!
//! # Example
//!
//! ```rust
//! use pendulum_rs::models::{AngleBounds, PendulumGrid, PendulumParameters};
//! use pendulum_rs::solver::{MethodKind, Solver, SolverConfiguration};
//!
//! let mut grid = PendulumGrid::new(2, 2, AngleBounds::full_circle(), PendulumParameters::default())?;
//! let config = SolverConfiguration::new(MethodKind::Rk4, 0.5, 0.01);
//!
//! let mut solver = Solver::from_configuration(&grid, config)?;
//! let summary = solver.solve(&mut grid, 1.0)?;
//!
//! assert_eq!(summary.steps_completed, 2);
//! assert_eq!(grid.history().len(), 3);
//! # Ok::<(), pendulum_rs::PendulumError>(())
//! ```

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::Result;
use crate::physics::PhysicalSystem;
use crate::solver::methods::Method;
use crate::solver::{CancellationToken, IntegrationMethod, ProgressSlot, SolverConfiguration};

// =================================================================================================
// Summary
// =================================================================================================

/// Outcome of one [`Solver::solve`] call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveSummary {
    /// Coarse steps needed to reach the target time
    pub steps_planned: usize,
    /// Coarse steps actually taken
    pub steps_completed: usize,
    /// Whether the run stopped on a cancellation request
    pub cancelled: bool,
    /// System time when the run ended
    pub final_time: f64,
}

impl SolveSummary {
    /// Number of snapshots the run recorded (initial state included)
    pub fn records(&self) -> usize {
        self.steps_completed + 1
    }
}

// =================================================================================================
// Solver
// =================================================================================================

/// Drives an integration method over many coarse steps
///
/// Progress reporting and cancellation are optional. Without them a solver
/// behaves identically, minus the observable side effects.
#[derive(Debug, Clone)]
pub struct Solver<M: IntegrationMethod = Method> {
    method: M,
    configuration: SolverConfiguration,
    progress: Option<ProgressSlot>,
    cancellation: Option<CancellationToken>,
}

impl Solver<Method> {
    /// Solver using the method named by `configuration`
    pub fn from_configuration<S: PhysicalSystem + ?Sized>(
        system: &S,
        configuration: SolverConfiguration,
    ) -> Result<Self> {
        Self::new(system, Method::from(configuration.method), configuration)
    }
}

impl<M: IntegrationMethod> Solver<M> {
    /// Binds `method` to `system`'s size
    ///
    /// # Errors
    ///
    /// `Configuration` when `configuration` does not validate.
    pub fn new<S: PhysicalSystem + ?Sized>(
        system: &S,
        mut method: M,
        configuration: SolverConfiguration,
    ) -> Result<Self> {
        configuration.validate()?;
        method.setup(system.degrees_of_freedom());

        Ok(Self {
            method,
            configuration,
            progress: None,
            cancellation: None,
        })
    }

    /// Reports progress into `slot`
    pub fn with_progress(mut self, slot: ProgressSlot) -> Self {
        self.progress = Some(slot);
        self
    }

    /// Stops at the first coarse step after `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn configuration(&self) -> &SolverConfiguration {
        &self.configuration
    }

    pub fn method(&self) -> &M {
        &self.method
    }

    /// Re-sizes the method's scratch buffers for a system of another size
    pub fn rebind<S: PhysicalSystem + ?Sized>(&mut self, system: &S) {
        self.method.setup(system.degrees_of_freedom());
    }

    /// Integrates `system` from its current time up to `time_max`
    ///
    /// # Errors
    ///
    /// `Configuration` when `system` does not have the size the solver was
    /// bound to. Snapshots recorded before the error stay in the history.
    pub fn solve<S: PhysicalSystem + ?Sized>(
        &mut self,
        system: &mut S,
        time_max: f64,
    ) -> Result<SolveSummary> {
        let SolverConfiguration {
            time_step,
            integration_step,
            ..
        } = self.configuration;
        let steps = self.configuration.coarse_steps(time_max - system.time());

        info!(
            "{}: {} coarse steps of {} from t = {} with {} (h = {})",
            system.name(),
            steps,
            time_step,
            system.time(),
            self.method.name(),
            integration_step
        );

        system.record();
        let mut non_finite_reported = report_non_finite(system, false);

        let started = Instant::now();
        let mut completed = 0;
        let mut cancelled = false;

        for k in 0..steps {
            if self.is_cancelled() {
                warn!(
                    "{}: cancelled after {} of {} coarse steps",
                    system.name(),
                    k,
                    steps
                );
                cancelled = true;
                break;
            }

            self.method
                .integrate_step(system, time_step, integration_step)?;
            system.record();
            completed = k + 1;

            if let Some(slot) = &self.progress {
                slot.set((completed as f32 / steps as f32).min(1.0));
            }
            non_finite_reported = report_non_finite(system, non_finite_reported);

            let elapsed = started.elapsed();
            debug!(
                "{}: step {}/{} t = {:.6}, elapsed {:.2?}, remaining ~{:.2?}",
                system.name(),
                completed,
                steps,
                system.time(),
                elapsed,
                estimate_remaining(elapsed, completed, steps)
            );
        }

        if !cancelled && let Some(slot) = &self.progress {
            slot.set(1.0);
        }

        info!(
            "{}: finished at t = {} after {} steps in {:.2?}",
            system.name(),
            system.time(),
            completed,
            started.elapsed()
        );

        Ok(SolveSummary {
            steps_planned: steps,
            steps_completed: completed,
            cancelled,
            final_time: system.time(),
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Time still needed for `total - done` steps at the average pace so far
fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Duration {
    if done == 0 {
        return Duration::ZERO;
    }
    elapsed.mul_f64((total - done) as f64 / done as f64)
}

/// Warns once about NaN/Inf in the state; returns whether a warning was issued so far
fn report_non_finite<S: PhysicalSystem + ?Sized>(system: &S, already_reported: bool) -> bool {
    if already_reported {
        return true;
    }
    match system.state().iter().position(|x| !x.is_finite()) {
        Some(index) => {
            warn!(
                "{}: non-finite value at component {} (t = {}); the equations may be singular for these parameters",
                system.name(),
                index,
                system.time()
            );
            true
        }
        None => false,
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PendulumError;
    use crate::solver::MethodKind;
    use crate::solver::methods::test_systems::ExponentialDecay;
    use approx::assert_relative_eq;

    fn config(time_step: f64) -> SolverConfiguration {
        SolverConfiguration::new(MethodKind::Rk4, time_step, 0.01)
    }

    #[test]
    fn test_solve_records_every_coarse_step() {
        let mut system = ExponentialDecay::new(2, 1.0);
        let mut solver = Solver::from_configuration(&system, config(0.1)).unwrap();

        let summary = solver.solve(&mut system, 1.0).unwrap();

        assert_eq!(summary.steps_planned, 10);
        assert_eq!(summary.steps_completed, 10);
        assert!(!summary.cancelled);
        assert_eq!(summary.records(), 11);
        assert_eq!(system.records.len(), 11);

        for (k, (time, _)) in system.records.iter().enumerate() {
            assert_relative_eq!(*time, k as f64 * 0.1, epsilon = 1e-12);
        }
        assert_relative_eq!(system.state[0], (-1.0_f64).exp(), epsilon = 1e-9);
    }

    #[test]
    fn test_solve_rounds_partial_step_up() {
        let mut system = ExponentialDecay::new(1, 1.0);
        let mut solver = Solver::from_configuration(&system, config(0.4)).unwrap();

        let summary = solver.solve(&mut system, 1.0).unwrap();
        assert_eq!(summary.steps_planned, 3);
        assert_relative_eq!(summary.final_time, 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_target_in_the_past_records_initial_only() {
        let mut system = ExponentialDecay::new(1, 1.0);
        system.time = 5.0;
        let mut solver = Solver::from_configuration(&system, config(0.1)).unwrap();

        let summary = solver.solve(&mut system, 1.0).unwrap();
        assert_eq!(summary.steps_planned, 0);
        assert_eq!(system.records.len(), 1);
        assert_eq!(system.state, vec![1.0]);
    }

    #[test]
    fn test_progress_reaches_one() {
        let mut system = ExponentialDecay::new(1, 1.0);
        let slot = ProgressSlot::new();
        let mut solver = Solver::from_configuration(&system, config(0.25))
            .unwrap()
            .with_progress(slot.clone());

        solver.solve(&mut system, 1.0).unwrap();
        assert_eq!(slot.get(), 1.0);
    }

    #[test]
    fn test_cancelled_before_start() {
        let mut system = ExponentialDecay::new(1, 1.0);
        let token = CancellationToken::new();
        let slot = ProgressSlot::new();
        token.cancel();

        let mut solver = Solver::from_configuration(&system, config(0.1))
            .unwrap()
            .with_progress(slot.clone())
            .with_cancellation(token);

        let summary = solver.solve(&mut system, 1.0).unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.steps_completed, 0);
        assert_eq!(system.records.len(), 1);
        assert_eq!(system.time, 0.0);
        assert_eq!(slot.get(), 0.0);
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let system = ExponentialDecay::new(1, 1.0);
        let result = Solver::from_configuration(
            &system,
            SolverConfiguration::new(MethodKind::Euler, 0.1, 0.0),
        );
        assert!(matches!(result, Err(PendulumError::Configuration(_))));
    }

    #[test]
    fn test_size_change_requires_rebind() {
        let small = ExponentialDecay::new(1, 1.0);
        let mut large = ExponentialDecay::new(3, 1.0);
        let mut solver = Solver::from_configuration(&small, config(0.1)).unwrap();

        assert!(solver.solve(&mut large, 0.5).is_err());
        // The initial record happened before the size check
        assert_eq!(large.records.len(), 1);

        solver.rebind(&large);
        assert!(solver.solve(&mut large, 0.5).is_ok());
    }

    #[test]
    fn test_estimate_remaining() {
        let elapsed = Duration::from_secs(2);
        assert_eq!(estimate_remaining(elapsed, 0, 10), Duration::ZERO);
        assert_eq!(estimate_remaining(elapsed, 2, 10), Duration::from_secs(8));
        assert_eq!(estimate_remaining(elapsed, 10, 10), Duration::ZERO);
    }

    #[test]
    fn test_non_finite_reported_once() {
        let mut system = ExponentialDecay::new(2, 1.0);
        assert!(!report_non_finite(&system, false));

        system.state[1] = f64::NAN;
        assert!(report_non_finite(&system, false));
        assert!(report_non_finite(&system, true));
    }
}

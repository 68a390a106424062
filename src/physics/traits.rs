//! Physical system contract
//!
//! This module defines the single capability every simulated system offers
//! to the integration engine:
//! - produce the time derivative of a state
//! - set its initial conditions
//! - expose its current state and simulation time
//! - record a snapshot of itself
//!
//! The state is exposed as a slice so that no caller can resize it: the
//! degrees of freedom of a system are fixed when it is constructed.

// =================================================================================================
// Physical System Trait
// =================================================================================================

/// Trait for time-dependent physical systems
///
/// # Responsibility
///
/// Provides the right-hand side f(y) of dy/dt = f(y) together with the state
/// y it applies to. Does NOT integrate (that's the job of the
/// [`IntegrationMethod`](crate::solver::IntegrationMethod)).
///
/// # Dispatch
///
/// The trait is object safe. The solver is generic over `S: PhysicalSystem +
/// ?Sized`, so both static dispatch (`Solver` over `PendulumGrid`) and
/// `&mut dyn PhysicalSystem` work with the same code.
///
/// # Example
///
/// ```rust
/// use pendulum_rs::physics::PhysicalSystem;
///
/// /// dy/dt = -y
/// struct Decay {
///     time: f64,
///     state: Vec<f64>,
///     recorded: usize,
/// }
///
/// impl PhysicalSystem for Decay {
///     fn degrees_of_freedom(&self) -> usize { self.state.len() }
///     fn derivative(&self, _time: f64, state: &[f64], rhs: &mut [f64]) {
///         for (r, y) in rhs.iter_mut().zip(state) { *r = -y; }
///     }
///     fn set_initial_conditions(&mut self, time: f64) {
///         self.time = time;
///         self.state.fill(1.0);
///     }
///     fn state(&self) -> &[f64] { &self.state }
///     fn state_mut(&mut self) -> &mut [f64] { &mut self.state }
///     fn time(&self) -> f64 { self.time }
///     fn advance_time(&mut self, dt: f64) { self.time += dt; }
///     fn record(&mut self) { self.recorded += 1; }
///     fn name(&self) -> &str { "Decay" }
/// }
/// ```
pub trait PhysicalSystem: Send {
    /// Number of scalar state components
    ///
    /// Used by integration methods to size their scratch buffers.
    fn degrees_of_freedom(&self) -> usize;

    /// Evaluates the right-hand side at `state`
    ///
    /// # Arguments
    /// * `time` - Simulation time of the evaluation (autonomous systems ignore it)
    /// * `state` - State to evaluate at; may differ from [`state()`](Self::state)
    ///   (Runge-Kutta stages pass intermediate states)
    /// * `rhs` - Output buffer, same length as `state`
    fn derivative(&self, time: f64, state: &[f64], rhs: &mut [f64]);

    /// Overwrites the current state with the system's initial conditions
    fn set_initial_conditions(&mut self, time: f64);

    /// Current state
    fn state(&self) -> &[f64];

    /// Mutable access to the current state (fixed length)
    fn state_mut(&mut self) -> &mut [f64];

    /// Current simulation time
    fn time(&self) -> f64;

    /// Moves the simulation clock forward by `dt`
    fn advance_time(&mut self, dt: f64);

    /// Appends the current state to the system's history under the current time
    fn record(&mut self);

    /// Name of the system (used for display and logging)
    fn name(&self) -> &str;
}

// =================================================================================================
// Tests
// =================================================================================================

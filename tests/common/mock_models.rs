//! Mock physical systems for testing
//!
//! These systems have known analytical solutions, making them
//! ideal for validating integration accuracy.

use nalgebra::DVector;
use pendulum_rs::physics::{PhysicalSystem, StateHistory};

// =================================================================================================
// Exponential Decay: dy/dt = -k*y
// =================================================================================================

/// Exponential decay: dy/dt = -k*y, y(0) = 1
///
/// Analytical solution: y(t) = exp(-k*t)
pub struct ExponentialDecay {
    pub decay_rate: f64,
    pub time: f64,
    pub state: Vec<f64>,
    pub history: StateHistory,
}

impl ExponentialDecay {
    pub fn new(points: usize, decay_rate: f64) -> Self {
        Self {
            decay_rate,
            time: 0.0,
            state: vec![1.0; points],
            history: StateHistory::new(),
        }
    }

    /// Compute analytical solution at time t
    pub fn analytical_solution(&self, t: f64) -> f64 {
        (-self.decay_rate * t).exp()
    }
}

impl PhysicalSystem for ExponentialDecay {
    fn degrees_of_freedom(&self) -> usize {
        self.state.len()
    }

    fn derivative(&self, _time: f64, state: &[f64], rhs: &mut [f64]) {
        for (r, y) in rhs.iter_mut().zip(state) {
            *r = -self.decay_rate * y;
        }
    }

    fn set_initial_conditions(&mut self, time: f64) {
        self.time = time;
        self.state.fill(1.0);
    }

    fn state(&self) -> &[f64] {
        &self.state
    }

    fn state_mut(&mut self) -> &mut [f64] {
        &mut self.state
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }

    fn record(&mut self) {
        self.history.record(self.time, DVector::from_column_slice(&self.state));
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Harmonic Oscillator: x'' = -ω²x
// =================================================================================================

/// Harmonic oscillator as a first-order system `[x, v]`, x(0) = 1, v(0) = 0
///
/// Analytical solution: x(t) = cos(ωt), v(t) = -ω·sin(ωt)
pub struct HarmonicOscillator {
    pub omega: f64,
    pub time: f64,
    pub state: Vec<f64>,
    pub history: StateHistory,
}

impl HarmonicOscillator {
    pub fn new(omega: f64) -> Self {
        Self {
            omega,
            time: 0.0,
            state: vec![1.0, 0.0],
            history: StateHistory::new(),
        }
    }

    pub fn analytical_solution(&self, t: f64) -> (f64, f64) {
        ((self.omega * t).cos(), -self.omega * (self.omega * t).sin())
    }
}

impl PhysicalSystem for HarmonicOscillator {
    fn degrees_of_freedom(&self) -> usize {
        2
    }

    fn derivative(&self, _time: f64, state: &[f64], rhs: &mut [f64]) {
        rhs[0] = state[1];
        rhs[1] = -self.omega * self.omega * state[0];
    }

    fn set_initial_conditions(&mut self, time: f64) {
        self.time = time;
        self.state = vec![1.0, 0.0];
    }

    fn state(&self) -> &[f64] {
        &self.state
    }

    fn state_mut(&mut self) -> &mut [f64] {
        &mut self.state
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }

    fn record(&mut self) {
        self.history.record(self.time, DVector::from_column_slice(&self.state));
    }

    fn name(&self) -> &str {
        "Harmonic Oscillator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_decay_analytical() {
        let model = ExponentialDecay::new(1, 0.5);
        assert!((model.analytical_solution(0.0) - 1.0).abs() < 1e-15);
        assert!((model.analytical_solution(2.0) - (-1.0_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_harmonic_oscillator_analytical() {
        let model = HarmonicOscillator::new(2.0);
        let (x, v) = model.analytical_solution(0.0);
        assert_eq!((x, v), (1.0, 0.0));
    }
}

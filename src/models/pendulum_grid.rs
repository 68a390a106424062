//! Rectangular grid of independent double pendulums
//!
//! # Mathematical Background
//!
//! Every grid point (i, j) carries one planar double pendulum: an inner link
//! of mass m₁ and length l₁ hanging from a fixed pivot, an outer link of mass
//! m₂ and length l₂ hanging from the first bob. With φ₁, φ₂ the angles from
//! the vertical and ω₁, ω₂ their angular velocities, the Lagrangian equations
//! read, per cell,
//!
//! ```text
//! a = -(m₁+m₂)·g·l₁·sin φ₁ - m₂·l₁·l₂·ω₂²·sin(φ₁-φ₂)
//! b = (m₁+m₂)·l₁²
//! c = m₂·l₁·l₂·cos(φ₁-φ₂)
//! d = -m₂·g·l₂·sin φ₂ + m₂·l₁·l₂·ω₁²·sin(φ₁-φ₂)
//! e = m₂·l₂²
//! f = m₂·l₁·l₂·cos(φ₁-φ₂)
//!
//! dφ₁/dt = ω₁
//! dφ₂/dt = ω₂
//! dω₂/dt = (d - a·f/b) / (e - c·f/b)
//! dω₁/dt = a/b - (c/b)·dω₂/dt
//! ```
//!
//! There is no coupling between cells: the grid is a parameter sweep over
//! initial angles, which is what makes row-wise domain decomposition exact.
//!
//! The denominator `e - c·f/b` is not guarded. Degenerate parameters (for
//! instance m₂ = 0) produce NaN/Inf, which propagate into the state like any
//! other floating-point result.
//!
//! # Memory Layout
//!
//! One flat buffer of `size_x · size_y · 4` doubles, cell (i, j) starting at
//! `(j·size_x + i)·4`, components ordered `{φ₁, φ₂, ω₁, ω₂}`. Rows are
//! contiguous, so a band of rows is a contiguous slice of the buffer.
//!
//! # Initial Conditions
//!
//! ```text
//! φ₁(i, j) = φ₁_min + (i+1)·(φ₁_max - φ₁_min)/(size_x+1)
//! φ₂(i, j) = φ₂_min + (j+1)·(φ₂_max - φ₂_min)/(size_y+1)
//! ω₁ = ω₂ = 0
//! ```
//!
//! The `(i+1)/(size_x+1)` spacing keeps the bounds themselves off the grid.
//!
//! # Example Usage
//!
//! ```rust
//! use pendulum_rs::models::{AngleBounds, PendulumGrid, PendulumParameters};
//! use pendulum_rs::physics::PhysicalSystem;
//!
//! let grid = PendulumGrid::new(
//!     4, 3,
//!     AngleBounds::full_circle(),
//!     PendulumParameters::default(),
//! ).unwrap();
//!
//! assert_eq!(grid.degrees_of_freedom(), 4 * 3 * 4);
//! assert_eq!(grid.time(), 0.0);
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::ops::Range;

use nalgebra::DVector;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{PendulumError, Result};
use crate::physics::{PhaseQuadrant, PhysicalSystem, StateHistory};

/// Gravitational acceleration [m/s²]
pub const GRAVITY: f64 = 9.81;

/// Number of state components per grid point
pub const COMPONENTS: usize = 4;

// =================================================================================================
// Cell components
// =================================================================================================

/// One of the four state components of a grid point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// Inner link angle φ₁
    Phi1,
    /// Outer link angle φ₂
    Phi2,
    /// Inner link angular velocity ω₁
    Omega1,
    /// Outer link angular velocity ω₂
    Omega2,
}

impl Component {
    /// All components in buffer order
    pub const ALL: [Component; COMPONENTS] = [
        Component::Phi1,
        Component::Phi2,
        Component::Omega1,
        Component::Omega2,
    ];

    /// Offset of the component inside a cell
    pub fn offset(self) -> usize {
        match self {
            Component::Phi1 => 0,
            Component::Phi2 => 1,
            Component::Omega1 => 2,
            Component::Omega2 => 3,
        }
    }
}

// =================================================================================================
// Angle bounds
// =================================================================================================

/// Ranges the initial angles are spread over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngleBounds {
    pub phi_1_min: f64,
    pub phi_1_max: f64,
    pub phi_2_min: f64,
    pub phi_2_max: f64,
}

impl AngleBounds {
    pub fn new(phi_1_min: f64, phi_1_max: f64, phi_2_min: f64, phi_2_max: f64) -> Self {
        Self {
            phi_1_min,
            phi_1_max,
            phi_2_min,
            phi_2_max,
        }
    }

    /// `{-π, π, -π, π}`
    pub fn full_circle() -> Self {
        Self::new(-PI, PI, -PI, PI)
    }

    /// Build from `[φ₁_min, φ₁_max, φ₂_min, φ₂_max]`
    pub fn from_array(bounds: [f64; 4]) -> Self {
        Self::new(bounds[0], bounds[1], bounds[2], bounds[3])
    }

    /// `[φ₁_min, φ₁_max, φ₂_min, φ₂_max]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.phi_1_min, self.phi_1_max, self.phi_2_min, self.phi_2_max]
    }

    /// All four bounds must be finite
    pub fn validate(&self) -> Result<()> {
        if self.to_array().iter().any(|b| !b.is_finite()) {
            return Err(PendulumError::configuration("angle bounds must be finite"));
        }
        Ok(())
    }
}

impl Default for AngleBounds {
    fn default() -> Self {
        Self::full_circle()
    }
}

// =================================================================================================
// Physical parameters
// =================================================================================================

/// Masses [kg] and lengths [m] shared by every cell of a grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumParameters {
    pub mass_1: f64,
    pub mass_2: f64,
    pub length_1: f64,
    pub length_2: f64,
}

impl PendulumParameters {
    pub fn new(mass_1: f64, mass_2: f64, length_1: f64, length_2: f64) -> Self {
        Self {
            mass_1,
            mass_2,
            length_1,
            length_2,
        }
    }

    /// Parameters must be finite and non-negative
    ///
    /// Zero values are accepted even though some of them make the equations
    /// singular; the resulting NaN/Inf are left to propagate.
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("mass_1", self.mass_1),
            ("mass_2", self.mass_2),
            ("length_1", self.length_1),
            ("length_2", self.length_2),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(PendulumError::configuration(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Right-hand side of one cell
    ///
    /// `cell` and `out` hold `{φ₁, φ₂, ω₁, ω₂}` and their time derivatives.
    #[inline]
    pub fn cell_derivative(&self, cell: &[f64], out: &mut [f64]) {
        let (phi_1, phi_2, omega_1, omega_2) = (cell[0], cell[1], cell[2], cell[3]);
        let (m1, m2, l1, l2) = (self.mass_1, self.mass_2, self.length_1, self.length_2);

        let delta = phi_1 - phi_2;
        let sin_delta = delta.sin();
        let cos_delta = delta.cos();

        let a = -(m1 + m2) * GRAVITY * l1 * phi_1.sin() - m2 * l1 * l2 * omega_2.powi(2) * sin_delta;
        let b = (m1 + m2) * l1 * l1;
        let c = m2 * l1 * l2 * cos_delta;
        let d = -m2 * GRAVITY * l2 * phi_2.sin() + m2 * l1 * l2 * omega_1.powi(2) * sin_delta;
        let e = m2 * l2 * l2;
        let f = m2 * l1 * l2 * cos_delta;

        let domega_2 = (d - a * f / b) / (e - c * f / b);

        out[0] = omega_1;
        out[1] = omega_2;
        out[2] = a / b - c / b * domega_2;
        out[3] = domega_2;
    }
}

impl Default for PendulumParameters {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }
}

// =================================================================================================
// Pendulum grid
// =================================================================================================

/// Grid of `size_x × size_y` independent double pendulums
///
/// Owns its state buffer and its [`StateHistory`]. Sub-grids produced by
/// [`extract_rows`](Self::extract_rows) own independent copies of both.
#[derive(Clone)]
pub struct PendulumGrid {
    size_x: usize,
    size_y: usize,
    parameters: PendulumParameters,
    bounds: AngleBounds,
    time: f64,
    state: DVector<f64>,
    history: StateHistory,
}

impl PendulumGrid {
    /// Fresh grid at time 0 with initial conditions applied
    ///
    /// # Errors
    ///
    /// `Configuration` when a dimension is zero, the bounds are not finite
    /// or a parameter is negative/non-finite.
    pub fn new(
        size_x: usize,
        size_y: usize,
        bounds: AngleBounds,
        parameters: PendulumParameters,
    ) -> Result<Self> {
        if size_x == 0 || size_y == 0 {
            return Err(PendulumError::configuration(format!(
                "grid size must be at least 1 × 1, got {size_x} × {size_y}"
            )));
        }
        bounds.validate()?;
        parameters.validate()?;

        let mut grid = Self {
            size_x,
            size_y,
            parameters,
            bounds,
            time: 0.0,
            state: DVector::zeros(size_x * size_y * COMPONENTS),
            history: StateHistory::new(),
        };
        grid.set_initial_conditions(0.0);
        Ok(grid)
    }

    /// Grid rebuilt from a recorded history
    ///
    /// The live state and clock are set to the latest snapshot.
    pub(crate) fn from_history(
        size_x: usize,
        size_y: usize,
        bounds: AngleBounds,
        parameters: PendulumParameters,
        history: StateHistory,
    ) -> Result<Self> {
        let dof = size_x * size_y * COMPONENTS;
        let (time, state) = match (history.last_time(), history.latest()) {
            (Some(time), Some(latest)) if latest.len() == dof => (time, latest.clone()),
            (Some(_), Some(latest)) => {
                return Err(PendulumError::configuration(format!(
                    "snapshot holds {} values, grid needs {dof}",
                    latest.len()
                )));
            }
            _ => return Err(PendulumError::EmptyHistory),
        };

        Ok(Self {
            size_x,
            size_y,
            parameters,
            bounds,
            time,
            state,
            history,
        })
    }

    // ========================================== Queries ==========================================

    /// `(size_x, size_y)`
    pub fn size(&self) -> (usize, usize) {
        (self.size_x, self.size_y)
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }

    pub fn size_y(&self) -> usize {
        self.size_y
    }

    pub fn parameters(&self) -> &PendulumParameters {
        &self.parameters
    }

    pub fn bounds(&self) -> &AngleBounds {
        &self.bounds
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Index of `component` of cell (i, j) in the state buffer
    ///
    /// Coordinates must lie inside the grid; [`value_at`](Self::value_at)
    /// is the checked accessor.
    #[inline]
    pub fn index(&self, i: usize, j: usize, component: Component) -> usize {
        debug_assert!(i < self.size_x && j < self.size_y, "cell ({i}, {j}) outside grid");
        (j * self.size_x + i) * COMPONENTS + component.offset()
    }

    /// Current value of `component` at cell (i, j)
    pub fn value(&self, i: usize, j: usize, component: Component) -> f64 {
        self.state[self.index(i, j, component)]
    }

    /// Value of `component` at cell (i, j) in the snapshot nearest to `time`
    ///
    /// # Errors
    ///
    /// `Configuration` when (i, j) lies outside the grid, `EmptyHistory`
    /// before the first record.
    pub fn value_at(&self, i: usize, j: usize, component: Component, time: f64) -> Result<f64> {
        if i >= self.size_x || j >= self.size_y {
            return Err(PendulumError::configuration(format!(
                "cell ({i}, {j}) outside the {}×{} grid",
                self.size_x, self.size_y
            )));
        }
        let snapshot = self.history.lookup(time)?;
        Ok(snapshot[self.index(i, j, component)])
    }

    pub fn phi_1_at(&self, i: usize, j: usize, time: f64) -> Result<f64> {
        self.value_at(i, j, Component::Phi1, time)
    }

    pub fn phi_2_at(&self, i: usize, j: usize, time: f64) -> Result<f64> {
        self.value_at(i, j, Component::Phi2, time)
    }

    pub fn omega_1_at(&self, i: usize, j: usize, time: f64) -> Result<f64> {
        self.value_at(i, j, Component::Omega1, time)
    }

    pub fn omega_2_at(&self, i: usize, j: usize, time: f64) -> Result<f64> {
        self.value_at(i, j, Component::Omega2, time)
    }

    /// One component over the whole grid, indexed `[j, i]`
    pub fn component_field(&self, component: Component, time: f64) -> Result<Array2<f64>> {
        let snapshot = self.history.lookup(time)?;
        Ok(Array2::from_shape_fn((self.size_y, self.size_x), |(j, i)| {
            snapshot[self.index(i, j, component)]
        }))
    }

    /// Half-turn classification of every cell, indexed `[j, i]`
    pub fn phase_map(&self, time: f64) -> Result<Array2<PhaseQuadrant>> {
        let snapshot = self.history.lookup(time)?;
        Ok(Array2::from_shape_fn((self.size_y, self.size_x), |(j, i)| {
            PhaseQuadrant::classify(
                snapshot[self.index(i, j, Component::Phi1)],
                snapshot[self.index(i, j, Component::Phi2)],
            )
        }))
    }

    // ==================================== Domain decomposition ===================================

    /// Independent copy of rows `[rows.start, rows.end)`
    ///
    /// The sub-grid keeps `size_x`, the physical parameters, the bounds and
    /// the current time of `self`; its history starts empty.
    ///
    /// # Errors
    ///
    /// `Configuration` for an empty range or one reaching past `size_y`.
    pub fn extract_rows(&self, rows: Range<usize>) -> Result<PendulumGrid> {
        if rows.start >= rows.end || rows.end > self.size_y {
            return Err(PendulumError::configuration(format!(
                "row range {}..{} is not a non-empty band of a grid with {} rows",
                rows.start, rows.end, self.size_y
            )));
        }

        let row_len = self.size_x * COMPONENTS;
        let band = &self.state.as_slice()[rows.start * row_len..rows.end * row_len];

        Ok(PendulumGrid {
            size_x: self.size_x,
            size_y: rows.len(),
            parameters: self.parameters,
            bounds: self.bounds,
            time: self.time,
            state: DVector::from_column_slice(band),
            history: StateHistory::new(),
        })
    }

    /// Copies the history and live state of `part` into rows starting at `start_y`
    ///
    /// Times not yet present in `self`'s history get a zero-filled snapshot
    /// first. The clock of `self` is set to the clock of `part`.
    ///
    /// # Errors
    ///
    /// `Configuration` when `part` has a different width or does not fit.
    pub fn merge(&mut self, part: &PendulumGrid, start_y: usize) -> Result<()> {
        if part.size_x != self.size_x || start_y + part.size_y > self.size_y {
            return Err(PendulumError::configuration(format!(
                "cannot merge a {} × {} band at row {} into a {} × {} grid",
                part.size_x, part.size_y, start_y, self.size_x, self.size_y
            )));
        }

        let dof = self.degrees_of_freedom();
        let offset = start_y * self.size_x * COMPONENTS;
        let len = part.degrees_of_freedom();

        for (time, band) in part.history.iter() {
            let snapshot = self
                .history
                .entry_or_insert_with(time, || DVector::zeros(dof));
            snapshot.as_mut_slice()[offset..offset + len].copy_from_slice(band.as_slice());
        }

        self.state.as_mut_slice()[offset..offset + len].copy_from_slice(part.state.as_slice());
        self.time = part.time;
        Ok(())
    }
}

// =================================================================================================
// PhysicalSystem implementation
// =================================================================================================

impl PhysicalSystem for PendulumGrid {
    fn degrees_of_freedom(&self) -> usize {
        self.size_x * self.size_y * COMPONENTS
    }

    /// Evaluates every cell independently
    ///
    /// Large grids are split across rayon's pool (feature `parallel`, above
    /// [`parallel_threshold()`](crate::solver::parallel_threshold)). Cells are
    /// computed with the same arithmetic on both paths.
    fn derivative(&self, _time: f64, state: &[f64], rhs: &mut [f64]) {
        debug_assert_eq!(state.len(), self.degrees_of_freedom());
        debug_assert_eq!(rhs.len(), state.len());

        let parameters = self.parameters;

        #[cfg(feature = "parallel")]
        {
            if state.len() > crate::solver::parallel_threshold() {
                use rayon::prelude::*;

                rhs.par_chunks_exact_mut(COMPONENTS)
                    .zip(state.par_chunks_exact(COMPONENTS))
                    .for_each(|(out, cell)| parameters.cell_derivative(cell, out));
                return;
            }
        }

        for (out, cell) in rhs
            .chunks_exact_mut(COMPONENTS)
            .zip(state.chunks_exact(COMPONENTS))
        {
            parameters.cell_derivative(cell, out);
        }
    }

    fn set_initial_conditions(&mut self, time: f64) {
        let AngleBounds {
            phi_1_min,
            phi_1_max,
            phi_2_min,
            phi_2_max,
        } = self.bounds;
        let step_1 = (phi_1_max - phi_1_min) / (self.size_x + 1) as f64;
        let step_2 = (phi_2_max - phi_2_min) / (self.size_y + 1) as f64;

        for j in 0..self.size_y {
            for i in 0..self.size_x {
                let base = (j * self.size_x + i) * COMPONENTS;
                self.state[base] = phi_1_min + (i + 1) as f64 * step_1;
                self.state[base + 1] = phi_2_min + (j + 1) as f64 * step_2;
                self.state[base + 2] = 0.0;
                self.state[base + 3] = 0.0;
            }
        }
        self.time = time;
    }

    fn state(&self) -> &[f64] {
        self.state.as_slice()
    }

    fn state_mut(&mut self) -> &mut [f64] {
        self.state.as_mut_slice()
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }

    fn record(&mut self) {
        self.history.record(self.time, self.state.clone());
    }

    fn name(&self) -> &str {
        "Double Pendulum Grid"
    }
}

impl fmt::Debug for PendulumGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendulumGrid")
            .field("size", &(self.size_x, self.size_y))
            .field("parameters", &self.parameters)
            .field("bounds", &self.bounds)
            .field("time", &self.time)
            .field("recorded", &self.history.len())
            .finish()
    }
}

// =================================================================================================
// Tests
// =================================================================================================

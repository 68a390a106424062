//! Physical models
//!
//! All models implement the [`PhysicalSystem`](crate::physics::PhysicalSystem)
//! trait. Models are responsible for the physics (right-hand side, initial
//! conditions, history), integration methods for the time stepping.
//!
//! # Available Models
//!
//! ## [`PendulumGrid`]: grid of double pendulums
//!
//! `size_x × size_y` independent double pendulums sharing masses and lengths,
//! whose initial angles sweep the [`AngleBounds`]. Cells do not interact, so a
//! grid can be split into row bands ([`PendulumGrid::extract_rows`]) that are
//! integrated separately and merged back ([`PendulumGrid::merge`]).

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod pendulum_grid;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use pendulum_grid::{
    AngleBounds, Component, PendulumGrid, PendulumParameters, COMPONENTS, GRAVITY,
};

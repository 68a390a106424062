//! Physical systems
//!
//! This module provides the contract every simulated system implements and
//! the containers a system uses to keep its past.
//!
//! # Core Concepts
//!
//! - **Physical System** ([`PhysicalSystem`]): right-hand side, initial
//!   conditions, current state and clock
//! - **State History** ([`StateHistory`]): time → snapshot map with
//!   nearest-time lookup
//! - **Angles** ([`normalize_angle`], [`PhaseQuadrant`]): helpers for
//!   inspecting pendulum angles
//!
//! # Architecture
//!
//! Physical systems are **separate from numerical methods**:
//! - The system provides the **equations** (physics)
//! - The integration method provides the **scheme** to advance them (numerics)
//!
//! The same system can be advanced with Euler, RK4 or Merson, and every
//! method works with any system.
//!
//! # Example
//!
//! ```rust
//! use pendulum_rs::physics::StateHistory;
//! use nalgebra::DVector;
//!
//! let mut history = StateHistory::new();
//! history.record(0.0, DVector::from_vec(vec![1.0]));
//! history.record(1.0, DVector::from_vec(vec![2.0]));
//!
//! assert_eq!(history.lookup(0.7).unwrap()[0], 2.0);
//! ```

// module declaration
pub mod angles;
pub mod history;
pub mod traits;

// re-export commonly used types for convenience
pub use angles::{normalize_angle, to_degrees, to_radians, PhaseQuadrant};
pub use history::StateHistory;
pub use traits::PhysicalSystem;

//! Common utilities for integration tests
#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::{ExponentialDecay, HarmonicOscillator};
pub use test_helpers::{
    assert_slices_close,
    relative_error,
    single_pendulum,
    solve_serial,
    test_grid,
};

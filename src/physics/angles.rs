//! Angle helpers
//!
//! Pendulum angles are unbounded while integrating (a link that flips over
//! keeps accumulating 2π). Inspection code works on the wrapped value in
//! `[0, 2π)` and on the coarse "which half-turn is each link in" picture
//! given by [`PhaseQuadrant`].

use std::f64::consts::{PI, TAU};

/// Wraps `angle` into `[0, 2π)`
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle - (angle / TAU).floor() * TAU;
    // Rounding can land exactly on 2π for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Radians to degrees
pub fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Degrees to radians
pub fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Half-turn classification of both links of a cell
///
/// After wrapping into `[0, 2π)`, an angle is *low* when it is at most π and
/// *high* otherwise. The first word refers to the inner link, the second to
/// the outer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseQuadrant {
    LowLow,
    LowHigh,
    HighLow,
    HighHigh,
}

impl PhaseQuadrant {
    /// Classify a pair of raw (unwrapped) angles
    pub fn classify(phi_1: f64, phi_2: f64) -> Self {
        let low_1 = normalize_angle(phi_1) <= PI;
        let low_2 = normalize_angle(phi_2) <= PI;

        match (low_1, low_2) {
            (true, true) => PhaseQuadrant::LowLow,
            (true, false) => PhaseQuadrant::LowHigh,
            (false, true) => PhaseQuadrant::HighLow,
            (false, false) => PhaseQuadrant::HighHigh,
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================

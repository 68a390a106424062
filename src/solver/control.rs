//! Run control shared between threads
//!
//! - [`CancellationToken`]: one flag, written by whoever wants a run to stop,
//!   read by every worker once per coarse step
//! - [`ProgressSlot`]: one fraction in `[0, 1]`, written by exactly one worker
//!
//! Both are cheap `Arc` handles over atomics. Clones observe the same value.
//! Relaxed ordering is enough: neither value publishes other memory, and a
//! worker seeing a cancellation one coarse step late is acceptable.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Cooperative cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks every holder of this token to stop at its next check
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Clears the flag so the token can be reused for another run
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

/// Fraction of a run completed by one worker
///
/// Stored as the bit pattern of an `f32` in an `AtomicU32`.
#[derive(Debug, Clone, Default)]
pub struct ProgressSlot {
    bits: Arc<AtomicU32>,
}

impl ProgressSlot {
    /// Slot starting at 0.0
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `fraction` clamped into `[0, 1]`
    pub fn set(&self, fraction: f32) {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        self.bits.store(fraction.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

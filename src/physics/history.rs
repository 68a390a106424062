//! Time-indexed state history
//!
//! A [`StateHistory`] maps simulation times to full snapshots of a state
//! buffer. Times are kept sorted; lookups return the snapshot recorded
//! nearest to the requested time.
//!
//! # Nearest-time law
//!
//! For recorded times t₁ < t₂ < t₃:
//!
//! ```text
//! query < (t₁ + t₂)/2               → snapshot at t₁
//! (t₁ + t₂)/2 ≤ query < (t₂ + t₃)/2 → snapshot at t₂
//! query ≥ (t₂ + t₃)/2               → snapshot at t₃
//! ```
//!
//! The earlier snapshot only wins when it is strictly closer, so an exact
//! tie resolves to the later one.

use nalgebra::DVector;

use crate::error::{PendulumError, Result};

/// Sorted mapping from simulation time to state snapshot
#[derive(Debug, Clone, Default)]
pub struct StateHistory {
    entries: Vec<(f64, DVector<f64>)>,
}

impl StateHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check emptiness
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores `snapshot` under `time`
    ///
    /// Recording twice at the same time replaces the earlier snapshot.
    pub fn record(&mut self, time: f64, snapshot: DVector<f64>) {
        // Forward-moving clocks append, which is the common case.
        if self.entries.last().is_none_or(|(last, _)| *last < time) {
            self.entries.push((time, snapshot));
            return;
        }

        let index = self.entries.partition_point(|(t, _)| *t < time);
        match self.entries.get_mut(index) {
            Some(entry) if entry.0 == time => entry.1 = snapshot,
            _ => self.entries.insert(index, (time, snapshot)),
        }
    }

    /// Snapshot recorded exactly at `time`, created by `init` when absent
    pub fn entry_or_insert_with<F>(&mut self, time: f64, init: F) -> &mut DVector<f64>
    where
        F: FnOnce() -> DVector<f64>,
    {
        let index = self.entries.partition_point(|(t, _)| *t < time);
        let present = matches!(self.entries.get(index), Some((t, _)) if *t == time);
        if !present {
            self.entries.insert(index, (time, init()));
        }
        &mut self.entries[index].1
    }

    /// Snapshot nearest to `time`
    ///
    /// # Errors
    ///
    /// [`PendulumError::EmptyHistory`] when nothing has been recorded.
    pub fn lookup(&self, time: f64) -> Result<&DVector<f64>> {
        self.lookup_entry(time).map(|(_, snapshot)| snapshot)
    }

    /// Recorded time and snapshot nearest to `time`
    pub fn lookup_entry(&self, time: f64) -> Result<(f64, &DVector<f64>)> {
        if self.entries.is_empty() {
            return Err(PendulumError::EmptyHistory);
        }

        let ceiling = self.entries.partition_point(|(t, _)| *t < time);

        let index = if ceiling == self.entries.len() {
            ceiling - 1
        } else if ceiling == 0 {
            0
        } else {
            let floor_time = self.entries[ceiling - 1].0;
            let ceiling_time = self.entries[ceiling].0;
            if (floor_time - time).abs() < (ceiling_time - time).abs() {
                ceiling - 1
            } else {
                ceiling
            }
        };

        let (t, snapshot) = &self.entries[index];
        Ok((*t, snapshot))
    }

    /// Earliest recorded time
    pub fn first_time(&self) -> Option<f64> {
        self.entries.first().map(|(t, _)| *t)
    }

    /// Latest recorded time
    pub fn last_time(&self) -> Option<f64> {
        self.entries.last().map(|(t, _)| *t)
    }

    /// Latest snapshot
    pub fn latest(&self) -> Option<&DVector<f64>> {
        self.entries.last().map(|(_, snapshot)| snapshot)
    }

    /// Recorded times in increasing order
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    /// `(time, snapshot)` pairs in increasing time order
    pub fn iter(&self) -> impl Iterator<Item = (f64, &DVector<f64>)> + '_ {
        self.entries.iter().map(|(t, snapshot)| (*t, snapshot))
    }

    /// Drops every snapshot
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(value: f64) -> DVector<f64> {
        DVector::from_element(4, value)
    }

    fn three_point_history() -> StateHistory {
        let mut history = StateHistory::new();
        history.record(0.0, snapshot(0.0));
        history.record(1.0, snapshot(1.0));
        history.record(3.0, snapshot(3.0));
        history
    }

    #[test]
    fn test_empty_history_lookup_fails() {
        let history = StateHistory::new();
        assert!(history.is_empty());
        assert!(matches!(history.lookup(0.0), Err(PendulumError::EmptyHistory)));
    }

    #[test]
    fn test_lookup_before_first_returns_first() {
        let history = three_point_history();
        assert_eq!(history.lookup(-5.0).unwrap()[0], 0.0);
    }

    #[test]
    fn test_lookup_after_last_returns_last() {
        let history = three_point_history();
        assert_eq!(history.lookup(42.0).unwrap()[0], 3.0);
    }

    #[test]
    fn test_lookup_exact_hits() {
        let history = three_point_history();
        for t in [0.0, 1.0, 3.0] {
            assert_eq!(history.lookup(t).unwrap()[0], t);
        }
    }

    #[test]
    fn test_nearest_neighbor_law() {
        let history = three_point_history();

        // Between 0 and 1 the midpoint is 0.5
        assert_eq!(history.lookup(0.49).unwrap()[0], 0.0);
        assert_eq!(history.lookup(0.51).unwrap()[0], 1.0);

        // Between 1 and 3 the midpoint is 2.0
        assert_eq!(history.lookup(1.9).unwrap()[0], 1.0);
        assert_eq!(history.lookup(2.1).unwrap()[0], 3.0);
    }

    #[test]
    fn test_tie_goes_to_ceiling() {
        let history = three_point_history();
        assert_eq!(history.lookup(0.5).unwrap()[0], 1.0);
        assert_eq!(history.lookup(2.0).unwrap()[0], 3.0);
    }

    #[test]
    fn test_lookup_entry_reports_time() {
        let history = three_point_history();
        let (t, _) = history.lookup_entry(2.6).unwrap();
        assert_eq!(t, 3.0);
    }

    #[test]
    fn test_record_same_time_replaces() {
        let mut history = three_point_history();
        history.record(1.0, snapshot(10.0));

        assert_eq!(history.len(), 3);
        assert_eq!(history.lookup(1.0).unwrap()[0], 10.0);
    }

    #[test]
    fn test_record_out_of_order_stays_sorted() {
        let mut history = three_point_history();
        history.record(2.0, snapshot(2.0));

        let times: Vec<f64> = history.times().collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_entry_or_insert_with() {
        let mut history = three_point_history();

        history.entry_or_insert_with(1.0, || snapshot(-1.0))[0] = 5.0;
        assert_eq!(history.len(), 3);
        assert_eq!(history.lookup(1.0).unwrap()[0], 5.0);
        assert_eq!(history.lookup(1.0).unwrap()[1], 1.0);

        history.entry_or_insert_with(4.0, || snapshot(0.0))[2] = 8.0;
        assert_eq!(history.len(), 4);
        assert_eq!(history.last_time(), Some(4.0));
        assert_eq!(history.latest().unwrap()[2], 8.0);
    }

    #[test]
    fn test_first_last_and_clear() {
        let mut history = three_point_history();
        assert_eq!(history.first_time(), Some(0.0));
        assert_eq!(history.last_time(), Some(3.0));
        assert_eq!(history.iter().count(), 3);

        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.first_time(), None);
    }
}

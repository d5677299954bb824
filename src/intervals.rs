//! Interval derivation
//!
//! Incrementally derives the hold, flight, and down-down sequences from
//! the keystroke stream: O(1) per event, single pass, no backtracking.
//!
//! Flight time is the gap between releasing the previous key and pressing
//! the current one, so it is derived from the *press* time of the
//! just-released key against the previous release time. Under key rollover
//! the value is negative and is preserved as-is.

use crate::types::IntervalSet;
use std::collections::HashMap;

/// Scratch state plus the growing [`IntervalSet`] for one attempt.
#[derive(Debug, Default)]
pub struct IntervalDeriver {
    intervals: IntervalSet,
    /// Press timestamp per key, awaiting its release. Entries are kept
    /// after the release fires (source behavior: a duplicate release
    /// re-derives a hold from the stale press).
    pending_press_ms: HashMap<String, f64>,
    last_press_ms: Option<f64>,
    last_release_ms: Option<f64>,
}

impl IntervalDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press at `time_ms`. Appends a down-down sample on every
    /// press after the first, regardless of key identity.
    pub fn on_press(&mut self, key_id: &str, time_ms: f64) {
        if let Some(last) = self.last_press_ms {
            self.intervals.down_down_times.push(time_ms - last);
        }
        self.last_press_ms = Some(time_ms);
        self.pending_press_ms.insert(key_id.to_string(), time_ms);
    }

    /// Record a release at `time_ms`. A release with no pending press for
    /// its key is a tolerated data gap: nothing is derived and the
    /// previous-release marker is left untouched.
    pub fn on_release(&mut self, key_id: &str, time_ms: f64) {
        let Some(&press_ms) = self.pending_press_ms.get(key_id) else {
            return;
        };
        self.intervals.hold_times.push(time_ms - press_ms);
        if let Some(prev_release) = self.last_release_ms {
            self.intervals.flight_times.push(press_ms - prev_release);
        }
        self.last_release_ms = Some(time_ms);
    }

    pub fn intervals(&self) -> &IntervalSet {
        &self.intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hold_time_per_key() {
        let mut deriver = IntervalDeriver::new();
        deriver.on_press("KeyA", 0.0);
        deriver.on_release("KeyA", 90.0);

        assert_eq!(deriver.intervals().hold_times, vec![90.0]);
        assert!(deriver.intervals().flight_times.is_empty());
    }

    #[test]
    fn test_down_down_regardless_of_identity() {
        let mut deriver = IntervalDeriver::new();
        deriver.on_press("KeyA", 0.0);
        deriver.on_press("KeyB", 80.0);
        deriver.on_press("Space", 200.0);

        assert_eq!(deriver.intervals().down_down_times, vec![80.0, 120.0]);
    }

    #[test]
    fn test_down_down_count_is_presses_minus_one() {
        let mut deriver = IntervalDeriver::new();
        for i in 0..7 {
            deriver.on_press("KeyA", i as f64 * 100.0);
        }
        assert_eq!(deriver.intervals().down_down_times.len(), 6);
    }

    #[test]
    fn test_flight_uses_press_of_released_key() {
        // Sequential typing: a down 0, a up 90, b down 150, b up 210.
        let mut deriver = IntervalDeriver::new();
        deriver.on_press("KeyA", 0.0);
        deriver.on_release("KeyA", 90.0);
        deriver.on_press("KeyB", 150.0);
        deriver.on_release("KeyB", 210.0);

        // flight = press(b) − release(a) = 150 − 90
        assert_eq!(deriver.intervals().flight_times, vec![60.0]);
        assert_eq!(deriver.intervals().hold_times, vec![90.0, 60.0]);
    }

    #[test]
    fn test_rollover_flight_is_negative_and_preserved() {
        // a down 0, b down 80, a up 90, b up 150, space down 200.
        let mut deriver = IntervalDeriver::new();
        deriver.on_press("KeyA", 0.0);
        deriver.on_press("KeyB", 80.0);
        deriver.on_release("KeyA", 90.0);
        deriver.on_release("KeyB", 150.0);
        deriver.on_press("Space", 200.0);

        let intervals = deriver.intervals();
        assert_eq!(intervals.hold_times, vec![90.0, 70.0]);
        // flight = press(b)@80 − release(a)@90 = −10: rollover, not clamped
        assert_eq!(intervals.flight_times, vec![-10.0]);
        assert_eq!(intervals.down_down_times, vec![80.0, 120.0]);
    }

    #[test]
    fn test_release_without_press_is_skipped() {
        let mut deriver = IntervalDeriver::new();
        deriver.on_release("KeyA", 50.0);
        assert!(deriver.intervals().hold_times.is_empty());

        // The stray release must not seed the previous-release marker.
        deriver.on_press("KeyB", 100.0);
        deriver.on_release("KeyB", 160.0);
        assert_eq!(deriver.intervals().hold_times, vec![60.0]);
        assert!(deriver.intervals().flight_times.is_empty());
    }

    #[test]
    fn test_all_values_non_negative_for_sequential_typing() {
        let mut deriver = IntervalDeriver::new();
        let keys = ["KeyT", "KeyH", "KeyE"];
        let mut t = 0.0;
        for key in keys {
            deriver.on_press(key, t);
            deriver.on_release(key, t + 60.0);
            t += 150.0;
        }

        let intervals = deriver.intervals();
        assert!(intervals.hold_times.iter().all(|&v| v >= 0.0));
        assert!(intervals.flight_times.iter().all(|&v| v >= 0.0));
        assert!(intervals.down_down_times.iter().all(|&v| v >= 0.0));
    }
}

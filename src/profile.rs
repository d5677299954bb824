//! Cross-attempt n-gram profile accumulation
//!
//! A rolling store of digraph/trigraph timing samples across attempts.
//! Each gram keeps at most `window_size` recent samples so a long-running
//! session stays bounded while the profile tracks the typist's current
//! rhythm.

use crate::types::NgramAggregate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Default maximum samples retained per gram.
pub const DEFAULT_PROFILE_WINDOW: usize = 50;

/// Rolling n-gram timing profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NgramProfileStore {
    digraphs: BTreeMap<String, VecDeque<f64>>,
    trigraphs: BTreeMap<String, VecDeque<f64>>,
    /// Maximum samples retained per gram.
    window_size: usize,
    attempts_recorded: u32,
}

impl Default for NgramProfileStore {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE_WINDOW)
    }
}

impl NgramProfileStore {
    pub fn new(window_size: usize) -> Self {
        Self {
            digraphs: BTreeMap::new(),
            trigraphs: BTreeMap::new(),
            window_size,
            attempts_recorded: 0,
        }
    }

    /// Fold one attempt's aggregate into the profile, trimming each gram
    /// to the window.
    pub fn record_attempt(&mut self, aggregate: &NgramAggregate) {
        for (gram, samples) in &aggregate.digraphs {
            let queue = self.digraphs.entry(gram.clone()).or_default();
            for &sample in samples {
                queue.push_back(sample);
            }
            while queue.len() > self.window_size {
                queue.pop_front();
            }
        }
        for (gram, samples) in &aggregate.trigraphs {
            let queue = self.trigraphs.entry(gram.clone()).or_default();
            for &sample in samples {
                queue.push_back(sample);
            }
            while queue.len() > self.window_size {
                queue.pop_front();
            }
        }
        self.attempts_recorded += 1;
    }

    /// Snapshot of the accumulated samples as a plain aggregate.
    pub fn aggregate(&self) -> NgramAggregate {
        NgramAggregate {
            digraphs: self
                .digraphs
                .iter()
                .map(|(gram, queue)| (gram.clone(), queue.iter().copied().collect()))
                .collect(),
            trigraphs: self
                .trigraphs
                .iter()
                .map(|(gram, queue)| (gram.clone(), queue.iter().copied().collect()))
                .collect(),
        }
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempts_recorded
    }

    /// Samples currently held for one digraph.
    pub fn digraph_samples(&self, gram: &str) -> usize {
        self.digraphs.get(gram).map_or(0, VecDeque::len)
    }

    pub fn clear(&mut self) {
        self.digraphs.clear();
        self.trigraphs.clear();
        self.attempts_recorded = 0;
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn aggregate_with(gram: &str, timing: f64) -> NgramAggregate {
        let mut aggregate = NgramAggregate::default();
        aggregate.add_digraph(gram, timing);
        aggregate
    }

    #[test]
    fn test_accumulates_across_attempts() {
        let mut store = NgramProfileStore::new(10);
        store.record_attempt(&aggregate_with("th", 50.0));
        store.record_attempt(&aggregate_with("th", 55.0));

        assert_eq!(store.attempt_count(), 2);
        assert_eq!(store.digraph_samples("th"), 2);
        assert_eq!(store.aggregate().digraphs["th"], vec![50.0, 55.0]);
    }

    #[test]
    fn test_window_trims_oldest_samples() {
        let mut store = NgramProfileStore::new(3);
        for i in 0..5 {
            store.record_attempt(&aggregate_with("th", 50.0 + i as f64));
        }

        assert_eq!(store.digraph_samples("th"), 3);
        assert_eq!(store.aggregate().digraphs["th"], vec![52.0, 53.0, 54.0]);
    }

    #[test]
    fn test_trigraphs_tracked_independently() {
        let mut store = NgramProfileStore::new(10);
        let mut aggregate = NgramAggregate::default();
        aggregate.add_digraph("th", 50.0);
        aggregate.add_trigraph("the", 120.0);
        store.record_attempt(&aggregate);

        let snapshot = store.aggregate();
        assert_eq!(snapshot.digraphs["th"], vec![50.0]);
        assert_eq!(snapshot.trigraphs["the"], vec![120.0]);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut store = NgramProfileStore::new(10);
        store.record_attempt(&aggregate_with("qu", 65.0));

        let json = store.to_json().unwrap();
        let loaded = NgramProfileStore::from_json(&json).unwrap();

        assert_eq!(loaded.attempt_count(), 1);
        assert_eq!(loaded.aggregate(), store.aggregate());
    }

    #[test]
    fn test_clear() {
        let mut store = NgramProfileStore::new(10);
        store.record_attempt(&aggregate_with("th", 50.0));
        store.clear();

        assert_eq!(store.attempt_count(), 0);
        assert!(store.aggregate().is_empty());
    }
}

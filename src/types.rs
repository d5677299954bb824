//! Core data types for keystroke capture
//!
//! This module defines the event, interval, and aggregate types that flow
//! through the capture pipeline, with serde attributes matching the wire
//! format the identification and training services consume.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key transition direction.
///
/// Serialized as `"down"` / `"up"` in timing logs and keystroke sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEventKind {
    #[serde(rename = "down")]
    Press,
    #[serde(rename = "up")]
    Release,
}

/// A single timestamped key transition.
///
/// `key_id` is the logical key identity (DOM `KeyboardEvent.code`
/// vocabulary, e.g. `KeyA`, `Space`), not the printable character.
/// `time_ms` is milliseconds since attempt start on a monotonic clock.
/// Events are append-only for the lifetime of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    #[serde(rename = "key")]
    pub key_id: String,
    #[serde(rename = "time")]
    pub time_ms: f64,
    #[serde(rename = "type")]
    pub kind: KeyEventKind,
}

/// Derived companion of [`KeyEvent`] carrying the typed character
/// (lower-cased) rather than the physical key. Recorded only for
/// character-producing keys; consumed by the n-gram extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharEvent {
    #[serde(rename = "key")]
    pub ch: char,
    #[serde(rename = "time")]
    pub time_ms: f64,
    #[serde(rename = "type")]
    pub kind: KeyEventKind,
}

/// The three interval sequences derived from the keystroke stream.
///
/// Lengths are independent and grow monotonically during an attempt.
/// Flight values may be negative under key rollover and are preserved
/// as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalSet {
    /// release − press of the same key, ms
    pub hold_times: Vec<f64>,
    /// press of key n − release of key n−1, ms
    pub flight_times: Vec<f64>,
    /// press of key n − press of key n−1, ms
    pub down_down_times: Vec<f64>,
}

impl IntervalSet {
    /// Mean/std summary of each sequence, mirroring the 6-feature summary
    /// vector the identification service builds. `None` until every
    /// sequence has at least one sample.
    pub fn summary(&self) -> Option<IntervalSummary> {
        if self.hold_times.is_empty()
            || self.flight_times.is_empty()
            || self.down_down_times.is_empty()
        {
            return None;
        }
        Some(IntervalSummary {
            avg_hold: mean(&self.hold_times),
            std_hold: std_dev(&self.hold_times),
            avg_flight: mean(&self.flight_times),
            std_flight: std_dev(&self.flight_times),
            avg_dd: mean(&self.down_down_times),
            std_dd: std_dev(&self.down_down_times),
        })
    }
}

/// Display-side summary statistics over an [`IntervalSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSummary {
    pub avg_hold: f64,
    pub std_hold: f64,
    pub avg_flight: f64,
    pub std_flight: f64,
    pub avg_dd: f64,
    pub std_dd: f64,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Timing samples keyed by n-gram string, accumulated across one or more
/// attempts against texts that contain that n-gram.
///
/// Within one attempt at most one sample is added per occurrence position
/// in the reference text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NgramAggregate {
    /// 2-grams: "th", "he", "qu", ...
    pub digraphs: BTreeMap<String, Vec<f64>>,
    /// 3-grams: "the", "qui", "bro", ...
    pub trigraphs: BTreeMap<String, Vec<f64>>,
}

impl NgramAggregate {
    pub fn add_digraph(&mut self, gram: &str, timing_ms: f64) {
        self.digraphs.entry(gram.to_string()).or_default().push(timing_ms);
    }

    pub fn add_trigraph(&mut self, gram: &str, timing_ms: f64) {
        self.trigraphs.entry(gram.to_string()).or_default().push(timing_ms);
    }

    /// Fold another aggregate's samples into this one.
    pub fn merge(&mut self, other: &NgramAggregate) {
        for (gram, samples) in &other.digraphs {
            self.digraphs
                .entry(gram.clone())
                .or_default()
                .extend_from_slice(samples);
        }
        for (gram, samples) in &other.trigraphs {
            self.trigraphs
                .entry(gram.clone())
                .or_default()
                .extend_from_slice(samples);
        }
    }

    /// Total number of timing samples across both maps.
    pub fn sample_count(&self) -> usize {
        self.digraphs.values().map(Vec::len).sum::<usize>()
            + self.trigraphs.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.digraphs.is_empty() && self.trigraphs.is_empty()
    }
}

/// Reference-phrase difficulty tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Lifecycle state of one typing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptState {
    Idle,
    Active,
    Completed,
    Abandoned,
}

/// One entry of the input-buffer history, recorded on every buffer change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferSnapshot {
    pub value: String,
    #[serde(rename = "time")]
    pub time_ms: f64,
}

/// Point-in-time metrics for display, produced by the attempt state
/// machine on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptSnapshot {
    pub state: AttemptState,
    pub elapsed_seconds: f64,
    /// typed / total, percent
    pub progress_pct: f64,
    pub wpm: f64,
    pub accuracy_pct: f64,
    pub errors: u32,
    pub typed_chars: usize,
    pub total_chars: usize,
    /// Per-position correctness of the typed portion of the buffer.
    pub correctness: Vec<bool>,
}

/// Performance tier for the end-of-attempt banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Elite,
    Excellent,
    Good,
    Practicing,
    Beginner,
}

impl PerformanceTier {
    pub fn from_metrics(wpm: f64, accuracy_pct: f64) -> Self {
        if wpm >= 80.0 && accuracy_pct >= 95.0 {
            PerformanceTier::Elite
        } else if wpm >= 60.0 && accuracy_pct >= 90.0 {
            PerformanceTier::Excellent
        } else if wpm >= 40.0 && accuracy_pct >= 85.0 {
            PerformanceTier::Good
        } else if wpm >= 30.0 && accuracy_pct >= 80.0 {
            PerformanceTier::Practicing
        } else {
            PerformanceTier::Beginner
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PerformanceTier::Elite => "Elite typist!",
            PerformanceTier::Excellent => "Excellent!",
            PerformanceTier::Good => "Good job!",
            PerformanceTier::Practicing => "Keep practicing!",
            PerformanceTier::Beginner => "You'll get better!",
        }
    }
}

//! Attempt lifecycle and metrics
//!
//! One [`Attempt`] is the aggregate root for a single typing round: it owns
//! the event sequences, the derived intervals, the input buffer, and the
//! lifecycle state, and recomputes the display metrics on every buffer
//! change.
//!
//! Error counting inspects the newest typed character only (not a full
//! diff), so corrections applied out of order can undercount. This mirrors
//! the behavior the identification service was trained against and must
//! not be "fixed".

use crate::intervals::IntervalDeriver;
use crate::ngram;
use crate::recorder::EventRecorder;
use crate::types::{
    AttemptSnapshot, AttemptState, BufferSnapshot, CharEvent, Difficulty, IntervalSet, KeyEvent,
    KeyEventKind, NgramAggregate,
};
use uuid::Uuid;

/// A single typing attempt against one reference phrase.
#[derive(Debug)]
pub struct Attempt {
    id: Uuid,
    generation: u64,
    reference_text: String,
    difficulty: Difficulty,
    state: AttemptState,
    /// Clock reading at the Idle → Active transition; event timestamps are
    /// relative to this.
    start_ms: f64,
    buffer: String,
    errors: u32,
    input_history: Vec<BufferSnapshot>,
    recorder: EventRecorder,
    deriver: IntervalDeriver,
    /// Aggregate snapshot taken when the attempt completes.
    ngram_snapshot: Option<NgramAggregate>,
    completed_at_ms: Option<f64>,
}

impl Attempt {
    /// Start a new attempt. All sequences, intervals, and aggregates begin
    /// empty; `start_ms` is the monotonic reading at the transition.
    pub fn start(
        reference_text: &str,
        difficulty: Difficulty,
        generation: u64,
        start_ms: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            generation,
            reference_text: reference_text.to_string(),
            difficulty,
            state: AttemptState::Active,
            start_ms,
            buffer: String::new(),
            errors: 0,
            input_history: Vec::new(),
            recorder: EventRecorder::new(),
            deriver: IntervalDeriver::new(),
            ngram_snapshot: None,
            completed_at_ms: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn reference_text(&self) -> &str {
        &self.reference_text
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn key_events(&self) -> &[KeyEvent] {
        self.recorder.key_events()
    }

    pub fn char_events(&self) -> &[CharEvent] {
        self.recorder.char_events()
    }

    pub fn intervals(&self) -> &IntervalSet {
        self.deriver.intervals()
    }

    pub fn input_history(&self) -> &[BufferSnapshot] {
        &self.input_history
    }

    pub fn is_active(&self) -> bool {
        self.state == AttemptState::Active
    }

    /// Record a key press. No-op unless the attempt is active.
    pub fn on_press(&mut self, key_id: &str, now_ms: f64) {
        if !self.is_active() {
            return;
        }
        let t = self.recorder.record(key_id, KeyEventKind::Press, now_ms - self.start_ms);
        self.deriver.on_press(key_id, t);
    }

    /// Record a key release. No-op unless the attempt is active.
    pub fn on_release(&mut self, key_id: &str, now_ms: f64) {
        if !self.is_active() {
            return;
        }
        let t = self.recorder.record(key_id, KeyEventKind::Release, now_ms - self.start_ms);
        self.deriver.on_release(key_id, t);
    }

    /// Apply a buffer change from the host input surface. Recomputes the
    /// error counter and fires completion when the buffer equals the
    /// reference text byte-for-byte.
    pub fn on_buffer_change(&mut self, new_buffer: &str, now_ms: f64) {
        if !self.is_active() {
            return;
        }
        let elapsed_ms = now_ms - self.start_ms;
        self.input_history.push(BufferSnapshot {
            value: new_buffer.to_string(),
            time_ms: elapsed_ms,
        });

        // Mismatch detected at the newest typed character only.
        let typed: Vec<char> = new_buffer.chars().collect();
        let reference: Vec<char> = self.reference_text.chars().collect();
        if let Some(&last) = typed.last() {
            let idx = typed.len() - 1;
            if idx < reference.len() && last != reference[idx] {
                self.errors += 1;
            }
        }

        self.buffer = new_buffer.to_string();

        if self.buffer == self.reference_text {
            self.state = AttemptState::Completed;
            self.completed_at_ms = Some(elapsed_ms);
            self.ngram_snapshot = Some(ngram::extract(&self.reference_text, self.char_events()));
        }
    }

    /// Abandon the attempt (external reset). Active → Abandoned.
    pub fn abandon(&mut self) {
        if self.is_active() {
            self.state = AttemptState::Abandoned;
        }
    }

    /// The n-gram aggregate: the completion snapshot when available,
    /// otherwise extracted on demand from the events recorded so far.
    pub fn ngram_aggregate(&self) -> NgramAggregate {
        match &self.ngram_snapshot {
            Some(snapshot) => snapshot.clone(),
            None => ngram::extract(&self.reference_text, self.char_events()),
        }
    }

    /// Elapsed milliseconds, frozen at the completion instant once
    /// completed.
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        match self.completed_at_ms {
            Some(done) => done,
            None => (now_ms - self.start_ms).max(0.0),
        }
    }

    /// Words per minute: word count of the reference text over elapsed
    /// minutes.
    pub fn wpm(&self, now_ms: f64) -> f64 {
        let elapsed_min = self.elapsed_ms(now_ms) / 60_000.0;
        if elapsed_min <= 0.0 {
            return 0.0;
        }
        let words = self.reference_text.split(' ').count() as f64;
        words / elapsed_min
    }

    /// Accuracy percent: 100 − error rate over typed characters, floored
    /// at zero and rounded.
    pub fn accuracy_pct(&self) -> f64 {
        let typed = self.buffer.chars().count();
        if typed == 0 {
            return 100.0;
        }
        let error_rate = (self.errors as f64 / typed as f64) * 100.0;
        (100.0 - error_rate).round().max(0.0)
    }

    /// Per-position correctness of the typed portion, up to the shorter of
    /// buffer and reference text.
    pub fn correctness(&self) -> Vec<bool> {
        self.buffer
            .chars()
            .zip(self.reference_text.chars())
            .map(|(typed, expected)| typed == expected)
            .collect()
    }

    /// Current metrics for display.
    pub fn snapshot(&self, now_ms: f64) -> AttemptSnapshot {
        let typed_chars = self.buffer.chars().count();
        let total_chars = self.reference_text.chars().count();
        let progress_pct = if total_chars == 0 {
            0.0
        } else {
            (typed_chars as f64 / total_chars as f64) * 100.0
        };
        AttemptSnapshot {
            state: self.state,
            elapsed_seconds: self.elapsed_ms(now_ms) / 1000.0,
            progress_pct,
            wpm: self.wpm(now_ms),
            accuracy_pct: self.accuracy_pct(),
            errors: self.errors,
            typed_chars,
            total_chars,
            correctness: self.correctness(),
        }
    }

    /// Total attempt duration in seconds. `None` until completed.
    pub fn total_time_seconds(&self) -> Option<f64> {
        self.completed_at_ms.map(|ms| ms / 1000.0)
    }
}

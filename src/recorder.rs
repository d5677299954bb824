//! Event recording
//!
//! Appends one [`KeyEvent`] per key transition (plus one [`CharEvent`] for
//! character-producing keys) to the attempt's ordered, append-only
//! sequences. Timestamps are clamped non-decreasing so the recorded
//! sequence honors the monotonic-clock invariant even if the host's clock
//! seam misbehaves.

use crate::keymap::key_character;
use crate::types::{CharEvent, KeyEvent, KeyEventKind};

/// Append-only event store for one attempt.
#[derive(Debug, Default)]
pub struct EventRecorder {
    key_events: Vec<KeyEvent>,
    char_events: Vec<CharEvent>,
    press_count: usize,
    last_time_ms: Option<f64>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one transition and return the timestamp actually stored.
    pub fn record(&mut self, key_id: &str, kind: KeyEventKind, time_ms: f64) -> f64 {
        let time_ms = match self.last_time_ms {
            Some(last) if time_ms < last => last,
            None => time_ms.max(0.0),
            _ => time_ms,
        };
        self.last_time_ms = Some(time_ms);

        self.key_events.push(KeyEvent {
            key_id: key_id.to_string(),
            time_ms,
            kind,
        });
        if kind == KeyEventKind::Press {
            self.press_count += 1;
        }
        if let Some(ch) = key_character(key_id) {
            self.char_events.push(CharEvent { ch, time_ms, kind });
        }
        time_ms
    }

    pub fn key_events(&self) -> &[KeyEvent] {
        &self.key_events
    }

    pub fn char_events(&self) -> &[CharEvent] {
        &self.char_events
    }

    pub fn press_count(&self) -> usize {
        self.press_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_records_key_and_char_events() {
        let mut recorder = EventRecorder::new();
        recorder.record("KeyA", KeyEventKind::Press, 0.0);
        recorder.record("KeyA", KeyEventKind::Release, 80.0);

        assert_eq!(recorder.key_events().len(), 2);
        assert_eq!(recorder.char_events().len(), 2);
        assert_eq!(recorder.char_events()[0].ch, 'a');
        assert_eq!(recorder.char_events()[0].kind, KeyEventKind::Press);
        assert_eq!(recorder.char_events()[1].kind, KeyEventKind::Release);
        assert_eq!(recorder.press_count(), 1);
    }

    #[test]
    fn test_modifier_keys_have_no_char_event() {
        let mut recorder = EventRecorder::new();
        recorder.record("ShiftLeft", KeyEventKind::Press, 0.0);
        recorder.record("KeyA", KeyEventKind::Press, 30.0);
        recorder.record("KeyA", KeyEventKind::Release, 90.0);
        recorder.record("ShiftLeft", KeyEventKind::Release, 110.0);

        assert_eq!(recorder.key_events().len(), 4);
        assert_eq!(recorder.char_events().len(), 2);
        assert_eq!(recorder.press_count(), 2);
    }

    #[test]
    fn test_timestamps_clamped_non_decreasing() {
        let mut recorder = EventRecorder::new();
        recorder.record("KeyA", KeyEventKind::Press, 100.0);
        let stored = recorder.record("KeyB", KeyEventKind::Press, 40.0);

        assert_eq!(stored, 100.0);
        let times: Vec<f64> = recorder.key_events().iter().map(|e| e.time_ms).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_events_never_reordered() {
        let mut recorder = EventRecorder::new();
        recorder.record("KeyT", KeyEventKind::Press, 0.0);
        recorder.record("KeyH", KeyEventKind::Press, 50.0);
        recorder.record("KeyT", KeyEventKind::Release, 70.0);
        recorder.record("KeyH", KeyEventKind::Release, 120.0);

        let ids: Vec<&str> = recorder.key_events().iter().map(|e| e.key_id.as_str()).collect();
        assert_eq!(ids, vec!["KeyT", "KeyH", "KeyT", "KeyH"]);
    }
}

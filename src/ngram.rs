//! N-gram timing extraction
//!
//! Turns a free-text keystroke trace into a fixed-vocabulary-keyed timing
//! profile: for every contiguous alphabetic digraph and trigraph of the
//! reference text, the elapsed time across the first structurally-matching
//! press subsequence is recorded.
//!
//! Occurrences of the same n-gram at different text positions are processed
//! independently, and every occurrence rescans the press sequence from the
//! start. Repeated substrings in the reference text can therefore sample
//! the same underlying keystrokes more than once; the earliest valid match
//! always wins. Extraction is a pure function of its inputs: re-running it
//! yields the same aggregate, never an accumulated one.

use crate::types::{CharEvent, KeyEventKind, NgramAggregate};

/// One enumerated n-gram occurrence, tagged with its start index in the
/// reference text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgramOccurrence {
    pub gram: String,
    pub start_index: usize,
}

/// Enumerate every length-`n` contiguous substring of the lower-cased text
/// whose characters are all alphabetic.
pub fn enumerate_occurrences(text: &str, n: usize) -> Vec<NgramOccurrence> {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    if chars.len() < n {
        return Vec::new();
    }

    let mut occurrences = Vec::new();
    for start in 0..=chars.len() - n {
        let window = &chars[start..start + n];
        if window.iter().all(|c| c.is_ascii_alphabetic()) {
            occurrences.push(NgramOccurrence {
                gram: window.iter().collect(),
                start_index: start,
            });
        }
    }
    occurrences
}

/// Extract digraph and trigraph timings for one attempt.
pub fn extract(reference_text: &str, char_events: &[CharEvent]) -> NgramAggregate {
    let presses: Vec<(char, f64)> = char_events
        .iter()
        .filter(|e| e.kind == KeyEventKind::Press)
        .map(|e| (e.ch, e.time_ms))
        .collect();

    let mut aggregate = NgramAggregate::default();

    for occurrence in enumerate_occurrences(reference_text, 2) {
        if let Some(timing) = first_match_elapsed(&presses, &occurrence.gram) {
            aggregate.add_digraph(&occurrence.gram, timing);
        }
    }
    for occurrence in enumerate_occurrences(reference_text, 3) {
        if let Some(timing) = first_match_elapsed(&presses, &occurrence.gram) {
            aggregate.add_trigraph(&occurrence.gram, timing);
        }
    }
    aggregate
}

/// Scan the press sequence for the first consecutive run matching `gram`
/// and return last-press time − first-press time.
fn first_match_elapsed(presses: &[(char, f64)], gram: &str) -> Option<f64> {
    let target: Vec<char> = gram.chars().collect();
    if presses.len() < target.len() {
        return None;
    }

    for window in presses.windows(target.len()) {
        if window.iter().map(|(c, _)| *c).eq(target.iter().copied()) {
            return Some(window[target.len() - 1].1 - window[0].1);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(ch: char, time_ms: f64) -> CharEvent {
        CharEvent {
            ch,
            time_ms,
            kind: KeyEventKind::Press,
        }
    }

    fn release(ch: char, time_ms: f64) -> CharEvent {
        CharEvent {
            ch,
            time_ms,
            kind: KeyEventKind::Release,
        }
    }

    #[test]
    fn test_enumerate_digraphs_skips_non_alphabetic() {
        let occurrences = enumerate_occurrences("ab ba", 2);
        let grams: Vec<&str> = occurrences.iter().map(|o| o.gram.as_str()).collect();
        assert_eq!(grams, vec!["ab", "ba"]);
        assert_eq!(occurrences[0].start_index, 0);
        assert_eq!(occurrences[1].start_index, 3);
    }

    #[test]
    fn test_enumerate_lower_cases_text() {
        let occurrences = enumerate_occurrences("The", 3);
        assert_eq!(occurrences[0].gram, "the");
    }

    #[test]
    fn test_enumerate_repeated_occurrences_kept_separately() {
        let occurrences = enumerate_occurrences("thethe", 3);
        let the_count = occurrences.iter().filter(|o| o.gram == "the").count();
        assert_eq!(the_count, 2);
    }

    #[test]
    fn test_extract_the_scenario() {
        // Presses t@0, h@50, e@120: th = 50, he = 70, the = 120.
        let events = vec![press('t', 0.0), press('h', 50.0), press('e', 120.0)];
        let aggregate = extract("the", &events);

        assert_eq!(aggregate.digraphs["th"], vec![50.0]);
        assert_eq!(aggregate.digraphs["he"], vec![70.0]);
        assert_eq!(aggregate.trigraphs["the"], vec![120.0]);
    }

    #[test]
    fn test_extract_ignores_release_events() {
        let events = vec![
            press('t', 0.0),
            release('t', 40.0),
            press('h', 50.0),
            release('h', 95.0),
            press('e', 120.0),
        ];
        let aggregate = extract("the", &events);
        assert_eq!(aggregate.digraphs["th"], vec![50.0]);
        assert_eq!(aggregate.trigraphs["the"], vec![120.0]);
    }

    #[test]
    fn test_extract_first_match_wins() {
        // "ab" typed twice; the earliest structural match anchors the sample.
        let events = vec![
            press('a', 0.0),
            press('b', 30.0),
            press('a', 200.0),
            press('b', 260.0),
        ];
        let aggregate = extract("ab", &events);
        assert_eq!(aggregate.digraphs["ab"], vec![30.0]);
    }

    #[test]
    fn test_extract_repeated_text_occurrences_double_count() {
        // The text contains "ab" at two positions; both occurrences rescan
        // from the start and anchor to the same earliest keystrokes.
        let events = vec![
            press('a', 0.0),
            press('b', 30.0),
            press('x', 100.0),
            press('a', 200.0),
            press('b', 260.0),
        ];
        let aggregate = extract("abxab", &events);
        assert_eq!(aggregate.digraphs["ab"], vec![30.0, 30.0]);
    }

    #[test]
    fn test_extract_missing_subsequence_records_nothing() {
        let events = vec![press('t', 0.0), press('e', 80.0)];
        let aggregate = extract("the", &events);
        assert!(!aggregate.digraphs.contains_key("th"));
        assert!(!aggregate.digraphs.contains_key("he"));
        assert!(!aggregate.trigraphs.contains_key("the"));
    }

    #[test]
    fn test_extract_is_deterministic_and_reentrant() {
        let events = vec![
            press('t', 0.0),
            press('h', 55.0),
            press('e', 130.0),
            press(' ', 200.0),
            press('f', 280.0),
            press('o', 340.0),
            press('x', 410.0),
        ];
        let first = extract("the fox", &events);
        let second = extract("the fox", &events);
        assert_eq!(first, second);
        // Re-running never accumulates.
        assert_eq!(second.digraphs["th"].len(), 1);
    }

    #[test]
    fn test_extract_empty_events() {
        let aggregate = extract("the quick", &[]);
        assert!(aggregate.is_empty());
    }
}

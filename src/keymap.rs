//! Logical key identity to character mapping
//!
//! Hosts report keys in the DOM `KeyboardEvent.code` vocabulary (`KeyA`,
//! `Digit3`, `Space`, ...) or as bare single characters. Character-producing
//! keys map to their lower-cased character; modifier and navigation keys
//! map to `None` and contribute a [`crate::types::KeyEvent`] only.

/// Map a logical key identity to the character it produces, lower-cased.
pub fn key_character(key_id: &str) -> Option<char> {
    // Hosts that pass the printable key directly (e.g. "a", "A", "!").
    let mut chars = key_id.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Some(ch.to_ascii_lowercase());
    }

    if let Some(letter) = key_id.strip_prefix("Key") {
        let mut letters = letter.chars();
        if let (Some(ch), None) = (letters.next(), letters.next()) {
            if ch.is_ascii_alphabetic() {
                return Some(ch.to_ascii_lowercase());
            }
        }
        return None;
    }

    if let Some(digit) = key_id.strip_prefix("Digit") {
        let mut digits = digit.chars();
        if let (Some(ch), None) = (digits.next(), digits.next()) {
            if ch.is_ascii_digit() {
                return Some(ch);
            }
        }
        return None;
    }

    match key_id {
        "Space" => Some(' '),
        "Period" => Some('.'),
        "Comma" => Some(','),
        "Quote" => Some('\''),
        "Semicolon" => Some(';'),
        "Minus" => Some('-'),
        "Slash" => Some('/'),
        _ => None,
    }
}

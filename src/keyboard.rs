use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Serialize;

/// Physical key layouts the virtual keyboard can show.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase", from = "String")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum KeyboardLayout {
    #[default]
    Qwerty,
    Dvorak,
    Colemak,
    Workman,
    Azerty,
    Qwertz,
    Numpad,
}

const NUMBER_ROW: &[&str] = &[
    "`", "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "-", "=", "Backspace",
];
const BOTTOM_ROW: &[&str] = &["Ctrl", "Win", "Alt", "Space", "Alt", "Menu", "Ctrl"];

const QWERTY_ROWS: &[&[&str]] = &[
    NUMBER_ROW,
    &["Tab", "q", "w", "e", "r", "t", "y", "u", "i", "o", "p", "[", "]", "\\"],
    &["Caps", "a", "s", "d", "f", "g", "h", "j", "k", "l", ";", "'", "Enter"],
    &["Shift", "z", "x", "c", "v", "b", "n", "m", ",", ".", "/", "Shift"],
    BOTTOM_ROW,
];

const DVORAK_ROWS: &[&[&str]] = &[
    &["`", "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "[", "]", "Backspace"],
    &["Tab", "'", ",", ".", "p", "y", "f", "g", "c", "r", "l", "/", "=", "\\"],
    &["Caps", "a", "o", "e", "u", "i", "d", "h", "t", "n", "s", "-", "Enter"],
    &["Shift", ";", "q", "j", "k", "x", "b", "m", "w", "v", "z", "Shift"],
    BOTTOM_ROW,
];

const COLEMAK_ROWS: &[&[&str]] = &[
    NUMBER_ROW,
    &["Tab", "q", "w", "f", "p", "g", "j", "l", "u", "y", ";", "[", "]", "\\"],
    &["Caps", "a", "r", "s", "t", "d", "h", "n", "e", "i", "o", "'", "Enter"],
    &["Shift", "z", "x", "c", "v", "b", "k", "m", ",", ".", "/", "Shift"],
    BOTTOM_ROW,
];

const WORKMAN_ROWS: &[&[&str]] = &[
    NUMBER_ROW,
    &["Tab", "q", "d", "r", "w", "b", "j", "f", "u", "p", ";", "[", "]", "\\"],
    &["Caps", "a", "s", "h", "t", "g", "y", "n", "e", "o", "i", "'", "Enter"],
    &["Shift", "z", "x", "m", "c", "v", "k", "l", ",", ".", "/", "Shift"],
    BOTTOM_ROW,
];

const AZERTY_ROWS: &[&[&str]] = &[
    &["²", "&", "é", "\"", "'", "(", "-", "è", "_", "ç", "à", ")", "=", "Backspace"],
    &["Tab", "a", "z", "e", "r", "t", "y", "u", "i", "o", "p", "^", "$", "Enter"],
    &["Caps", "q", "s", "d", "f", "g", "h", "j", "k", "l", "m", "ù", "*"],
    &["Shift", "<", "w", "x", "c", "v", "b", "n", ",", ";", ":", "!", "Shift"],
    BOTTOM_ROW,
];

const QWERTZ_ROWS: &[&[&str]] = &[
    &["^", "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "ß", "´", "Backspace"],
    &["Tab", "q", "w", "e", "r", "t", "z", "u", "i", "o", "p", "ü", "+", "Enter"],
    &["Caps", "a", "s", "d", "f", "g", "h", "j", "k", "l", "ö", "ä", "#"],
    &["Shift", "<", "y", "x", "c", "v", "b", "n", "m", ",", ".", "-", "Shift"],
    BOTTOM_ROW,
];

const NUMPAD_ROWS: &[&[&str]] = &[
    &["Num", "/", "*", "-"],
    &["7", "8", "9", "+"],
    &["4", "5", "6"],
    &["1", "2", "3", "Enter"],
    &["0", "."],
];

impl KeyboardLayout {
    /// Parse a layout identifier, falling back to QWERTY for anything unknown.
    pub fn from_id(id: &str) -> Self {
        KeyboardLayout::from_str(id.trim()).unwrap_or_default()
    }

    pub fn home_row_chars(&self) -> &'static [char] {
        match self {
            KeyboardLayout::Qwerty => &['a', 's', 'd', 'f', 'j', 'k', 'l', ';'],
            KeyboardLayout::Dvorak => &['a', 'o', 'e', 'u', 'h', 't', 'n', 's'],
            KeyboardLayout::Colemak => &['a', 'r', 's', 't', 'n', 'e', 'i', 'o'],
            KeyboardLayout::Workman => &['a', 's', 'h', 't', 'n', 'e', 'o', 'i'],
            KeyboardLayout::Azerty => &['q', 's', 'd', 'f', 'j', 'k', 'l', 'm'],
            KeyboardLayout::Qwertz => &['a', 's', 'd', 'f', 'j', 'k', 'l', 'ö'],
            KeyboardLayout::Numpad => &['4', '5', '6'],
        }
    }

    pub fn home_row_keys(&self) -> BTreeSet<char> {
        self.home_row_chars().iter().copied().collect()
    }

    /// Key labels, top row first, for drawing the keyboard.
    pub fn rows(&self) -> &'static [&'static [&'static str]] {
        match self {
            KeyboardLayout::Qwerty => QWERTY_ROWS,
            KeyboardLayout::Dvorak => DVORAK_ROWS,
            KeyboardLayout::Colemak => COLEMAK_ROWS,
            KeyboardLayout::Workman => WORKMAN_ROWS,
            KeyboardLayout::Azerty => AZERTY_ROWS,
            KeyboardLayout::Qwertz => QWERTZ_ROWS,
            KeyboardLayout::Numpad => NUMPAD_ROWS,
        }
    }
}

impl From<String> for KeyboardLayout {
    fn from(s: String) -> Self {
        KeyboardLayout::from_id(&s)
    }
}

/// Does the key cap `label` produce `c`? Handles the named space bar.
pub fn label_matches(label: &str, c: char) -> bool {
    if c == ' ' {
        return label == "Space";
    }
    let mut chars = label.chars();
    matches!((chars.next(), chars.next()), (Some(l), None) if l.to_lowercase().eq(c.to_lowercase()))
}

/// Keys the virtual keyboard should emphasise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyHighlight {
    pub next_key: Option<char>,
    pub home_row: BTreeSet<char>,
}

impl KeyHighlight {
    /// The "active keys" set: the next key, if any.
    pub fn active_keys(&self) -> BTreeSet<char> {
        self.next_key.into_iter().collect()
    }
}

/// Lower-cased character expected after `typed`, or `None` once the paragraph
/// is exhausted.
pub fn next_expected_key(paragraph: &str, typed: &str) -> Option<char> {
    paragraph
        .chars()
        .nth(typed.chars().count())
        .map(|c| c.to_lowercase().next().unwrap_or(c))
}

pub fn highlight(layout: KeyboardLayout, paragraph: &str, typed: &str) -> KeyHighlight {
    KeyHighlight {
        next_key: next_expected_key(paragraph, typed),
        home_row: layout.home_row_keys(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_from_id_known_layouts() {
        assert_eq!(KeyboardLayout::from_id("qwerty"), KeyboardLayout::Qwerty);
        assert_eq!(KeyboardLayout::from_id("Dvorak"), KeyboardLayout::Dvorak);
        assert_eq!(KeyboardLayout::from_id(" colemak "), KeyboardLayout::Colemak);
        assert_eq!(KeyboardLayout::from_id("AZERTY"), KeyboardLayout::Azerty);
        assert_eq!(KeyboardLayout::from_id("numpad"), KeyboardLayout::Numpad);
    }

    #[test]
    fn test_unknown_layout_falls_back_to_qwerty() {
        assert_eq!(KeyboardLayout::from_id("klingon"), KeyboardLayout::Qwerty);
        assert_eq!(KeyboardLayout::from_id(""), KeyboardLayout::Qwerty);
        let h = highlight(KeyboardLayout::from_id("nope"), "abc", "");
        assert_eq!(h.home_row, KeyboardLayout::Qwerty.home_row_keys());
    }

    #[test]
    fn test_home_rows() {
        let qwerty: Vec<char> = KeyboardLayout::Qwerty.home_row_keys().into_iter().collect();
        assert_eq!(qwerty, vec![';', 'a', 'd', 'f', 'j', 'k', 'l', 's']);
        assert!(KeyboardLayout::Dvorak.home_row_keys().contains(&'u'));
        assert!(KeyboardLayout::Colemak.home_row_keys().contains(&'t'));
        assert!(KeyboardLayout::Qwertz.home_row_keys().contains(&'ö'));
    }

    #[test]
    fn test_home_row_keys_are_on_the_layout() {
        for layout in KeyboardLayout::iter() {
            for &c in layout.home_row_chars() {
                let found = layout
                    .rows()
                    .iter()
                    .flat_map(|row| row.iter())
                    .any(|label| label_matches(label, c));
                assert!(found, "{layout}: home row key {c:?} missing from rows");
            }
        }
    }

    #[test]
    fn test_next_expected_key() {
        assert_eq!(next_expected_key("Hello", ""), Some('h'));
        assert_eq!(next_expected_key("Hello", "He"), Some('l'));
        assert_eq!(next_expected_key("Hello", "Hello"), None);
        assert_eq!(next_expected_key("Hello", "Hello world"), None);
        assert_eq!(next_expected_key("", ""), None);
    }

    #[test]
    fn test_next_expected_key_counts_chars() {
        assert_eq!(next_expected_key("äbc", "ä"), Some('b'));
    }

    #[test]
    fn test_active_keys() {
        let h = highlight(KeyboardLayout::Qwerty, "ab", "a");
        assert_eq!(h.active_keys(), BTreeSet::from(['b']));
        let h = highlight(KeyboardLayout::Qwerty, "ab", "ab");
        assert!(h.active_keys().is_empty());
    }

    #[test]
    fn test_label_matches() {
        assert!(label_matches("a", 'A'));
        assert!(label_matches("Space", ' '));
        assert!(!label_matches("Shift", 's'));
        assert!(!label_matches("a", 'b'));
    }

    #[test]
    fn test_layout_display_round_trips_through_from_id() {
        for layout in KeyboardLayout::iter() {
            assert_eq!(KeyboardLayout::from_id(&layout.to_string()), layout);
        }
    }
}

//! Logical keys produced by the on-screen keyboard and their DOM descriptors.
//!
//! The on-screen keyboard emits *logical* keys: a printable character or one
//! of a handful of function keys.  When a key has a content-level effect it
//! is delivered to the hosted page as a synthetic `KeyboardEvent`, which
//! needs the DOM `key`, `code` and legacy `keyCode` values.  [`KeyMapper`]
//! computes those.

pub mod layout;

use serde::{Deserialize, Serialize};

/// A key press from the on-screen keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    /// A single printable character other than space.
    Char(char),
    Backspace,
    Space,
    Enter,
    /// Flips the shift-lock flag; no content-level effect.
    CapsToggle,
    /// Hides the keyboard and blurs the focused element.
    Close,
}

impl LogicalKey {
    /// Parses a keyboard button label.
    ///
    /// Accepts the function-key labels shown on the kiosk keyboard (`⌫`,
    /// `Caps`, `Space`, `Enter`, `Close`), their DOM-style spellings, and any
    /// single non-control character.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "⌫" | "Backspace" => return Some(Self::Backspace),
            "Caps" | "CapsLock" => return Some(Self::CapsToggle),
            "Space" | " " => return Some(Self::Space),
            "Enter" => return Some(Self::Enter),
            "Close" => return Some(Self::Close),
            _ => {}
        }

        let mut chars = label.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() && !c.is_whitespace() => Some(Self::Char(c)),
            _ => None,
        }
    }

    /// The character this key inserts, if any.
    pub fn text(self) -> Option<char> {
        match self {
            Self::Char(c) => Some(c),
            Self::Space => Some(' '),
            _ => None,
        }
    }

    /// Applies the shift-lock state to letter keys.
    pub fn with_caps(self, caps_lock: bool) -> Self {
        match self {
            Self::Char(c) if c.is_alphabetic() => {
                let cased = if caps_lock {
                    c.to_uppercase().next()
                } else {
                    c.to_lowercase().next()
                };
                Self::Char(cased.unwrap_or(c))
            }
            other => other,
        }
    }
}

/// DOM `KeyboardEvent` identity for one synthetic key event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomKey {
    /// `KeyboardEvent.key` – the produced character or the key name.
    pub key: String,
    /// `KeyboardEvent.code` – the physical key position name.
    pub code: String,
    /// Legacy `keyCode` / `which` value still read by many web forms.
    pub key_code: u32,
}

impl DomKey {
    fn new(key: impl Into<String>, code: impl Into<String>, key_code: u32) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            key_code,
        }
    }
}

/// Translates logical keys into DOM key descriptors.
pub struct KeyMapper;

impl KeyMapper {
    /// DOM descriptor for a logical key.
    ///
    /// Returns `None` for keys with no content-level event
    /// ([`LogicalKey::CapsToggle`] and [`LogicalKey::Close`]).
    pub fn dom_key(key: LogicalKey) -> Option<DomKey> {
        match key {
            LogicalKey::Char(c) => Some(Self::dom_key_for_char(c)),
            LogicalKey::Space => Some(Self::dom_key_for_char(' ')),
            LogicalKey::Enter => Some(DomKey::new("Enter", "Enter", 13)),
            LogicalKey::Backspace => Some(DomKey::new("Backspace", "Backspace", 8)),
            LogicalKey::CapsToggle | LogicalKey::Close => None,
        }
    }

    /// DOM descriptor for a typed character on a US layout.
    ///
    /// Letters and digits use the browser `keyCode` of their key; any other
    /// character reports its code point.
    pub fn dom_key_for_char(c: char) -> DomKey {
        let key_code = if c.is_ascii_alphabetic() {
            c.to_ascii_uppercase() as u32
        } else {
            c as u32
        };
        DomKey::new(c.to_string(), dom_code_for_char(c), key_code)
    }
}

/// `KeyboardEvent.code` for the key that produces `c` on a US layout.
fn dom_code_for_char(c: char) -> String {
    if c.is_ascii_alphabetic() {
        return format!("Key{}", c.to_ascii_uppercase());
    }
    if c.is_ascii_digit() {
        return format!("Digit{c}");
    }
    let code = match c {
        ' ' => "Space",
        '!' => "Digit1",
        '@' => "Digit2",
        '#' => "Digit3",
        '$' => "Digit4",
        '%' => "Digit5",
        '^' => "Digit6",
        '&' => "Digit7",
        '*' => "Digit8",
        '(' => "Digit9",
        ')' => "Digit0",
        '-' | '_' => "Minus",
        '=' | '+' => "Equal",
        '[' | '{' => "BracketLeft",
        ']' | '}' => "BracketRight",
        '\\' | '|' => "Backslash",
        ';' | ':' => "Semicolon",
        '\'' | '"' => "Quote",
        '`' | '~' => "Backquote",
        ',' | '<' => "Comma",
        '.' | '>' => "Period",
        '/' | '?' => "Slash",
        _ => "Unidentified",
    };
    code.to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_function_keys() {
        assert_eq!(LogicalKey::from_label("⌫"), Some(LogicalKey::Backspace));
        assert_eq!(LogicalKey::from_label("Caps"), Some(LogicalKey::CapsToggle));
        assert_eq!(LogicalKey::from_label("Space"), Some(LogicalKey::Space));
        assert_eq!(LogicalKey::from_label("Enter"), Some(LogicalKey::Enter));
        assert_eq!(LogicalKey::from_label("Close"), Some(LogicalKey::Close));
    }

    #[test]
    fn test_from_label_single_characters() {
        assert_eq!(LogicalKey::from_label("q"), Some(LogicalKey::Char('q')));
        assert_eq!(LogicalKey::from_label("7"), Some(LogicalKey::Char('7')));
        assert_eq!(LogicalKey::from_label("@"), Some(LogicalKey::Char('@')));
    }

    #[test]
    fn test_from_label_rejects_unknown_and_control_labels() {
        assert_eq!(LogicalKey::from_label(""), None);
        assert_eq!(LogicalKey::from_label("ab"), None);
        assert_eq!(LogicalKey::from_label("\n"), None);
        assert_eq!(LogicalKey::from_label("\t"), None);
    }

    #[test]
    fn test_with_caps_changes_letters_only() {
        assert_eq!(LogicalKey::Char('a').with_caps(true), LogicalKey::Char('A'));
        assert_eq!(LogicalKey::Char('A').with_caps(false), LogicalKey::Char('a'));
        assert_eq!(LogicalKey::Char('5').with_caps(true), LogicalKey::Char('5'));
        assert_eq!(LogicalKey::Enter.with_caps(true), LogicalKey::Enter);
    }

    #[test]
    fn test_printable_keys_report_their_text() {
        assert_eq!(LogicalKey::Char('x').text(), Some('x'));
        assert_eq!(LogicalKey::Space.text(), Some(' '));
        assert_eq!(LogicalKey::Backspace.text(), None);
        assert_eq!(LogicalKey::Close.text(), None);
    }

    #[test]
    fn test_dom_key_for_letter_uses_uppercase_key_code() {
        // Arrange / Act
        let dom = KeyMapper::dom_key(LogicalKey::Char('a')).unwrap();

        // Assert
        assert_eq!(dom, DomKey::new("a", "KeyA", 65));
    }

    #[test]
    fn test_dom_key_for_digit_and_symbol() {
        assert_eq!(KeyMapper::dom_key_for_char('1'), DomKey::new("1", "Digit1", 49));
        assert_eq!(KeyMapper::dom_key_for_char('@'), DomKey::new("@", "Digit2", 64));
        assert_eq!(KeyMapper::dom_key_for_char('\''), DomKey::new("'", "Quote", 39));
    }

    #[test]
    fn test_dom_key_for_function_keys() {
        assert_eq!(
            KeyMapper::dom_key(LogicalKey::Enter),
            Some(DomKey::new("Enter", "Enter", 13))
        );
        assert_eq!(
            KeyMapper::dom_key(LogicalKey::Backspace),
            Some(DomKey::new("Backspace", "Backspace", 8))
        );
        assert_eq!(
            KeyMapper::dom_key(LogicalKey::Space),
            Some(DomKey::new(" ", "Space", 32))
        );
    }

    #[test]
    fn test_caps_and_close_have_no_dom_event() {
        assert_eq!(KeyMapper::dom_key(LogicalKey::CapsToggle), None);
        assert_eq!(KeyMapper::dom_key(LogicalKey::Close), None);
    }

    #[test]
    fn test_unmapped_character_is_unidentified() {
        let dom = KeyMapper::dom_key_for_char('é');
        assert_eq!(dom.code, "Unidentified");
        assert_eq!(dom.key, "é");
        assert_eq!(dom.key_code, 'é' as u32);
    }
}

//! Button rows of the kiosk's on-screen keyboard.
//!
//! Only the key data lives here; drawing the buttons is the shell's job.
//! Whenever shift-lock changes the terminal sends the shell
//! [`KeyboardLayout::labels`] in a `KeyboardLabels` command, so letter buttons
//! show the case they will type.

use super::LogicalKey;

const CHARACTER_ROWS: [&str; 4] = ["qwertyuio", "asdfghjkl", "zxcvbnmp0", "123456789"];
const SYMBOL_ROWS: [&[&str]; 2] = [
    &["@", "#", "%", "&", "*", "(", ")", "-", "_"],
    &["=", ".", ",", "?", "/", "+", ":"],
];
const FUNCTION_ROW: [&str; 5] = ["Caps", "Space", "⌫", "Close", "Enter"];

/// The ordered button labels of the on-screen keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardLayout {
    rows: Vec<Vec<String>>,
}

impl KeyboardLayout {
    /// The kiosk layout: four character rows, two symbol rows and the
    /// function row.
    pub fn kiosk() -> Self {
        let mut rows: Vec<Vec<String>> = CHARACTER_ROWS
            .iter()
            .map(|row| row.chars().map(String::from).collect())
            .collect();
        rows.extend(
            SYMBOL_ROWS
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect()),
        );
        rows.push(FUNCTION_ROW.iter().map(|s| s.to_string()).collect());
        Self { rows }
    }

    /// Labels as defined, letters in lower case.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Labels as displayed for the given shift-lock state.
    pub fn labels(&self, caps_lock: bool) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|label| display_label(label, caps_lock)).collect())
            .collect()
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::kiosk()
    }
}

/// Single-letter labels follow the shift-lock state; everything else is fixed.
fn display_label(label: &str, caps_lock: bool) -> String {
    match LogicalKey::from_label(label) {
        Some(LogicalKey::Char(c)) if c.is_alphabetic() => {
            if caps_lock {
                c.to_uppercase().collect()
            } else {
                c.to_lowercase().collect()
            }
        }
        _ => label.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

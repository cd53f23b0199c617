//! Focus classification and the on-screen keyboard visibility machine.
//!
//! The control thread samples which element has input focus in the hosted
//! page on a fixed interval.  Each sample is classified into a
//! [`FocusState`], and the keyboard visibility is a pure function of the
//! latest sample: no hysteresis, no debounce.
//!
//! ```text
//!            poll: editable
//!   Hidden ─────────────────────▶ Visible
//!     ▲                              │
//!     └──────────────────────────────┘
//!       poll: not editable, or Close key
//! ```

use serde::{Deserialize, Serialize};

/// Tag names of the controls that accept typed text.
const EDITABLE_TAGS: [&str; 2] = ["INPUT", "TEXTAREA"];

/// The element that currently holds input focus in the hosted content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusedElement {
    /// DOM tag name as reported by the host (e.g. `"INPUT"`).
    pub tag_name: String,
}

impl FocusedElement {
    /// Convenience constructor.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
        }
    }

    /// `true` when the element is a single- or multi-line text field.
    pub fn is_editable(&self) -> bool {
        EDITABLE_TAGS
            .iter()
            .any(|tag| self.tag_name.eq_ignore_ascii_case(tag))
    }
}

/// Classification of the most recent focus sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusState {
    pub is_editable: bool,
}

impl FocusState {
    /// Classifies a focus sample; `None` means nothing (or the page body) has
    /// focus.
    pub fn classify(element: Option<&FocusedElement>) -> Self {
        Self {
            is_editable: element.is_some_and(FocusedElement::is_editable),
        }
    }
}

/// Visibility of the on-screen keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyboardVisibility {
    #[default]
    Hidden,
    Visible,
}

impl KeyboardVisibility {
    /// State after a focus poll observed `focus`.
    pub fn after_poll(focus: FocusState) -> Self {
        if focus.is_editable {
            Self::Visible
        } else {
            Self::Hidden
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

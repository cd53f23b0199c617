//! Structured commands understood by the content host.
//!
//! Every effect the kiosk has on the hosted page is one of these values.
//! The host applies each command to the page's currently focused element
//! (or to the page itself for navigation), so a scan payload travels as
//! plain data and can never be interpreted as code, whatever quote
//! characters it contains.
//!
//! # JSON representation
//!
//! ```json
//! {"type":"AppendText","text":"a"}
//! {"type":"DispatchKey","phase":"down","key":{"key":"a","code":"KeyA","key_code":65}}
//! {"type":"Notify","event":"input"}
//! {"type":"Navigate","location":"https://example.com/order"}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::focus::KeyboardVisibility;
use crate::keymap::DomKey;

/// Which half of a synthetic key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPhase {
    Down,
    Up,
}

/// Content-changed notifications fired on the focused field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEvent {
    /// The field's value changed while typing (`input` event).
    Input,
    /// The field's value was committed (`change` event).
    Change,
}

/// A single instruction to the content host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentCommand {
    /// Ask which element holds focus.  Answered with the focus sample.
    QueryFocus,
    /// Dispatch one synthetic keyboard event to the focused element.
    DispatchKey { phase: KeyPhase, key: DomKey },
    /// Append text to the focused field's value.
    AppendText { text: String },
    /// Remove the last character of the focused field's value.
    DeleteBackward,
    /// Replace the focused field's value.
    SetValue { text: String },
    /// Fire a content-changed notification on the focused field.
    Notify { event: ContentEvent },
    /// Remove focus from the focused element.
    Blur,
    /// Submit the form enclosing the focused field, if there is one.
    SubmitForm,
    /// Load a new location in the content view.
    Navigate { location: String },
    /// Reload the current location.
    Reload,
    /// Show or hide the on-screen keyboard.
    KeyboardVisibility { visible: bool },
    /// Redraw the on-screen keyboard buttons with these captions.
    KeyboardLabels { rows: Vec<Vec<String>> },
}

impl ContentCommand {
    pub fn key_down(key: DomKey) -> Self {
        Self::DispatchKey {
            phase: KeyPhase::Down,
            key,
        }
    }

    pub fn key_up(key: DomKey) -> Self {
        Self::DispatchKey {
            phase: KeyPhase::Up,
            key,
        }
    }

    pub fn keyboard(visibility: KeyboardVisibility) -> Self {
        Self::KeyboardVisibility {
            visible: visibility.is_visible(),
        }
    }

    /// `true` for commands that change the focused field's value.
    pub fn mutates_value(&self) -> bool {
        matches!(
            self,
            Self::AppendText { .. } | Self::DeleteBackward | Self::SetValue { .. }
        )
    }

    /// Short variant name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QueryFocus => "QueryFocus",
            Self::DispatchKey { .. } => "DispatchKey",
            Self::AppendText { .. } => "AppendText",
            Self::DeleteBackward => "DeleteBackward",
            Self::SetValue { .. } => "SetValue",
            Self::Notify { .. } => "Notify",
            Self::Blur => "Blur",
            Self::SubmitForm => "SubmitForm",
            Self::Navigate { .. } => "Navigate",
            Self::Reload => "Reload",
            Self::KeyboardVisibility { .. } => "KeyboardVisibility",
            Self::KeyboardLabels { .. } => "KeyboardLabels",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

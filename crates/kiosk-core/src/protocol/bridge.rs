//! JSON envelope spoken between the terminal and the web-view shell.
//!
//! The shell is the process that owns the actual browser view and draws the
//! on-screen keyboard.  It talks to the terminal with one JSON object per
//! line:
//!
//! ```text
//! terminal → shell   {"id":7,"command":{"type":"QueryFocus"}}
//! shell → terminal   {"kind":"reply","id":7,"ok":true,"focus":{"tag_name":"INPUT"}}
//! shell → terminal   {"kind":"event","event":{"type":"KeyPressed","label":"a"}}
//! ```
//!
//! Requests carry an id so that a reply arriving after its request timed out
//! can be recognised as stale and dropped.

use serde::{Deserialize, Serialize};

use super::command::ContentCommand;
use crate::domain::focus::FocusedElement;

/// A command addressed to the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub id: u64,
    pub command: ContentCommand,
}

/// A line received from the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShellMessage {
    /// Answer to the [`BridgeRequest`] with the same id.
    Reply {
        id: u64,
        ok: bool,
        /// Focus sample; only meaningful for `QueryFocus`.  Absent or `null`
        /// means no element has focus.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        focus: Option<FocusedElement>,
        /// Host-side failure description when `ok` is false.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Something the user did in the shell.
    Event { event: UiEvent },
}

/// User actions reported by the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    /// An on-screen keyboard button was pressed; `label` is its caption.
    KeyPressed { label: String },
    /// Return to the persisted start location.
    GoHome,
    /// Persist a new start location and open it.
    SaveLocation { location: String },
    /// Reload the current page.
    Reload,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

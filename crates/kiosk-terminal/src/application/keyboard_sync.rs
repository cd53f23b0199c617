//! KeyboardSync: keeps the shell's on-screen keyboard in step with the
//! session.
//!
//! The session publishes shift-lock and visibility on `watch` channels.  This
//! task turns each change into a command for the shell:
//!
//! ```text
//! visibility change ──▶ KeyboardVisibility { visible }
//! shift-lock change ──▶ KeyboardLabels { rows }   (letters in the new case)
//! ```
//!
//! Rapid changes may be coalesced; the shell always ends up with the latest
//! state.  The task ends when the session is dropped.

use std::sync::Arc;

use kiosk_core::{keymap::layout::KeyboardLayout, ContentCommand, KeyboardVisibility};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::inject_input::{ContentHost, KioskSession};

/// Forwards session changes to the keyboard-drawing shell.
pub struct KeyboardSync {
    host: Arc<dyn ContentHost>,
    layout: KeyboardLayout,
    visibility: watch::Receiver<KeyboardVisibility>,
    caps_lock: watch::Receiver<bool>,
}

impl KeyboardSync {
    /// Subscribes to `session`.  Only changes made after this call are
    /// forwarded.
    pub fn new(host: Arc<dyn ContentHost>, session: &KioskSession) -> Self {
        Self {
            host,
            layout: KeyboardLayout::kiosk(),
            visibility: session.subscribe(),
            caps_lock: session.subscribe_caps_lock(),
        }
    }

    /// Runs until the session is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                changed = self.visibility.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let visibility = *self.visibility.borrow_and_update();
                    self.send(&ContentCommand::keyboard(visibility));
                }
                changed = self.caps_lock.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let caps_lock = *self.caps_lock.borrow_and_update();
                    self.send(&ContentCommand::KeyboardLabels {
                        rows: self.layout.labels(caps_lock),
                    });
                }
            }
        }
        debug!("keyboard sync stopped: session closed");
    }

    fn send(&self, command: &ContentCommand) {
        if let Err(e) = self.host.apply(command) {
            warn!("keyboard update failed: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

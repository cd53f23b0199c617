//! In-memory content host for tests.
//!
//! The real host is a browser page behind the JSON bridge.  The
//! [`RecordingContentHost`] models just enough of a page to observe what the
//! kiosk did: one focused element with a text value, the current location,
//! and a count of form submissions.  Every command that succeeds is appended
//! to `commands` in order.
//!
//! # Failure injection
//!
//! - `should_fail` makes every call (including the focus query) fail with
//!   [`HostError::Unavailable`].
//! - [`RecordingContentHost::reject`] makes one command variant fail with
//!   [`HostError::Rejected`], e.g. `"DispatchKey"` to exercise the RFID
//!   fallback path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use kiosk_core::{ContentCommand, FocusedElement};

use crate::application::inject_input::{ContentHost, HostError};

#[derive(Debug, Default)]
struct Page {
    focus: Option<FocusedElement>,
    value: String,
    location: Option<String>,
    submits: usize,
    reloads: usize,
    keyboard_visible: bool,
}

/// A page model that records every applied command.
#[derive(Debug, Default)]
pub struct RecordingContentHost {
    page: Mutex<Page>,
    /// Every successfully applied command, in order.
    pub commands: Mutex<Vec<ContentCommand>>,
    /// Number of focus queries answered.
    pub focus_queries: Mutex<usize>,
    rejected: Mutex<Option<&'static str>>,
    /// When `true`, every call fails.
    pub should_fail: AtomicBool,
}

impl RecordingContentHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose page has `tag_name` focused.
    pub fn with_focus(tag_name: &str) -> Self {
        let host = Self::new();
        host.set_focus(Some(tag_name));
        host
    }

    /// Moves focus to an element with `tag_name`, or clears it.  The value of
    /// the newly focused element starts empty.
    pub fn set_focus(&self, tag_name: Option<&str>) {
        if let Ok(mut page) = self.page.lock() {
            page.focus = tag_name.map(FocusedElement::new);
            page.value.clear();
        }
    }

    /// Makes commands with this variant name fail with `Rejected`.
    pub fn reject(&self, command_name: &'static str) {
        if let Ok(mut rejected) = self.rejected.lock() {
            *rejected = Some(command_name);
        }
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::Relaxed);
    }

    /// Value of the focused field.
    pub fn value(&self) -> String {
        self.page.lock().map(|p| p.value.clone()).unwrap_or_default()
    }

    pub fn focus(&self) -> Option<FocusedElement> {
        self.page.lock().ok().and_then(|p| p.focus.clone())
    }

    pub fn location(&self) -> Option<String> {
        self.page.lock().ok().and_then(|p| p.location.clone())
    }

    pub fn submits(&self) -> usize {
        self.page.lock().map(|p| p.submits).unwrap_or(0)
    }

    pub fn reloads(&self) -> usize {
        self.page.lock().map(|p| p.reloads).unwrap_or(0)
    }

    /// Last visibility the shell was told to show.
    pub fn keyboard_visible(&self) -> bool {
        self.page.lock().map(|p| p.keyboard_visible).unwrap_or(false)
    }

    /// Snapshot of the applied commands.
    pub fn applied(&self) -> Vec<ContentCommand> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), HostError> {
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(HostError::Unavailable("mock failure".into()));
        }
        Ok(())
    }
}

impl ContentHost for RecordingContentHost {
    fn focused_element(&self) -> Result<Option<FocusedElement>, HostError> {
        self.check_available()?;
        if let Ok(mut n) = self.focus_queries.lock() {
            *n += 1;
        }
        Ok(self.focus())
    }

    fn apply(&self, command: &ContentCommand) -> Result<(), HostError> {
        self.check_available()?;
        let rejected = self.rejected.lock().ok().and_then(|r| *r);
        if rejected == Some(command.name()) {
            return Err(HostError::Rejected {
                command: command.name(),
                reason: "mock rejection".into(),
            });
        }

        let mut page = self
            .page
            .lock()
            .map_err(|_| HostError::Unavailable("page lock poisoned".into()))?;
        let editable = page.focus.as_ref().is_some_and(FocusedElement::is_editable);
        match command {
            ContentCommand::AppendText { text } if editable => page.value.push_str(text),
            ContentCommand::DeleteBackward if editable => {
                page.value.pop();
            }
            ContentCommand::SetValue { text } if editable => page.value = text.clone(),
            ContentCommand::Blur => page.focus = None,
            ContentCommand::SubmitForm if editable => page.submits += 1,
            ContentCommand::Navigate { location } => {
                page.location = Some(location.clone());
                page.focus = None;
                page.value.clear();
            }
            ContentCommand::Reload => page.reloads += 1,
            ContentCommand::KeyboardVisibility { visible } => page.keyboard_visible = *visible,
            _ => {}
        }
        drop(page);

        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command.clone());
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

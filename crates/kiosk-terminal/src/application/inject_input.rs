//! FocusGatedInputInjector: forwards on-screen keys and RFID scans to the
//! focused field of the hosted page.
//!
//! The injector sits at the application layer and talks to the page through
//! the [`ContentHost`] trait.  Every effect is a structured
//! [`ContentCommand`]; the host decides how to apply it to the page.
//!
//! # Focus gating
//!
//! Keys and scans are only delivered while the page reports an editable
//! element (`INPUT` or `TEXTAREA`) as focused.  Otherwise the operation is a
//! silent no-op and reports [`Delivery::NoTarget`].
//!
//! # Session state
//!
//! Shift-lock and keyboard visibility live in a [`KioskSession`] owned by the
//! control loop and passed into each handler.  Both are published on
//! `tokio::sync::watch` channels so the rendering side can follow them without
//! sharing mutable state (see [`super::keyboard_sync`]).

use std::sync::Arc;
use std::time::Duration;

use kiosk_core::{
    ContentCommand, ContentEvent, FocusState, FocusedElement, Frame, KeyMapper,
    KeyboardVisibility, LogicalKey,
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Error type for content-host operations.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host could not be reached (e.g. its pipe is closed for writing).
    #[error("content host unavailable: {0}")]
    Unavailable(String),
    /// The host did not answer in time.
    #[error("content host did not reply within {0:?}")]
    TimedOut(Duration),
    /// The host received the command but refused it.
    #[error("content host rejected {command}: {reason}")]
    Rejected {
        command: &'static str,
        reason: String,
    },
    /// A request or reply could not be encoded or decoded.
    #[error("content host protocol error: {0}")]
    Protocol(String),
    /// The host went away while a reply was pending.
    #[error("content host disconnected")]
    Disconnected,
}

/// The page-facing capabilities the kiosk needs from its web view.
#[cfg_attr(test, mockall::automock)]
pub trait ContentHost: Send + Sync {
    /// Returns the element that currently holds input focus, if any.
    fn focused_element(&self) -> Result<Option<FocusedElement>, HostError>;

    /// Applies one command to the page.
    fn apply(&self, command: &ContentCommand) -> Result<(), HostError>;
}

/// What happened to a key press or scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Every command reached the focused field.
    Delivered,
    /// The typed path failed; the value was assigned and the form submitted.
    DeliveredViaFallback,
    /// No editable element had focus; nothing was sent.
    NoTarget,
    /// Handled entirely in the session (shift-lock toggle).
    LocalOnly,
    /// The host failed; the event was logged and discarded.
    Dropped,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Mutable UI state owned by the control loop.
#[derive(Debug)]
pub struct KioskSession {
    caps_lock: watch::Sender<bool>,
    visibility: watch::Sender<KeyboardVisibility>,
}

impl KioskSession {
    /// Shift-lock off, keyboard hidden.
    pub fn new() -> Self {
        let (caps_lock, _) = watch::channel(false);
        let (visibility, _) = watch::channel(KeyboardVisibility::Hidden);
        Self {
            caps_lock,
            visibility,
        }
    }

    pub fn caps_lock(&self) -> bool {
        *self.caps_lock.borrow()
    }

    pub fn visibility(&self) -> KeyboardVisibility {
        *self.visibility.borrow()
    }

    /// A receiver that observes every visibility change.
    pub fn subscribe(&self) -> watch::Receiver<KeyboardVisibility> {
        self.visibility.subscribe()
    }

    /// A receiver that observes every shift-lock change.
    pub fn subscribe_caps_lock(&self) -> watch::Receiver<bool> {
        self.caps_lock.subscribe()
    }

    fn toggle_caps_lock(&mut self) {
        self.caps_lock.send_modify(|on| *on = !*on);
        debug!("shift-lock {}", if self.caps_lock() { "on" } else { "off" });
    }

    fn set_visibility(&mut self, next: KeyboardVisibility) {
        let changed = self.visibility.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        if changed {
            debug!("keyboard visibility -> {next:?}");
        }
    }
}

impl Default for KioskSession {
    fn default() -> Self {
        Self::new()
    }
}

// ── Injector ──────────────────────────────────────────────────────────────────

/// Delivers logical keys and RFID frames to the focused page element.
pub struct FocusGatedInputInjector {
    host: Arc<dyn ContentHost>,
}

impl FocusGatedInputInjector {
    pub fn new(host: Arc<dyn ContentHost>) -> Self {
        Self { host }
    }

    /// Samples the focused element and sets keyboard visibility from it.
    ///
    /// A failed query leaves visibility unchanged.  Returns the visibility
    /// after the poll.
    pub fn poll(&self, session: &mut KioskSession) -> KeyboardVisibility {
        match self.host.focused_element() {
            Ok(element) => {
                let focus = FocusState::classify(element.as_ref());
                session.set_visibility(KeyboardVisibility::after_poll(focus));
            }
            Err(e) => warn!("focus poll failed: {e}"),
        }
        session.visibility()
    }

    /// Handles one on-screen keyboard press.
    pub fn send_key(&self, session: &mut KioskSession, key: LogicalKey) -> Delivery {
        match key {
            LogicalKey::CapsToggle => {
                session.toggle_caps_lock();
                Delivery::LocalOnly
            }
            LogicalKey::Close => {
                session.set_visibility(KeyboardVisibility::Hidden);
                match self.host.apply(&ContentCommand::Blur) {
                    Ok(()) => Delivery::Delivered,
                    Err(e) => {
                        warn!("blur on Close failed: {e}");
                        Delivery::Dropped
                    }
                }
            }
            _ => {
                if let Some(outcome) = self.gate("key") {
                    return outcome;
                }
                let commands = key_commands(key.with_caps(session.caps_lock()));
                match self.apply_all(&commands) {
                    Ok(()) => Delivery::Delivered,
                    Err(e) => {
                        warn!("dropping key {key:?}: {e}");
                        Delivery::Dropped
                    }
                }
            }
        }
    }

    /// Types a scanned ID into the focused field and commits it with Enter.
    ///
    /// When the typed path fails part-way the value is assigned directly,
    /// `input` and `change` are fired and the enclosing form is submitted.
    pub fn inject_frame(&self, frame: &Frame) -> Delivery {
        if let Some(outcome) = self.gate("scan") {
            return outcome;
        }

        let mut typed: Vec<ContentCommand> = frame.text().chars().flat_map(char_commands).collect();
        typed.extend(key_commands(LogicalKey::Enter));

        let Err(e) = self.apply_all(&typed) else {
            info!("scan delivered ({} chars)", frame.text().chars().count());
            return Delivery::Delivered;
        };

        warn!("typing scan failed ({e}); assigning value instead");
        let fallback = [
            ContentCommand::SetValue {
                text: frame.text().to_string(),
            },
            ContentCommand::Notify {
                event: ContentEvent::Input,
            },
            ContentCommand::Notify {
                event: ContentEvent::Change,
            },
            ContentCommand::SubmitForm,
        ];
        match self.apply_all(&fallback) {
            Ok(()) => {
                info!("scan delivered by value assignment");
                Delivery::DeliveredViaFallback
            }
            Err(e) => {
                warn!("dropping scan: {e}");
                Delivery::Dropped
            }
        }
    }

    /// `Some(outcome)` when the event must not be delivered.
    fn gate(&self, what: &str) -> Option<Delivery> {
        match self.host.focused_element() {
            Ok(element) if FocusState::classify(element.as_ref()).is_editable => None,
            Ok(_) => {
                debug!("no editable element focused; {what} ignored");
                Some(Delivery::NoTarget)
            }
            Err(e) => {
                warn!("focus query failed; {what} dropped: {e}");
                Some(Delivery::Dropped)
            }
        }
    }

    fn apply_all(&self, commands: &[ContentCommand]) -> Result<(), HostError> {
        commands.iter().try_for_each(|cmd| self.host.apply(cmd))
    }
}

/// Insert, notify, then key-down/key-up for one typed character.
fn char_commands(c: char) -> [ContentCommand; 4] {
    let dom = KeyMapper::dom_key_for_char(c);
    [
        ContentCommand::AppendText {
            text: c.to_string(),
        },
        ContentCommand::Notify {
            event: ContentEvent::Input,
        },
        ContentCommand::key_down(dom.clone()),
        ContentCommand::key_up(dom),
    ]
}

fn key_commands(key: LogicalKey) -> Vec<ContentCommand> {
    if let Some(c) = key.text() {
        return char_commands(c).to_vec();
    }
    let Some(dom) = KeyMapper::dom_key(key) else {
        return Vec::new();
    };
    let mut commands = Vec::with_capacity(4);
    if key == LogicalKey::Backspace {
        commands.push(ContentCommand::DeleteBackward);
        commands.push(ContentCommand::Notify {
            event: ContentEvent::Input,
        });
    }
    commands.push(ContentCommand::key_down(dom.clone()));
    commands.push(ContentCommand::key_up(dom));
    commands
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_core::KeyPhase;
    use std::sync::Mutex;

    type CommandLog = Arc<Mutex<Vec<ContentCommand>>>;

    /// A mock host with a fixed focus that accepts and records every command.
    fn recording_host(focus: Option<&'static str>) -> (MockContentHost, CommandLog) {
        let mut host = MockContentHost::new();
        host.expect_focused_element()
            .returning(move || Ok(focus.map(FocusedElement::new)));
        let log: CommandLog = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        host.expect_apply().returning(move |cmd| {
            sink.lock().unwrap().push(cmd.clone());
            Ok(())
        });
        (host, log)
    }

    fn make_injector(host: MockContentHost) -> FocusGatedInputInjector {
        FocusGatedInputInjector::new(Arc::new(host))
    }

    fn appended_text(log: &CommandLog) -> String {
        log.lock()
            .unwrap()
            .iter()
            .filter_map(|cmd| match cmd {
                ContentCommand::AppendText { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    // ── poll ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_poll_with_editable_focus_shows_keyboard() {
        // Arrange
        let (host, _) = recording_host(Some("INPUT"));
        let injector = make_injector(host);
        let mut session = KioskSession::new();

        // Act
        let visibility = injector.poll(&mut session);

        // Assert
        assert_eq!(visibility, KeyboardVisibility::Visible);
        assert_eq!(session.visibility(), KeyboardVisibility::Visible);
    }

    #[test]
    fn test_poll_follows_latest_sample() {
        // Arrange – focus alternates INPUT, BUTTON, nothing, TEXTAREA
        let mut host = MockContentHost::new();
        let mut samples = vec![Some("INPUT"), Some("BUTTON"), None, Some("textarea")].into_iter();
        host.expect_focused_element()
            .times(4)
            .returning(move || Ok(samples.next().flatten().map(FocusedElement::new)));
        let injector = make_injector(host);
        let mut session = KioskSession::new();

        // Act / Assert
        assert_eq!(injector.poll(&mut session), KeyboardVisibility::Visible);
        assert_eq!(injector.poll(&mut session), KeyboardVisibility::Hidden);
        assert_eq!(injector.poll(&mut session), KeyboardVisibility::Hidden);
        assert_eq!(injector.poll(&mut session), KeyboardVisibility::Visible);
    }

    #[test]
    fn test_poll_error_keeps_previous_visibility() {
        // Arrange
        let mut host = MockContentHost::new();
        let mut first = true;
        host.expect_focused_element().returning(move || {
            if std::mem::take(&mut first) {
                Ok(Some(FocusedElement::new("INPUT")))
            } else {
                Err(HostError::TimedOut(Duration::from_millis(10)))
            }
        });
        let injector = make_injector(host);
        let mut session = KioskSession::new();

        // Act
        injector.poll(&mut session);
        let after_error = injector.poll(&mut session);

        // Assert
        assert_eq!(after_error, KeyboardVisibility::Visible);
    }

    #[test]
    fn test_visibility_changes_are_published() {
        // Arrange
        let (host, _) = recording_host(Some("INPUT"));
        let injector = make_injector(host);
        let mut session = KioskSession::new();
        let mut rx = session.subscribe();

        // Act
        injector.poll(&mut session);

        // Assert
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), KeyboardVisibility::Visible);

        // A second identical sample publishes nothing new.
        injector.poll(&mut session);
        assert!(!rx.has_changed().unwrap());
    }

    // ── send_key ──────────────────────────────────────────────────────────────

    #[test]
    fn test_send_printable_key_appends_notifies_and_dispatches_pair() {
        // Arrange
        let (host, log) = recording_host(Some("INPUT"));
        let injector = make_injector(host);
        let mut session = KioskSession::new();

        // Act
        let outcome = injector.send_key(&mut session, LogicalKey::Char('a'));

        // Assert
        assert_eq!(outcome, Delivery::Delivered);
        let dom = KeyMapper::dom_key_for_char('a');
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ContentCommand::AppendText { text: "a".into() },
                ContentCommand::Notify {
                    event: ContentEvent::Input
                },
                ContentCommand::key_down(dom.clone()),
                ContentCommand::key_up(dom),
            ]
        );
    }

    #[test]
    fn test_caps_toggle_changes_letter_case_without_host_calls() {
        // Arrange
        let mut host = MockContentHost::new();
        host.expect_focused_element().never();
        host.expect_apply().never();
        let injector = make_injector(host);
        let mut session = KioskSession::new();

        // Act
        let outcome = injector.send_key(&mut session, LogicalKey::CapsToggle);

        // Assert
        assert_eq!(outcome, Delivery::LocalOnly);
        assert!(session.caps_lock());
    }

    #[test]
    fn test_caps_toggle_is_published_to_subscribers() {
        // Arrange
        let injector = make_injector(MockContentHost::new());
        let mut session = KioskSession::new();
        let mut caps = session.subscribe_caps_lock();

        // Act
        injector.send_key(&mut session, LogicalKey::CapsToggle);

        // Assert
        assert!(caps.has_changed().unwrap());
        assert!(*caps.borrow_and_update());
    }

    #[test]
    fn test_caps_lock_uppercases_typed_letters_only() {
        // Arrange
        let (host, log) = recording_host(Some("TEXTAREA"));
        let injector = make_injector(host);
        let mut session = KioskSession::new();
        injector.send_key(&mut session, LogicalKey::CapsToggle);

        // Act
        for key in [LogicalKey::Char('q'), LogicalKey::Char('1'), LogicalKey::Space] {
            injector.send_key(&mut session, key);
        }

        // Assert
        assert_eq!(appended_text(&log), "Q1 ");
    }

    #[test]
    fn test_backspace_deletes_then_dispatches_backspace_pair() {
        let (host, log) = recording_host(Some("INPUT"));
        let injector = make_injector(host);
        let mut session = KioskSession::new();

        injector.send_key(&mut session, LogicalKey::Backspace);

        let log = log.lock().unwrap();
        assert_eq!(log[0], ContentCommand::DeleteBackward);
        assert!(matches!(
            &log[2],
            ContentCommand::DispatchKey { phase: KeyPhase::Down, key } if key.key_code == 8
        ));
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_enter_dispatches_key_pair_without_mutation() {
        let (host, log) = recording_host(Some("INPUT"));
        let injector = make_injector(host);
        let mut session = KioskSession::new();

        injector.send_key(&mut session, LogicalKey::Enter);

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|cmd| !cmd.mutates_value()));
    }

    #[test]
    fn test_send_key_without_editable_focus_is_noop() {
        // Arrange
        let mut host = MockContentHost::new();
        host.expect_focused_element()
            .returning(|| Ok(Some(FocusedElement::new("BODY"))));
        host.expect_apply().never();
        let injector = make_injector(host);
        let mut session = KioskSession::new();

        // Act
        let outcome = injector.send_key(&mut session, LogicalKey::Char('x'));

        // Assert
        assert_eq!(outcome, Delivery::NoTarget);
    }

    #[test]
    fn test_close_hides_keyboard_and_blurs_regardless_of_caps() {
        // Arrange
        let (host, log) = recording_host(Some("INPUT"));
        let injector = make_injector(host);
        let mut session = KioskSession::new();
        injector.poll(&mut session);
        injector.send_key(&mut session, LogicalKey::CapsToggle);

        // Act
        let outcome = injector.send_key(&mut session, LogicalKey::Close);

        // Assert
        assert_eq!(outcome, Delivery::Delivered);
        assert_eq!(session.visibility(), KeyboardVisibility::Hidden);
        assert_eq!(*log.lock().unwrap(), vec![ContentCommand::Blur]);
    }

    #[test]
    fn test_host_failure_drops_key() {
        let mut host = MockContentHost::new();
        host.expect_focused_element()
            .returning(|| Ok(Some(FocusedElement::new("INPUT"))));
        host.expect_apply()
            .returning(|_| Err(HostError::Unavailable("not ready".into())));
        let injector = make_injector(host);
        let mut session = KioskSession::new();

        assert_eq!(
            injector.send_key(&mut session, LogicalKey::Char('z')),
            Delivery::Dropped
        );
    }

    // ── inject_frame ──────────────────────────────────────────────────────────

    #[test]
    fn test_inject_frame_types_text_then_commits_with_enter() {
        // Arrange
        let (host, log) = recording_host(Some("INPUT"));
        let injector = make_injector(host);
        let frame = Frame::from_line(b"AB12CD\r".to_vec()).unwrap();

        // Act
        let outcome = injector.inject_frame(&frame);

        // Assert
        assert_eq!(outcome, Delivery::Delivered);
        assert_eq!(appended_text(&log), "AB12CD");
        let log = log.lock().unwrap();
        assert!(matches!(
            log.last(),
            Some(ContentCommand::DispatchKey { phase: KeyPhase::Up, key }) if key.key == "Enter"
        ));
    }

    #[test]
    fn test_inject_frame_without_focus_mutates_nothing() {
        let (host, log) = recording_host(None);
        let injector = make_injector(host);
        let frame = Frame::from_line(b"AB12CD".to_vec()).unwrap();

        let outcome = injector.inject_frame(&frame);

        assert_eq!(outcome, Delivery::NoTarget);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_inject_frame_falls_back_to_value_assignment() {
        // Arrange – the host refuses synthetic key events
        let mut host = MockContentHost::new();
        host.expect_focused_element()
            .returning(|| Ok(Some(FocusedElement::new("INPUT"))));
        let log: CommandLog = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        host.expect_apply().returning(move |cmd| {
            if let ContentCommand::DispatchKey { .. } = cmd {
                return Err(HostError::Rejected {
                    command: cmd.name(),
                    reason: "untrusted event".into(),
                });
            }
            sink.lock().unwrap().push(cmd.clone());
            Ok(())
        });
        let injector = make_injector(host);
        let frame = Frame::from_line(br#"ID'"x"#.to_vec()).unwrap();

        // Act
        let outcome = injector.inject_frame(&frame);

        // Assert
        assert_eq!(outcome, Delivery::DeliveredViaFallback);
        let log = log.lock().unwrap();
        let tail = &log[log.len() - 4..];
        assert_eq!(
            tail,
            &[
                ContentCommand::SetValue {
                    text: r#"ID'"x"#.into()
                },
                ContentCommand::Notify {
                    event: ContentEvent::Input
                },
                ContentCommand::Notify {
                    event: ContentEvent::Change
                },
                ContentCommand::SubmitForm,
            ]
        );
    }

    #[test]
    fn test_inject_frame_dropped_when_fallback_fails() {
        let mut host = MockContentHost::new();
        host.expect_focused_element()
            .returning(|| Ok(Some(FocusedElement::new("INPUT"))));
        host.expect_apply()
            .returning(|_| Err(HostError::Disconnected));
        let injector = make_injector(host);
        let frame = Frame::from_line(b"0042".to_vec()).unwrap();

        assert_eq!(injector.inject_frame(&frame), Delivery::Dropped);
    }

    #[test]
    fn test_inject_frame_focus_query_failure_is_dropped() {
        let mut host = MockContentHost::new();
        host.expect_focused_element()
            .returning(|| Err(HostError::TimedOut(Duration::from_millis(5))));
        host.expect_apply().never();
        let injector = make_injector(host);
        let frame = Frame::from_line(b"0042".to_vec()).unwrap();

        assert_eq!(injector.inject_frame(&frame), Delivery::Dropped);
    }
}

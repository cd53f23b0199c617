//! The control loop: the single task on which every page-facing operation
//! runs.
//!
//! ```text
//!            ┌──────────── poll tick (fixed interval) ──▶ injector.poll
//! select! ───┼──────────── Frame from serial thread ────▶ injector.inject_frame
//!            ├──────────── UiEvent from the shell ──────▶ send_key / navigation
//!            └──────────── shutdown ────────────────────▶ return
//! ```
//!
//! Because all handlers run here one at a time, the [`KioskSession`] needs no
//! locking.  Handlers call the content host synchronously and must return
//! promptly; the host bounds each call with its reply timeout.

use std::future::Future;
use std::time::Duration;

use kiosk_core::{Frame, LogicalKey, UiEvent};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::inject_input::{Delivery, FocusGatedInputInjector, KioskSession};
use super::navigate::NavigationUseCase;

/// Default focus sampling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Owns the session and dispatches every control-thread event.
pub struct ControlLoop {
    injector: FocusGatedInputInjector,
    navigation: NavigationUseCase,
    session: KioskSession,
    poll_interval: Duration,
}

impl ControlLoop {
    pub fn new(
        injector: FocusGatedInputInjector,
        navigation: NavigationUseCase,
        session: KioskSession,
        poll_interval: Duration,
    ) -> Self {
        Self {
            injector,
            navigation,
            session,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn session(&self) -> &KioskSession {
        &self.session
    }

    /// Runs until `shutdown` resolves.
    ///
    /// A closed input channel is not fatal: the loop keeps polling focus and
    /// serving the remaining source.
    pub async fn run(
        &mut self,
        mut frames: UnboundedReceiver<Frame>,
        mut ui_events: UnboundedReceiver<UiEvent>,
        shutdown: impl Future<Output = ()>,
    ) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut frames_open = true;
        let mut events_open = true;

        info!("control loop running (focus poll every {:?})", self.poll_interval);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("control loop shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.injector.poll(&mut self.session);
                }
                frame = frames.recv(), if frames_open => match frame {
                    Some(frame) => {
                        self.handle_frame(&frame);
                    }
                    None => {
                        warn!("serial frame channel closed");
                        frames_open = false;
                    }
                },
                event = ui_events.recv(), if events_open => match event {
                    Some(event) => self.handle_ui_event(event),
                    None => {
                        warn!("shell event channel closed");
                        events_open = false;
                    }
                },
            }
        }
    }

    /// Delivers one RFID scan to the focused field.
    pub fn handle_frame(&mut self, frame: &Frame) -> Delivery {
        let outcome = self.injector.inject_frame(frame);
        debug!("scan outcome: {outcome:?}");
        outcome
    }

    /// Applies one user action reported by the shell.
    pub fn handle_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::KeyPressed { label } => match LogicalKey::from_label(&label) {
                Some(key) => {
                    let outcome = self.injector.send_key(&mut self.session, key);
                    debug!("key {key:?}: {outcome:?}");
                }
                None => warn!("ignoring unknown key label {label:?}"),
            },
            UiEvent::GoHome => {
                if let Err(e) = self.navigation.go_home() {
                    warn!("go home failed: {e}");
                }
            }
            UiEvent::SaveLocation { location } => {
                if let Err(e) = self.navigation.save_location(&location) {
                    warn!("save location failed: {e}");
                }
            }
            UiEvent::Reload => {
                if let Err(e) = self.navigation.reload() {
                    warn!("reload failed: {e}");
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

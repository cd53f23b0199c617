//! JSON-lines bridge to the web-view shell.
//!
//! The shell owns the browser view and draws the keyboard; the terminal talks
//! to it over a pair of byte streams (the process's stdout and stdin in
//! production).  Each [`ContentCommand`] becomes one [`BridgeRequest`] line;
//! the shell answers with a [`ShellMessage::Reply`] carrying the same id.
//! Unsolicited [`ShellMessage::Event`] lines report user actions.
//!
//! A dedicated reader thread ([`spawn_shell_reader`]) splits the incoming
//! stream: replies go to the [`JsonBridgeHost`] waiting on a request, events
//! go to the control loop.

use std::io::{BufRead, Write};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use kiosk_core::{BridgeRequest, ContentCommand, FocusedElement, ShellMessage, UiEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::inject_input::{ContentHost, HostError};

/// Default wait for one reply.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(1);

/// A reply line from the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellReply {
    pub id: u64,
    pub ok: bool,
    pub focus: Option<FocusedElement>,
    pub error: Option<String>,
}

struct Channel {
    writer: Box<dyn Write + Send>,
    replies: std_mpsc::Receiver<ShellReply>,
    next_id: u64,
}

/// [`ContentHost`] implemented over the JSON-lines bridge.
///
/// Requests are serialised: one request is outstanding at a time.
pub struct JsonBridgeHost {
    channel: Mutex<Channel>,
    reply_timeout: Duration,
}

impl JsonBridgeHost {
    pub fn new(
        writer: impl Write + Send + 'static,
        replies: std_mpsc::Receiver<ShellReply>,
        reply_timeout: Duration,
    ) -> Self {
        Self {
            channel: Mutex::new(Channel {
                writer: Box::new(writer),
                replies,
                next_id: 0,
            }),
            reply_timeout,
        }
    }

    /// Sends `command` and waits for its reply.
    ///
    /// # Errors
    ///
    /// - [`HostError::Unavailable`] if the request cannot be written.
    /// - [`HostError::TimedOut`] if no matching reply arrives in time.
    /// - [`HostError::Disconnected`] if the shell's stream has closed.
    /// - [`HostError::Rejected`] if the shell answers `ok: false`.
    pub fn request(&self, command: &ContentCommand) -> Result<ShellReply, HostError> {
        let mut channel = self
            .channel
            .lock()
            .map_err(|_| HostError::Unavailable("bridge lock poisoned".to_string()))?;

        channel.next_id += 1;
        let id = channel.next_id;
        let line = serde_json::to_string(&BridgeRequest {
            id,
            command: command.clone(),
        })
        .map_err(|e| HostError::Protocol(e.to_string()))?;

        writeln!(channel.writer, "{line}")
            .and_then(|()| channel.writer.flush())
            .map_err(|e| HostError::Unavailable(e.to_string()))?;

        let deadline = Instant::now() + self.reply_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match channel.replies.recv_timeout(remaining) {
                Ok(reply) if reply.id == id => {
                    if reply.ok {
                        return Ok(reply);
                    }
                    return Err(HostError::Rejected {
                        command: command.name(),
                        reason: reply.error.unwrap_or_else(|| "no reason given".to_string()),
                    });
                }
                Ok(stale) => debug!("discarding stale reply {} (awaiting {id})", stale.id),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(HostError::TimedOut(self.reply_timeout))
                }
                Err(RecvTimeoutError::Disconnected) => return Err(HostError::Disconnected),
            }
        }
    }
}

impl ContentHost for JsonBridgeHost {
    fn focused_element(&self) -> Result<Option<FocusedElement>, HostError> {
        self.request(&ContentCommand::QueryFocus)
            .map(|reply| reply.focus)
    }

    fn apply(&self, command: &ContentCommand) -> Result<(), HostError> {
        self.request(command).map(|_| ())
    }
}

/// Spawns the thread that reads shell lines from `input`.
///
/// Returns the reply receiver for [`JsonBridgeHost::new`], the UI event
/// receiver for the control loop, and the thread handle.  The thread ends at
/// end of input, closing both channels.
///
/// # Errors
///
/// Returns the OS error if the thread cannot be spawned.
pub fn spawn_shell_reader(
    input: impl BufRead + Send + 'static,
) -> std::io::Result<(
    std_mpsc::Receiver<ShellReply>,
    mpsc::UnboundedReceiver<UiEvent>,
    JoinHandle<()>,
)> {
    let (reply_tx, reply_rx) = std_mpsc::channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let handle = thread::Builder::new()
        .name("kiosk-shell-reader".to_string())
        .spawn(move || shell_read_loop(input, &reply_tx, &event_tx))?;

    Ok((reply_rx, event_rx, handle))
}

fn shell_read_loop(
    input: impl BufRead,
    replies: &std_mpsc::Sender<ShellReply>,
    events: &mpsc::UnboundedSender<UiEvent>,
) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("shell input error: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<ShellMessage>(line) {
            Ok(ShellMessage::Reply {
                id,
                ok,
                focus,
                error,
            }) => {
                // Nobody waiting means the host is gone; keep draining events.
                let _ = replies.send(ShellReply {
                    id,
                    ok,
                    focus,
                    error,
                });
            }
            Ok(ShellMessage::Event { event }) => {
                if events.send(event).is_err() {
                    debug!("UI event dropped: control loop has exited");
                }
            }
            Err(e) => warn!("ignoring malformed shell line: {e}"),
        }
    }
    info!("shell input closed");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

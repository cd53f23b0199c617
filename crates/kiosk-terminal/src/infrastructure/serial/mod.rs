//! Self-healing serial reader for the RFID card reader.
//!
//! [`SerialLinkReader`] owns one background thread that keeps a connection to
//! a fixed device path, splits the byte stream into lines with a
//! [`LineFramer`] and hands every [`Frame`] to the control loop over an
//! unbounded tokio channel.
//!
//! # Connection lifecycle
//!
//! ```text
//!  start()
//!    │
//!    ▼
//!  open ──fail──▶ wait reconnect_delay ──▶ open ...
//!    │ ok
//!    ▼
//!  read loop ──I/O error──▶ close, drop partial line, wait reconnect_delay ──▶ open ...
//!    │
//!  stop() (observed at every blocking-call boundary)
//!    ▼
//!  close, thread exits, stop() returns
//! ```
//!
//! There is no retry limit and no jitter: a kiosk waits for its reader for as
//! long as it runs.
//!
//! # Cancellation
//!
//! `start()` hands the worker the receiving end of a stop channel.  `stop()`
//! drops the sending end, which the worker sees as `Disconnected` the next
//! time it checks, including while it sleeps between reconnect attempts
//! (the sleep is a `recv_timeout` on that channel).  A blocking read is bounded
//! by the port's read timeout, so `stop()` returns within about one read
//! timeout.

pub mod mock;
pub mod native;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use kiosk_core::{domain::frame::DEFAULT_MAX_LINE_LEN, Frame, LineFramer};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// How long the read loop yields when no bytes are waiting.
const IDLE_YIELD: Duration = Duration::from_millis(10);

/// Size of the per-read buffer.
const READ_CHUNK: usize = 256;

/// Error type for serial device access.
#[derive(Debug, Error)]
pub enum SerialError {
    /// Nothing exists at the device path (reader unplugged).
    #[error("serial device {path} not present")]
    NoSuchDevice { path: String },

    /// The device exists but could not be opened.
    #[error("failed to open serial device {path}: {reason}")]
    Open { path: String, reason: String },

    /// A read or status query failed on an open device.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection parameters for the card reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    /// Stable device path, preferably a `/dev/serial/by-id/...` symlink.
    pub device_path: String,
    pub baud_rate: u32,
    /// Upper bound on one blocking read; also bounds `stop()` latency.
    pub read_timeout: Duration,
    /// Fixed wait between a failure and the next open attempt.
    pub reconnect_delay: Duration,
    /// Longest line accepted before it is discarded.
    pub max_line_len: usize,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            device_path: String::new(),
            baud_rate: 115_200,
            read_timeout: Duration::from_secs(1),
            reconnect_delay: Duration::from_secs(2),
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// An open connection to the device.
pub trait SerialLink: Send {
    /// Number of bytes that can be read without blocking.
    fn bytes_available(&mut self) -> Result<usize, SerialError>;

    /// Reads up to `buf.len()` bytes.  `Ok(0)` means the read timed out.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError>;
}

/// Opens connections to the device named in [`LinkSettings`].
pub trait SerialConnector: Send + Sync {
    fn open(&self, settings: &LinkSettings) -> Result<Box<dyn SerialLink>, SerialError>;
}

struct Worker {
    stop_tx: std_mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Background reader delivering [`Frame`]s from the card reader.
pub struct SerialLinkReader {
    connector: Arc<dyn SerialConnector>,
    settings: LinkSettings,
    frames: mpsc::UnboundedSender<Frame>,
    connected: Arc<AtomicBool>,
    worker: Option<Worker>,
}

impl SerialLinkReader {
    /// Creates a stopped reader and the receiver its frames arrive on.
    pub fn new(
        connector: Arc<dyn SerialConnector>,
        settings: LinkSettings,
    ) -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (frames, rx) = mpsc::unbounded_channel();
        let reader = Self {
            connector,
            settings,
            frames,
            connected: Arc::new(AtomicBool::new(false)),
            worker: None,
        };
        (reader, rx)
    }

    /// Spawns the reader thread.  Returns immediately; no-op if already
    /// running.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::Io`] if the OS refuses to spawn the thread.
    pub fn start(&mut self) -> Result<(), SerialError> {
        if self.is_running() {
            debug!("serial reader already running");
            return Ok(());
        }
        // Reap a worker that exited on its own.
        self.stop();

        let (stop_tx, stop_rx) = std_mpsc::channel();
        let connector = Arc::clone(&self.connector);
        let settings = self.settings.clone();
        let frames = self.frames.clone();
        let connected = Arc::clone(&self.connected);

        let handle = thread::Builder::new()
            .name("kiosk-serial-reader".to_string())
            .spawn(move || read_loop(connector.as_ref(), &settings, &frames, &connected, &stop_rx))?;

        info!(
            "serial reader started for {} at {} baud",
            self.settings.device_path, self.settings.baud_rate
        );
        self.worker = Some(Worker { stop_tx, handle });
        Ok(())
    }

    /// Signals the thread to finish and waits for it to exit.
    ///
    /// Safe to call in any state and more than once.
    pub fn stop(&mut self) {
        let Some(Worker { stop_tx, handle }) = self.worker.take() else {
            return;
        };
        drop(stop_tx);
        if handle.join().is_err() {
            error!("serial reader thread panicked");
        }
        self.connected.store(false, Ordering::Relaxed);
    }

    /// `true` while the reader thread is alive.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// `true` while the device is open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }
}

impl Drop for SerialLinkReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Worker thread ─────────────────────────────────────────────────────────────

/// `true` once `stop()` has been called.
fn stop_requested(stop_rx: &std_mpsc::Receiver<()>) -> bool {
    !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty))
}

/// Sleeps for `delay` unless stopped first.  Returns `true` when stopped.
fn sleep_or_stop(stop_rx: &std_mpsc::Receiver<()>, delay: Duration) -> bool {
    !matches!(stop_rx.recv_timeout(delay), Err(RecvTimeoutError::Timeout))
}

enum LinkEnd {
    Stopped,
    Failed,
}

fn read_loop(
    connector: &dyn SerialConnector,
    settings: &LinkSettings,
    frames: &mpsc::UnboundedSender<Frame>,
    connected: &AtomicBool,
    stop_rx: &std_mpsc::Receiver<()>,
) {
    let mut framer = LineFramer::new(settings.max_line_len);
    let mut reported_missing = false;

    while !stop_requested(stop_rx) {
        match connector.open(settings) {
            Ok(mut link) => {
                info!("serial device {} connected", settings.device_path);
                reported_missing = false;
                connected.store(true, Ordering::Relaxed);
                let end = pump(link.as_mut(), &mut framer, frames, stop_rx);
                connected.store(false, Ordering::Relaxed);
                framer.reset();
                drop(link);
                if let LinkEnd::Stopped = end {
                    break;
                }
            }
            Err(e) if reported_missing => debug!("serial open failed: {e}"),
            Err(e) => {
                warn!(
                    "serial device unavailable, retrying every {:?}: {e}",
                    settings.reconnect_delay
                );
                reported_missing = true;
            }
        }
        if sleep_or_stop(stop_rx, settings.reconnect_delay) {
            break;
        }
        debug!("retrying serial device {}", settings.device_path);
    }

    info!("serial reader stopped");
}

/// Reads from an open link until it fails or a stop is requested.
fn pump(
    link: &mut dyn SerialLink,
    framer: &mut LineFramer,
    frames: &mpsc::UnboundedSender<Frame>,
    stop_rx: &std_mpsc::Receiver<()>,
) -> LinkEnd {
    let mut buf = [0u8; READ_CHUNK];

    loop {
        if stop_requested(stop_rx) {
            return LinkEnd::Stopped;
        }

        let available = match link.bytes_available() {
            Ok(n) => n,
            Err(e) => {
                warn!("serial device lost: {e}");
                return LinkEnd::Failed;
            }
        };
        if available == 0 {
            if sleep_or_stop(stop_rx, IDLE_YIELD) {
                return LinkEnd::Stopped;
            }
            continue;
        }

        let want = available.min(buf.len());
        let n = match link.read(&mut buf[..want]) {
            Ok(n) => n,
            Err(e) => {
                warn!("serial read failed: {e}");
                return LinkEnd::Failed;
            }
        };

        for frame in framer.push(&buf[..n]) {
            debug!("scan frame of {} bytes", frame.raw().len());
            if frames.send(frame).is_err() {
                // Receiver dropped: nobody will consume scans any more.
                info!("frame receiver closed; stopping serial reader");
                return LinkEnd::Stopped;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

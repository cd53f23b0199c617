//! Scripted serial connector for tests.
//!
//! The real connector needs a card reader on a USB port.  The
//! [`MockSerialConnector`] instead walks through a script of open outcomes:
//! each entry is either `None` (the device is missing, open fails) or
//! `Some(reads)` (open succeeds and the link replays `reads`).  Once the
//! script is used up every further open fails, as if the reader had been
//! unplugged for good.
//!
//! Every open attempt is timestamped so tests can check the reconnect
//! backoff.
//!
//! ```ignore
//! let connector = Arc::new(MockSerialConnector::new(vec![
//!     None,                                         // missing at startup
//!     Some(vec![MockRead::Data(b"0042\n".to_vec())]),
//! ]));
//! let (mut reader, mut frames) = SerialLinkReader::new(connector.clone(), settings);
//! reader.start()?;
//! ```

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;
use std::time::Instant;

use super::{LinkSettings, SerialConnector, SerialError, SerialLink};

/// One step replayed by a [`MockSerialLink`].
#[derive(Debug, Clone)]
pub enum MockRead {
    /// Bytes that become available to read.
    Data(Vec<u8>),
    /// The link fails with this I/O error kind (e.g. the cable was pulled).
    Error(io::ErrorKind),
}

/// Connector that replays a script of open outcomes.
#[derive(Default)]
pub struct MockSerialConnector {
    script: Mutex<VecDeque<Option<Vec<MockRead>>>>,
    attempts: Mutex<Vec<Instant>>,
}

impl MockSerialConnector {
    pub fn new(script: Vec<Option<Vec<MockRead>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// A device that never appears.
    pub fn always_missing() -> Self {
        Self::default()
    }

    /// Number of `open` calls so far.
    pub fn open_attempts(&self) -> usize {
        self.attempts.lock().map(|a| a.len()).unwrap_or(0)
    }

    /// When each `open` call happened.
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempts.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl SerialConnector for MockSerialConnector {
    fn open(&self, settings: &LinkSettings) -> Result<Box<dyn SerialLink>, SerialError> {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(Instant::now());
        }
        let next = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .flatten();
        match next {
            Some(reads) => Ok(Box::new(MockSerialLink::new(reads))),
            None => Err(SerialError::NoSuchDevice {
                path: settings.device_path.clone(),
            }),
        }
    }
}

/// Link that replays queued reads, then stays idle.
#[derive(Debug, Default)]
pub struct MockSerialLink {
    pending: VecDeque<MockRead>,
}

impl MockSerialLink {
    pub fn new(reads: Vec<MockRead>) -> Self {
        Self {
            pending: reads.into(),
        }
    }
}

impl SerialLink for MockSerialLink {
    fn bytes_available(&mut self) -> Result<usize, SerialError> {
        match self.pending.front() {
            Some(MockRead::Data(bytes)) => Ok(bytes.len()),
            Some(MockRead::Error(kind)) => {
                let kind = *kind;
                self.pending.pop_front();
                Err(SerialError::Io(kind.into()))
            }
            None => Ok(0),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let Some(MockRead::Data(bytes)) = self.pending.front_mut() else {
            return Ok(0);
        };
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        bytes.drain(..n);
        if bytes.is_empty() {
            self.pending.pop_front();
        }
        Ok(n)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

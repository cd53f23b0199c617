//! Line framing for the RFID reader's serial byte stream.
//!
//! The reader firmware prints one scanned identifier per line.  Bytes arrive
//! from the serial port in arbitrary chunks (a single scan may be split over
//! several reads, or several scans may arrive in one read), so the
//! [`LineFramer`] buffers bytes until it sees a line terminator and then turns
//! the buffered line into a [`Frame`].
//!
//! # Decoding rules
//!
//! - The terminator is `\n`.  A preceding `\r` is removed by the trailing
//!   whitespace trim, so `\r\n` devices work unchanged.
//! - Invalid UTF-8 sequences are dropped, never fatal.  A reader with a noisy
//!   line still produces the valid characters around the noise.
//! - Trailing whitespace is stripped.  Leading whitespace is kept.
//! - A line that is empty after the trim produces no frame.
//! - A line longer than the configured maximum is discarded up to and
//!   including its terminator, so a device that never sends `\n` cannot grow
//!   the buffer without bound.  The `\r` of a `\r\n` terminator does not
//!   count toward the maximum.

use std::mem;

use tracing::warn;

/// The byte that terminates one scan on the wire.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Default upper bound on a buffered line, in bytes.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// One decoded, trimmed line received from the card reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    raw: Vec<u8>,
    text: String,
}

impl Frame {
    /// Builds a frame from the bytes of one line (terminator excluded).
    ///
    /// Returns `None` when the decoded line is empty after trimming trailing
    /// whitespace.
    pub fn from_line(raw: Vec<u8>) -> Option<Self> {
        let decoded = decode_lossy(&raw);
        let text = decoded.trim_end();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            raw,
        })
    }

    /// The bytes of the line exactly as received, without the terminator.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The decoded, trimmed scan text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the frame and returns its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Decodes `bytes` as UTF-8, dropping every invalid sequence.
fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Accumulates serial bytes and splits them into [`Frame`]s.
#[derive(Debug)]
pub struct LineFramer {
    buf: Vec<u8>,
    max_line_len: usize,
    /// Set while skipping the remainder of an over-long line.
    discarding: bool,
}

impl LineFramer {
    /// Creates a framer that discards lines longer than `max_line_len` bytes.
    pub fn new(max_line_len: usize) -> Self {
        let max_line_len = max_line_len.max(1);
        Self {
            buf: Vec::with_capacity(max_line_len.min(DEFAULT_MAX_LINE_LEN)),
            max_line_len,
            discarding: false,
        }
    }

    /// Feeds newly received bytes and returns every frame they complete, in
    /// arrival order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut rest = bytes;

        while let Some(pos) = rest.iter().position(|&b| b == LINE_TERMINATOR) {
            self.extend(&rest[..pos]);
            if let Some(frame) = self.finish_line() {
                frames.push(frame);
            }
            rest = &rest[pos + 1..];
        }
        self.extend(rest);

        frames
    }

    /// Drops any partially buffered line (e.g. after the device disconnects).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }

    /// Number of bytes buffered for the line in progress.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    fn extend(&mut self, chunk: &[u8]) {
        if self.discarding || chunk.is_empty() {
            return;
        }
        // Room for the `\r` of a `\r\n` pair, which the trim removes anyway.
        let carriage_return = usize::from(chunk.last() == Some(&b'\r'));
        if self.buf.len() + chunk.len() > self.max_line_len + carriage_return {
            warn!(
                "discarding serial line longer than {} bytes without a terminator",
                self.max_line_len
            );
            self.buf.clear();
            self.discarding = true;
            return;
        }
        self.buf.extend_from_slice(chunk);
    }

    fn finish_line(&mut self) -> Option<Frame> {
        if self.discarding {
            self.discarding = false;
            self.buf.clear();
            return None;
        }
        Frame::from_line(mem::take(&mut self.buf))
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

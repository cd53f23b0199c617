//! `serialport`-backed connector for the physical card reader.
//!
//! The reader is an ESP32 USB-JTAG serial bridge; on Linux it is best named by
//! its `/dev/serial/by-id/...` symlink, which survives re-enumeration when the
//! cable is replugged.

use std::io::{self, Read};

use serialport::{ErrorKind, SerialPort};

use super::{LinkSettings, SerialConnector, SerialError, SerialLink};

/// Opens the configured device with the `serialport` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSerialConnector;

impl SerialConnector for NativeSerialConnector {
    fn open(&self, settings: &LinkSettings) -> Result<Box<dyn SerialLink>, SerialError> {
        let port = serialport::new(settings.device_path.as_str(), settings.baud_rate)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| open_error(&settings.device_path, e))?;

        Ok(Box::new(NativeSerialLink { port }))
    }
}

fn open_error(path: &str, e: serialport::Error) -> SerialError {
    match e.kind {
        ErrorKind::NoDevice | ErrorKind::Io(io::ErrorKind::NotFound) => SerialError::NoSuchDevice {
            path: path.to_string(),
        },
        _ => SerialError::Open {
            path: path.to_string(),
            reason: e.description,
        },
    }
}

struct NativeSerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink for NativeSerialLink {
    fn bytes_available(&mut self) -> Result<usize, SerialError> {
        let n = self
            .port
            .bytes_to_read()
            .map_err(|e| SerialError::Io(io::Error::other(e)))?;
        Ok(n as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

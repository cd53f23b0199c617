//! kiosk-terminal library entry point.
//!
//! Re-exports all modules so that integration tests in `tests/` and the
//! binary entry point in `main.rs` share the same module tree.
//!
//! # What does the kiosk terminal do?
//!
//! The kiosk shows a full-screen ordering website.  This process sits beside
//! the web view and:
//!
//! 1. Reads scanned card IDs from an RFID reader on a serial port, surviving
//!    unplug/replug indefinitely.
//! 2. Polls which page element has focus and shows the on-screen keyboard
//!    while a text field is focused.
//! 3. Types on-screen key presses and scanned IDs into the focused field.
//! 4. Keeps the kiosk's start location and serves the home/reload menu.
//!
//! The web view itself is an external shell process reached over a JSON-lines
//! bridge on stdin/stdout.

/// Application layer: use cases and the control loop.
pub mod application;

/// Infrastructure layer: serial port, content-host bridge, and storage.
pub mod infrastructure;

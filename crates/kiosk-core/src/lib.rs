//! # kiosk-core
//!
//! Shared library for the RFID kiosk terminal containing the serial line
//! framing, focus classification, logical key tables and the structured
//! command protocol spoken to the content host (the embedded web view).
//!
//! It has zero dependencies on OS APIs, serial drivers, UI toolkits, or
//! network sockets, so every rule here can be unit-tested on any machine.
//!
//! # Architecture overview
//!
//! The kiosk is a full-screen ordering website with two input aids: an
//! on-screen keyboard that appears while a text field has focus, and an
//! RFID card reader whose scanned ID is typed into the focused field.
//!
//! - **`domain`** – What a scan looks like once it leaves the wire
//!   ([`Frame`], built by the [`LineFramer`]) and how the focused element
//!   decides keyboard visibility ([`FocusState`], [`KeyboardVisibility`]).
//!
//! - **`keymap`** – The logical keys the on-screen keyboard produces and their
//!   DOM `KeyboardEvent` descriptors.
//!
//! - **`protocol`** – Structured commands sent to the content host instead of
//!   executable script strings, plus the JSON envelope used by the bridge to
//!   the web-view shell.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::focus::{FocusState, FocusedElement, KeyboardVisibility};
pub use domain::frame::{Frame, LineFramer};
pub use keymap::{DomKey, KeyMapper, LogicalKey};
pub use protocol::bridge::{BridgeRequest, ShellMessage, UiEvent};
pub use protocol::command::{ContentCommand, ContentEvent, KeyPhase};

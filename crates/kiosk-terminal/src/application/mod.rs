//! Application layer use cases for the kiosk terminal.
//!
//! - **`inject_input`** – Focus-gated delivery of on-screen keys and RFID
//!   scans to the hosted page, plus the [`KioskSession`] that holds shift-lock
//!   and keyboard visibility.  The page is reached through the
//!   [`ContentHost`] trait, implemented in the infrastructure layer.
//!
//! - **`navigate`** – Start location persistence and the menu actions that
//!   move the page (home, save location, reload).
//!
//! - **`keyboard_sync`** – Forwards shift-lock and visibility changes to the
//!   shell that draws the on-screen keyboard.
//!
//! - **`control_loop`** – The single task that serialises focus polling,
//!   scan delivery and shell events.
//!
//! [`KioskSession`]: inject_input::KioskSession
//! [`ContentHost`]: inject_input::ContentHost

pub mod control_loop;
pub mod inject_input;
pub mod keyboard_sync;
pub mod navigate;

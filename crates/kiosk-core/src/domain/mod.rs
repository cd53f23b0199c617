//! Domain entities for the kiosk terminal.
//!
//! Pure rules with no infrastructure dependencies: how bytes from the card
//! reader become scan frames, and how the focused element in the hosted page
//! drives the on-screen keyboard.

/// Newline framing of the serial byte stream into scan frames.
pub mod frame;

/// Focus classification and the keyboard visibility state machine.
pub mod focus;

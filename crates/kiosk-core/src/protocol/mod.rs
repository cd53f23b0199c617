//! Protocol module: structured content-host commands and the bridge envelope.

pub mod bridge;
pub mod command;

pub use bridge::{BridgeRequest, ShellMessage, UiEvent};
pub use command::{ContentCommand, ContentEvent, KeyPhase};

//! Content-host adapters.
//!
//! - **`json_bridge`** – The production [`ContentHost`] that speaks JSON lines
//!   to the web-view shell.
//! - **`mock`** – An in-memory page model that records every command, used by
//!   unit and integration tests.
//!
//! [`ContentHost`]: crate::application::inject_input::ContentHost

pub mod json_bridge;
pub mod mock;

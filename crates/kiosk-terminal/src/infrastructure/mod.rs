//! Infrastructure layer for the kiosk terminal.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `kiosk_core`, but MUST NOT be imported by the `application` layer.
//!
//! - **`serial`** – The self-healing serial reader thread and its
//!   `serialport`-backed connector.
//! - **`content_host`** – The JSON-lines bridge to the web-view shell, and a
//!   recording host for tests.
//! - **`storage`** – TOML configuration and the persisted start location.

pub mod content_host;
pub mod serial;
pub mod storage;

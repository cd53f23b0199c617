//! Storage infrastructure: configuration file and start-location persistence.
//!
//! - **`config`** – Reads the TOML configuration from the platform config
//!   directory (or an explicit path), with defaults for everything.
//! - **`location`** – The single-line file holding the kiosk's start location.

pub mod config;
pub mod location;

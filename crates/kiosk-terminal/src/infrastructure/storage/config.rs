//! TOML-based configuration for the kiosk terminal.
//!
//! The config file lives in the platform-appropriate directory:
//! - Linux:    `$XDG_CONFIG_HOME/kiosk-terminal/config.toml`
//!   (or `~/.config/kiosk-terminal/config.toml`)
//! - Windows:  `%APPDATA%\KioskTerminal\config.toml`
//! - macOS:    `~/Library/Application Support/KioskTerminal/config.toml`
//!
//! A missing file means "all defaults", and every field has a serde default,
//! so a file only needs the values that differ:
//!
//! ```toml
//! [serial]
//! device_path = "/dev/serial/by-id/usb-Espressif_USB_JTAG_serial_debug_unit_94:A9:90:98:0B:78-if00"
//! baud_rate = 115200
//!
//! [kiosk]
//! default_location = "https://pesatkantin.com/order-self"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use kiosk_core::domain::frame::DEFAULT_MAX_LINE_LEN;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::serial::LinkSettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub kiosk: KioskConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Card reader connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    /// Stable path of the reader's character device.
    #[serde(default = "default_device_path")]
    pub device_path: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Bound on one blocking read, in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Fixed wait between failed open attempts, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Lines longer than this many bytes are discarded.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
}

/// Page and keyboard behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KioskConfig {
    /// Focus sampling period, in milliseconds.
    #[serde(default = "default_focus_poll_interval_ms")]
    pub focus_poll_interval_ms: u64,
    /// File holding the persisted start location.  Relative paths are
    /// resolved against the config file's directory.
    #[serde(default = "default_location_file")]
    pub location_file: PathBuf,
    /// Start location used when nothing usable is persisted.
    #[serde(default = "default_location")]
    pub default_location: String,
}

/// Web-view shell bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    /// Wait for each shell reply, in milliseconds.
    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_device_path() -> String {
    "/dev/serial/by-id/usb-Espressif_USB_JTAG_serial_debug_unit_94:A9:90:98:0B:78-if00".to_string()
}
fn default_baud_rate() -> u32 {
    115_200
}
fn default_read_timeout_ms() -> u64 {
    1000
}
fn default_reconnect_delay_ms() -> u64 {
    2000
}
fn default_max_line_len() -> usize {
    DEFAULT_MAX_LINE_LEN
}
fn default_focus_poll_interval_ms() -> u64 {
    500
}
fn default_location_file() -> PathBuf {
    PathBuf::from("location.txt")
}
fn default_location() -> String {
    "https://pesatkantin.com/order-self".to_string()
}
fn default_reply_timeout_ms() -> u64 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device_path: default_device_path(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_line_len: default_max_line_len(),
        }
    }
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            focus_poll_interval_ms: default_focus_poll_interval_ms(),
            location_file: default_location_file(),
            default_location: default_location(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            reply_timeout_ms: default_reply_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl SerialConfig {
    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            device_path: self.device_path.clone(),
            baud_rate: self.baud_rate,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
            max_line_len: self.max_line_len,
        }
    }
}

impl KioskConfig {
    pub fn focus_poll_interval(&self) -> Duration {
        Duration::from_millis(self.focus_poll_interval_ms)
    }

    /// The location file path, anchored at `config_dir` when relative.
    pub fn resolve_location_file(&self, config_dir: &Path) -> PathBuf {
        if self.location_file.is_absolute() {
            self.location_file.clone()
        } else {
            config_dir.join(&self.location_file)
        }
    }
}

impl BridgeConfig {
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the default location.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KioskTerminal"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("kiosk-terminal"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KioskTerminal")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Kiosk terminal entry point.
//!
//! Wires the card reader, the web-view shell bridge and the control loop
//! together, then runs until Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load config (file, then CLI overrides)
//!  └─ start services
//!       ├─ shell reader     (stdin thread: replies + UI events)
//!       ├─ SerialLinkReader (serial thread: Frames)
//!       ├─ KeyboardSync     (Tokio task: session watches -> keyboard commands)
//!       └─ ControlLoop      (main task: poll / scans / UI events)
//! ```

use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use kiosk_terminal::application::control_loop::ControlLoop;
use kiosk_terminal::application::inject_input::{ContentHost, FocusGatedInputInjector, KioskSession};
use kiosk_terminal::application::keyboard_sync::KeyboardSync;
use kiosk_terminal::application::navigate::NavigationUseCase;
use kiosk_terminal::infrastructure::content_host::json_bridge::{spawn_shell_reader, JsonBridgeHost};
use kiosk_terminal::infrastructure::serial::native::NativeSerialConnector;
use kiosk_terminal::infrastructure::serial::SerialLinkReader;
use kiosk_terminal::infrastructure::storage::config::{self, AppConfig};
use kiosk_terminal::infrastructure::storage::location::LocationStore;

/// RFID kiosk terminal.
#[derive(Debug, Parser)]
#[command(name = "kiosk-terminal", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "KIOSK_CONFIG")]
    config: Option<PathBuf>,

    /// Serial device of the card reader (overrides the config file).
    #[arg(long, env = "KIOSK_SERIAL_DEVICE")]
    device: Option<String>,

    /// Baud rate of the card reader (overrides the config file).
    #[arg(long, env = "KIOSK_SERIAL_BAUD")]
    baud: Option<u32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut cfg, config_dir): (AppConfig, PathBuf) = match &cli.config {
        Some(path) => (
            config::load_config_from(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            path.parent().map(PathBuf::from).unwrap_or_default(),
        ),
        None => (
            config::load_config().context("loading config")?,
            config::config_dir().context("resolving config directory")?,
        ),
    };
    if let Some(device) = cli.device {
        cfg.serial.device_path = device;
    }
    if let Some(baud) = cli.baud {
        cfg.serial.baud_rate = baud;
    }

    // Logs go to stderr; stdout carries the shell bridge.  Level is
    // overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&cfg.logging.log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("kiosk terminal starting (config dir {})", config_dir.display());

    // ── Shell bridge ──────────────────────────────────────────────────────────
    let (replies, ui_events, _shell_thread) =
        spawn_shell_reader(BufReader::new(std::io::stdin())).context("spawning shell reader")?;
    let host: Arc<dyn ContentHost> = Arc::new(JsonBridgeHost::new(
        std::io::stdout(),
        replies,
        cfg.bridge.reply_timeout(),
    ));

    // ── Navigation ────────────────────────────────────────────────────────────
    let store = LocationStore::new(
        cfg.kiosk.resolve_location_file(&config_dir),
        cfg.kiosk.default_location.clone(),
    );
    let navigation = NavigationUseCase::new(Arc::clone(&host), Arc::new(store));
    match navigation.go_home() {
        Ok(location) => info!("opened start location {location}"),
        Err(e) => warn!("could not open start location: {e}"),
    }

    // ── Card reader ───────────────────────────────────────────────────────────
    let (mut reader, frames) =
        SerialLinkReader::new(Arc::new(NativeSerialConnector), cfg.serial.link_settings());
    reader.start().context("starting serial reader")?;

    // ── Keyboard sync ─────────────────────────────────────────────────────────
    let session = KioskSession::new();
    let pump = tokio::spawn(KeyboardSync::new(Arc::clone(&host), &session).run());

    // ── Control loop ──────────────────────────────────────────────────────────
    let mut control = ControlLoop::new(
        FocusGatedInputInjector::new(host),
        navigation,
        session,
        cfg.kiosk.focus_poll_interval(),
    );
    control
        .run(frames, ui_events, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await;

    // Dropping the loop closes the session watches and ends the sync task.
    drop(control);
    if let Err(e) = pump.await {
        error!("keyboard sync failed: {e}");
    }

    tokio::task::spawn_blocking(move || reader.stop())
        .await
        .context("stopping serial reader")?;

    info!("kiosk terminal stopped");
    Ok(())
}

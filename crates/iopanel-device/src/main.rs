//! IoPanel device entry point.
//!
//! Wires together configuration, persisted state, the protocol engine and
//! the UDP runtime, then runs the Tokio event loop until Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()             -- config.toml (written with defaults on first run)
//!  └─ TomlKvStore::open()       -- state.toml: device id, preferences
//!  └─ ProtocolEngine::new()     -- identity, registry, session
//!  └─ PanelRuntime::run()       -- connect, select! loop, reconnect
//! ```
//!
//! This binary runs headless: sensors, dialogs and the image codec are the
//! in-memory implementations from `infrastructure::collaborators`.  A
//! platform shell replaces them and feeds touches in through the
//! `PanelInput` channel.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use iopanel_core::{ControlRegistry, DeviceIdentity, Size};
use iopanel_device::application::collaborators::{
    Collaborators, PersistentKv, KEY_RUN_IN_BACKGROUND,
};
use iopanel_device::application::engine::ProtocolEngine;
use iopanel_device::application::session::{load_device_id, load_run_in_background, SessionState};
use iopanel_device::infrastructure::collaborators::{
    RawImageCodec, RecordingImagePicker, RecordingTextEditor, StaticSensors, WatchRenderSink,
};
use iopanel_device::infrastructure::network::resolve::{http_client, ServerTarget};
use iopanel_device::infrastructure::network::runtime::{PanelInput, PanelRuntime, RuntimeConfig};
use iopanel_device::infrastructure::network::UdpConnector;
use iopanel_device::infrastructure::storage::config::{
    config_dir, config_file_path, load_config, save_config, AppConfig,
};
use iopanel_device::infrastructure::storage::kv::{TomlKvStore, STATE_FILE_NAME};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let first_run = config_file_path().map(|p| !p.exists()).unwrap_or(false);
    let config = load_config().unwrap_or_else(|e| {
        eprintln!("using default config: {e}");
        AppConfig::default()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.device.log_level)),
        )
        .init();

    info!("IoPanel device starting");

    // Leave an editable config.toml behind on first run.
    if first_run {
        match save_config(&config) {
            Ok(()) => info!("wrote default config"),
            Err(e) => warn!("could not write default config: {e}"),
        }
    }

    // ── Persisted state ───────────────────────────────────────────────────────
    let state_path = config_dir()
        .context("locating config directory")?
        .join(STATE_FILE_NAME);
    let kv: Arc<dyn PersistentKv> =
        Arc::new(TomlKvStore::open(&state_path).context("opening device state")?);

    let device_id = load_device_id(kv.as_ref());
    // The stored preference wins over the config file once it exists.
    let run_in_background = match kv.get(KEY_RUN_IN_BACKGROUND) {
        Some(_) => load_run_in_background(kv.as_ref()),
        None => config.device.run_in_background,
    };
    info!(device = %device_id, run_in_background, "device identity loaded");

    // ── Engine ────────────────────────────────────────────────────────────────
    let sink = Arc::new(WatchRenderSink::new());
    let collaborators = Collaborators {
        sensors: Arc::new(StaticSensors::new()),
        text_editor: Arc::new(RecordingTextEditor::new()),
        image_picker: Arc::new(RecordingImagePicker::new()),
        image_codec: Arc::new(RawImageCodec),
    };
    let mut engine = ProtocolEngine::new(
        DeviceIdentity::new(device_id),
        ControlRegistry::new(sink),
        SessionState::new(run_in_background),
        collaborators,
    );
    engine.set_canvas_size(Size::new(config.canvas.width, config.canvas.height));

    // ── Network ───────────────────────────────────────────────────────────────
    let http = http_client(config.network.lookup_timeout()).context("building HTTP client")?;
    let connector = Arc::new(UdpConnector::new(
        ServerTarget::from_config(&config.network),
        http,
    ));
    let runtime_config = RuntimeConfig {
        heartbeat_interval: config.network.heartbeat_interval(),
        ..RuntimeConfig::default()
    };

    let (input_tx, input_rx) = mpsc::channel(256);

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            if input_tx.send(PanelInput::Shutdown).await.is_err() {
                warn!("runtime already stopped");
            }
        }
    });

    info!(server = %config.network.server_address, "connecting");
    PanelRuntime::new(engine, connector, kv, input_rx, runtime_config)
        .run()
        .await;

    info!("IoPanel device stopped");
    Ok(())
}

//! Connection lifecycle and liveness.
//!
//! ```text
//!               begin_connect            mark_live
//! Disconnected ───────────────▶ Connecting ─────────▶ Live
//!      ▲                             │                 │
//!      └─────── mark_disconnected ───┴─────────────────┘
//! ```
//!
//! A session is *live* when it is connected and the app is allowed to talk:
//! either it is in the foreground, or the user enabled "run in background".
//! Only a live session processes requests and sends packets.
//!
//! Reconnecting is automatic in the foreground.  In the background the
//! session waits until the app comes back before trying again.

use iopanel_core::DeviceId;
use tracing::{info, warn};

use super::collaborators::{PersistentKv, KEY_DEVICE_ID, KEY_RUN_IN_BACKGROUND};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Live,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    state: ConnectionState,
    foreground: bool,
    run_in_background: bool,
    ack_seen: bool,
}

impl SessionState {
    /// A disconnected session for an app starting in the foreground.
    pub fn new(run_in_background: bool) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            foreground: true,
            run_in_background,
            ack_seen: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }

    pub fn run_in_background(&self) -> bool {
        self.run_in_background
    }

    pub fn is_live(&self) -> bool {
        self.state == ConnectionState::Live && (self.foreground || self.run_in_background)
    }

    pub fn begin_connect(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    pub fn mark_live(&mut self) {
        self.state = ConnectionState::Live;
        self.ack_seen = false;
    }

    pub fn mark_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    /// Whether a transport failure right now should trigger a reconnect.
    pub fn should_reconnect(&self) -> bool {
        self.state == ConnectionState::Disconnected && self.foreground
    }

    /// Records a foreground change.  Returns `true` if the app just came back
    /// to the foreground without a connection and should reconnect now.
    pub fn set_foreground(&mut self, foreground: bool) -> bool {
        let returning = foreground && !self.foreground;
        self.foreground = foreground;
        returning && self.state == ConnectionState::Disconnected
    }

    pub fn set_run_in_background(&mut self, enabled: bool) {
        self.run_in_background = enabled;
    }

    /// Records a heartbeat acknowledgement.  Returns `true` only for the
    /// first one on the current connection.
    pub fn acknowledge(&mut self) -> bool {
        !std::mem::replace(&mut self.ack_seen, true)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Loads the persisted device id, generating and storing one on first run.
///
/// A stored value of the wrong length is replaced.  A failure to persist is
/// logged and the fresh id is used for this run anyway.
pub fn load_device_id(kv: &dyn PersistentKv) -> DeviceId {
    if let Some(id) = kv.get(KEY_DEVICE_ID).and_then(|b| DeviceId::from_slice(&b)) {
        return id;
    }
    let id = DeviceId::generate();
    info!(device = %id, "generated new device id");
    if let Err(e) = kv.set(KEY_DEVICE_ID, id.as_bytes()) {
        warn!("could not persist device id: {e}");
    }
    id
}

/// Loads the run-in-background preference (default off).
pub fn load_run_in_background(kv: &dyn PersistentKv) -> bool {
    kv.get(KEY_RUN_IN_BACKGROUND)
        .and_then(|b| b.first().copied())
        .map(|b| b != 0)
        .unwrap_or(false)
}

/// Persists the run-in-background preference.
pub fn store_run_in_background(kv: &dyn PersistentKv, enabled: bool) {
    if let Err(e) = kv.set(KEY_RUN_IN_BACKGROUND, &[u8::from(enabled)]) {
        warn!("could not persist run_in_background: {e}");
    }
}

//! Interfaces to everything the platform provides.
//!
//! The engine asks these traits for sensor readings, text and image input,
//! image encoding and persistent storage.  Real devices implement them on
//! top of their OS APIs; `infrastructure::collaborators` has in-memory
//! versions for headless runs and tests.
//!
//! The dialog collaborators are fire-and-forget: `request_edit` and
//! `request_image` return immediately and the result arrives later as a
//! `PanelInput` message carrying the same [`InstanceKey`].

use std::sync::Arc;

use iopanel_core::domain::controls::RawImage;
use iopanel_core::{InstanceKey, SensorKind};
use thiserror::Error;

/// Errors from a [`PersistentKv`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stored state: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("stored value for {key} is not valid hex")]
    Corrupt { key: String },
}

/// Source of sensor readings.
#[cfg_attr(test, mockall::automock)]
pub trait SensorProvider: Send + Sync {
    /// The latest reading, or `None` if the sensor is absent or not ready.
    fn read(&self, kind: SensorKind) -> Option<Vec<f64>>;
}

/// Opens a text-entry dialog for a text field.
#[cfg_attr(test, mockall::automock)]
pub trait TextEditCollaborator: Send + Sync {
    fn request_edit(&self, key: InstanceKey, initial: &str);
}

/// Opens an image picker for an image display.
#[cfg_attr(test, mockall::automock)]
pub trait ImagePickerCollaborator: Send + Sync {
    fn request_image(&self, key: InstanceKey);
}

/// Converts between transport-encoded images and raw pixels.
#[cfg_attr(test, mockall::automock)]
pub trait ImageCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Option<RawImage>;
    fn encode(&self, image: &RawImage) -> Option<Vec<u8>>;
}

/// Small persistent key-value store for the device id and preferences.
#[cfg_attr(test, mockall::automock)]
pub trait PersistentKv: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// Key under which the 6-byte device id is stored.
pub const KEY_DEVICE_ID: &str = "device_id";

/// Key under which the run-in-background preference (one byte, 0/1) is stored.
pub const KEY_RUN_IN_BACKGROUND: &str = "run_in_background";

/// The collaborators the engine calls while handling traffic.
#[derive(Clone)]
pub struct Collaborators {
    pub sensors: Arc<dyn SensorProvider>,
    pub text_editor: Arc<dyn TextEditCollaborator>,
    pub image_picker: Arc<dyn ImagePickerCollaborator>,
    pub image_codec: Arc<dyn ImageCodec>,
}

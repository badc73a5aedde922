//! In-memory collaborators for headless runs and tests.
//!
//! # Why in-memory collaborators?
//!
//! The real collaborators need a phone: a sensor framework, modal dialogs,
//! a PNG codec and an app sandbox to store preferences in.  These versions
//! keep everything in `Mutex`-protected fields instead, so:
//!
//! - the binary can run on a desktop with a fixed set of sensor readings;
//! - tests can inspect exactly which dialogs were requested and in what
//!   order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let editor = Arc::new(RecordingTextEditor::new());
//! // ... tap a text field ...
//! let requests = editor.requests.lock().unwrap();
//! assert_eq!(requests[0].1, "initial text");
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use iopanel_core::domain::controls::RawImage;
use iopanel_core::protocol::codec::{CodecError, PayloadReader, PayloadWriter};
use iopanel_core::{InstanceKey, RenderSink, SensorKind};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::application::collaborators::{
    ImageCodec, ImagePickerCollaborator, PersistentKv, SensorProvider, StorageError,
    TextEditCollaborator,
};

// ── Sensors ───────────────────────────────────────────────────────────────────

/// Sensor readings set by hand.  Unset sensors read as unavailable.
#[derive(Debug, Default)]
pub struct StaticSensors {
    readings: Mutex<HashMap<SensorKind, Vec<f64>>>,
}

impl StaticSensors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, kind: SensorKind, values: Vec<f64>) {
        if let Ok(mut readings) = self.readings.lock() {
            readings.insert(kind, values);
        }
    }

    pub fn clear(&self, kind: SensorKind) {
        if let Ok(mut readings) = self.readings.lock() {
            readings.remove(&kind);
        }
    }
}

impl SensorProvider for StaticSensors {
    fn read(&self, kind: SensorKind) -> Option<Vec<f64>> {
        self.readings.lock().ok()?.get(&kind).cloned()
    }
}

// ── Dialogs ───────────────────────────────────────────────────────────────────

/// Records every text-entry request as `(key, initial text)`.
#[derive(Debug, Default)]
pub struct RecordingTextEditor {
    pub requests: Mutex<Vec<(InstanceKey, String)>>,
}

impl RecordingTextEditor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextEditCollaborator for RecordingTextEditor {
    fn request_edit(&self, key: InstanceKey, initial: &str) {
        debug!(key = key.value(), "text edit requested");
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((key, initial.to_string()));
        }
    }
}

/// Records every image-pick request.
#[derive(Debug, Default)]
pub struct RecordingImagePicker {
    pub requests: Mutex<Vec<InstanceKey>>,
}

impl RecordingImagePicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImagePickerCollaborator for RecordingImagePicker {
    fn request_image(&self, key: InstanceKey) {
        debug!(key = key.value(), "image pick requested");
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(key);
        }
    }
}

// ── Image codec ───────────────────────────────────────────────────────────────

/// Uncompressed image transport: `width u32, height u32, rgba bytes`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawImageCodec;

impl RawImageCodec {
    fn parse(bytes: &[u8]) -> Result<Option<RawImage>, CodecError> {
        let mut r = PayloadReader::new(bytes);
        let width = r.u32()?;
        let height = r.u32()?;
        Ok(RawImage::from_rgba(width, height, r.rest().to_vec()))
    }
}

impl ImageCodec for RawImageCodec {
    fn decode(&self, bytes: &[u8]) -> Option<RawImage> {
        Self::parse(bytes).ok().flatten()
    }

    fn encode(&self, image: &RawImage) -> Option<Vec<u8>> {
        let out = PayloadWriter::default()
            .u32(image.width)
            .u32(image.height)
            .bytes(&image.rgba)
            .finish();
        Some(out)
    }
}

// ── Render sink ───────────────────────────────────────────────────────────────

/// Publishes a generation counter that increases on every invalidation.
///
/// A presentation layer holds a [`watch::Receiver`] from [`subscribe`]
/// and redraws whenever it changes.
///
/// [`subscribe`]: WatchRenderSink::subscribe
#[derive(Debug)]
pub struct WatchRenderSink {
    generation: watch::Sender<u64>,
    pub messages: Mutex<Vec<String>>,
}

impl WatchRenderSink {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            generation,
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }
}

impl Default for WatchRenderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for WatchRenderSink {
    fn invalidate(&self) {
        self.generation.send_modify(|g| *g = g.wrapping_add(1));
    }

    fn notify(&self, message: &str) {
        info!("{message}");
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

// ── Key-value store ───────────────────────────────────────────────────────────

/// A [`PersistentKv`] that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryKv {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentKv for MemoryKv {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Corrupt {
            key: key.to_string(),
        })?;
        values.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

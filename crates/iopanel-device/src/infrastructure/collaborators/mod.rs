//! Platform collaborator implementations.
//!
//! A real handset wires the engine to its sensor framework, dialogs and
//! image codecs.  The in-memory versions in [`mock`] stand in for all of
//! them, so the binary can run headless and tests can observe every call.

pub mod mock;

pub use mock::{
    MemoryKv, RawImageCodec, RecordingImagePicker, RecordingTextEditor, StaticSensors,
    WatchRenderSink,
};

//! iopanel-device library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does iopanel-device do? (for beginners)
//!
//! The device is the handheld side of IoPanel.  It:
//!
//! 1. Loads (or creates) its 6-byte device id and keeps a rotating password.
//! 2. Opens a UDP "connection" to the server, resolving the server's port
//!    over HTTP first when the server is configured by hostname.
//! 3. Sends a heartbeat right away and then every 30 seconds.
//! 4. Answers authenticated requests: create and remove controls, read and
//!    write their state, read sensors, and stream sensor snapshots.
//! 5. Turns touches on its controls into event packets for the server.
//!
//! The protocol logic lives in [`application`]; sockets, files and platform
//! stand-ins live in [`infrastructure`].

/// Application layer: protocol engine, session state and collaborator traits.
pub mod application;

/// Infrastructure layer: UDP link, runtime loop, config and storage.
pub mod infrastructure;

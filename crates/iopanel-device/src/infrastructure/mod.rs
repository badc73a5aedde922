//! Infrastructure layer for the device application.
//!
//! Contains the OS-facing adapters: the UDP link and the runtime loop that
//! drives the engine, TOML configuration, the persistent key-value store and
//! in-memory stand-ins for the platform collaborators.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `iopanel_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`network`** – `DatagramLink`/`Connector` traits, the tokio UDP
//!   implementation, server address resolution and the `PanelRuntime`
//!   `select!` loop.
//! - **`storage`** – `config.toml` and `state.toml` in the platform config
//!   directory.
//! - **`collaborators`** – In-memory sensors, dialogs, image codec, render
//!   sink and key-value store for headless runs and tests.

pub mod collaborators;
pub mod network;
pub mod storage;

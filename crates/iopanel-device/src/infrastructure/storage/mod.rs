//! Storage infrastructure: configuration and persisted device state.
//!
//! - **`config`** reads and writes `config.toml`, falling back to defaults on
//!   first run.
//! - **`kv`** implements [`PersistentKv`](crate::application::collaborators::PersistentKv)
//!   on top of `state.toml` in the same directory.

pub mod config;
pub mod kv;

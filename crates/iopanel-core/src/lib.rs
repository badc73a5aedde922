//! # iopanel-core
//!
//! Shared library for IoPanel containing the datagram codec, the virtual
//! control model, the control registry and the pointer router.
//!
//! It has zero dependencies on OS APIs, UI frameworks, or network sockets.
//! The device application (`iopanel-device`) wires it to a UDP link, timers,
//! and the platform collaborators (sensors, image codec, dialogs).
//!
//! # Architecture overview (for beginners)
//!
//! IoPanel turns a handheld device into a remote-controlled panel: a server
//! on the network creates buttons, sliders, joysticks and other controls on
//! the device screen, reads back their state, and receives events when the
//! user touches them.
//!
//! - **`protocol`** – How bytes travel over the network.  Every request is a
//!   single opcode byte followed by an 8-byte password and a fixed-layout body.
//!   Replies and events are prefixed with the 6-byte device id.
//!
//! - **`domain`** – Pure business logic with no OS dependencies: geometry,
//!   the control variants and their capability traits, the registry that owns
//!   z-order, the pointer router, sensor kinds, and the device identity with
//!   its rotating password.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `iopanel_core::ControlRegistry` instead of `iopanel_core::domain::registry::ControlRegistry`.
pub use domain::controls::{Control, ControlEvent, ControlId, Interaction};
pub use domain::geometry::{Color, Point, Rect, Size};
pub use domain::identity::{DeviceId, DeviceIdentity};
pub use domain::pointer::{PointerId, PointerRouter};
pub use domain::registry::{AddStatus, ControlRegistry, InstanceKey, RenderSink};
pub use domain::sensors::SensorKind;
pub use protocol::frame::{frame_outbound, DropReason};
pub use protocol::opcodes::Opcode;

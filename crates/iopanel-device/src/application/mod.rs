//! Application layer for the device.
//!
//! # What lives here?
//!
//! - **`engine`** – The [`ProtocolEngine`](engine::ProtocolEngine): checks the
//!   password on every request, dispatches it by opcode, and turns pointer
//!   input into outbound events.  It never touches a socket; it returns
//!   [`Effect`](engine::Effect)s that the runtime loop carries out.
//! - **`add_control`** – Parses the eight add-control request layouts into
//!   [`Control`](iopanel_core::Control) values.
//! - **`session`** – Connection state, liveness and the reconnect policy.
//! - **`sensor_push`** – Push-period selection and sensor packet encoding.
//! - **`image_budget`** – Shrinks images until their encoding fits a datagram.
//! - **`collaborators`** – Traits for everything the platform provides:
//!   sensors, dialogs, the image codec and persistent storage.

pub mod add_control;
pub mod collaborators;
pub mod engine;
pub mod image_budget;
pub mod sensor_push;
pub mod session;

//! Domain entities for IoPanel.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What lives here? (for beginners)
//!
//! - [`geometry`] – points, rectangles, colours and the landscape-aware frame
//!   every control is positioned with.
//! - [`controls`] – the nine control variants and the capability traits
//!   (`TextLike`, `ToggleLike`, …) the protocol queries them through.
//! - [`registry`] – the ordered set of controls currently on screen.  Order is
//!   z-order: the last control added is drawn on top and hit first.
//! - [`pointer`] – turns raw pointer down/move/up events into control
//!   interactions, one pointer per control at a time.
//! - [`identity`] – the persistent device id and the rotating password.
//! - [`sensors`] – the sensor kinds the server can query.
//!
//! Nothing in here opens a socket or touches a screen.  The device crate owns
//! those concerns and drives these types from a single task.

pub mod controls;
pub mod geometry;
pub mod identity;
pub mod pointer;
pub mod registry;
pub mod sensors;
pub mod throttle;

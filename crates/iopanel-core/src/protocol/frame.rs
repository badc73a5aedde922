//! Datagram framing and the password gate.
//!
//! # Datagram layout (for beginners)
//!
//! Requests arriving from the server are *bare payloads*:
//!
//! ```text
//! ┌────────┬──────────────────────────┬─────────────────────────┐
//! │ opcode │ password (u64, BE)       │ body (opcode-specific)  │
//! │ 1 byte │ 8 bytes                  │ 0..N bytes              │
//! └────────┴──────────────────────────┴─────────────────────────┘
//! ```
//!
//! The single exception is the heartbeat acknowledgement, which is just the
//! one byte `I` and carries no password.
//!
//! Everything the device sends (replies and unsolicited events) is prefixed
//! so the server can tell devices apart:
//!
//! ```text
//! ┌─────────────────┬────────────────┬──────────────────────────┐
//! │ device id       │ reserved (0)   │ payload                  │
//! │ 6 bytes         │ 4 bytes        │ opcode + body            │
//! └─────────────────┴────────────────┴──────────────────────────┘
//! ```

use thiserror::Error;

use super::codec::{decode_u64, CodecError};
use super::opcodes::Opcode;
use crate::domain::identity::DeviceId;

/// Size of the device-id + reserved prefix on every outbound datagram.
pub const FRAME_PREFIX_LEN: usize = 10;

/// Size of `opcode + password` on every authenticated request.
pub const AUTH_HEADER_LEN: usize = 9;

/// Why an inbound datagram was discarded without a reply.
///
/// None of these are reported to the sender; the engine only logs them.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DropReason {
    #[error("empty datagram")]
    Empty,

    /// Fewer than [`AUTH_HEADER_LEN`] bytes, so there is no password to check.
    #[error("datagram too short for auth header ({len} bytes)")]
    MissingPassword { len: usize },

    #[error("password mismatch")]
    BadPassword,

    #[error("unknown opcode 0x{0:02X}")]
    UnknownOpcode(u8),

    /// The payload failed an opcode-specific length or content check.
    #[error("malformed payload: {0}")]
    Malformed(#[from] CodecError),

    /// The session is not live, so traffic is not processed.
    #[error("session not live")]
    NotLive,
}

/// Prefixes `payload` with the device id and the 4 reserved zero bytes.
///
/// # Examples
///
/// ```rust
/// use iopanel_core::{frame_outbound, DeviceId};
///
/// let id = DeviceId::from_bytes([1, 2, 3, 4, 5, 6]);
/// let datagram = frame_outbound(&id, b"a");
/// assert_eq!(datagram, [1, 2, 3, 4, 5, 6, 0, 0, 0, 0, b'a']);
/// ```
pub fn frame_outbound(device_id: &DeviceId, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_PREFIX_LEN + payload.len());
    out.extend_from_slice(device_id.as_bytes());
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(payload);
    out
}

/// Returns `true` if `payload` is the bare heartbeat acknowledgement.
pub fn is_heartbeat_ack(payload: &[u8]) -> bool {
    payload == [Opcode::Heartbeat as u8]
}

/// Checks the password field of an inbound request.
///
/// # Errors
///
/// - [`DropReason::Empty`] for a zero-length payload.
/// - [`DropReason::MissingPassword`] when there is no room for a password.
/// - [`DropReason::BadPassword`] when the password does not match.
pub fn authenticate(payload: &[u8], password: u64) -> Result<(), DropReason> {
    if payload.is_empty() {
        return Err(DropReason::Empty);
    }
    if payload.len() < AUTH_HEADER_LEN {
        return Err(DropReason::MissingPassword { len: payload.len() });
    }
    let mut field = [0u8; 8];
    field.copy_from_slice(&payload[1..AUTH_HEADER_LEN]);
    if decode_u64(field) != password {
        return Err(DropReason::BadPassword);
    }
    Ok(())
}

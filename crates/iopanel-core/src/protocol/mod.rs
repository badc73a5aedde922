//! Protocol module containing opcodes, the byte codec, and datagram framing.

pub mod codec;
pub mod frame;
pub mod opcodes;
pub mod sequence;

pub use codec::{require_empty, require_len, PayloadReader, PayloadWriter};
pub use frame::{authenticate, frame_outbound, DropReason, AUTH_HEADER_LEN, FRAME_PREFIX_LEN};
pub use opcodes::{EventOpcode, Opcode};
pub use sequence::SequenceCounter;

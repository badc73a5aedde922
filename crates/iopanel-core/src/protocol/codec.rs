//! Big-endian byte codec for IoPanel datagrams.
//!
//! Every multi-byte field on the wire is big-endian:
//!
//! ```text
//! u32 / f32 / color : 4 bytes
//! u64 / f64         : 8 bytes
//! color             : (alpha << 24) | (red << 16) | (green << 8) | blue
//! ```
//!
//! The `decode_*` functions take fixed-size arrays, so an undersized slice
//! can never reach them.  Variable-length payloads are read through
//! [`PayloadReader`], which bounds-checks every field and returns
//! [`CodecError::InsufficientData`] instead of panicking.  Callers are
//! still expected to check a message's minimum length up front with
//! [`require_len`] before reading any field.

use thiserror::Error;

use crate::domain::geometry::Color;

/// Errors that can occur while reading a payload.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CodecError {
    /// The byte slice is shorter than the field (or message) requires.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// A text field was not valid UTF-8.
    #[error("invalid UTF-8 in text field")]
    InvalidUtf8,

    /// A request that carries no body came with extra bytes.
    #[error("unexpected {extra} trailing bytes")]
    TrailingData { extra: usize },
}

// ── Fixed-width encode / decode ───────────────────────────────────────────────

/// Decodes a big-endian `u32`.
pub fn decode_u32(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Encodes a `u32` as big-endian bytes.
pub fn encode_u32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decodes a big-endian `u64`.
pub fn decode_u64(bytes: [u8; 8]) -> u64 {
    u64::from_be_bytes(bytes)
}

/// Encodes a `u64` as big-endian bytes.
pub fn encode_u64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decodes a big-endian IEEE 754 `f32`.
pub fn decode_f32(bytes: [u8; 4]) -> f32 {
    f32::from_bits(decode_u32(bytes))
}

/// Encodes an `f32` as big-endian IEEE 754 bytes.
pub fn encode_f32(value: f32) -> [u8; 4] {
    encode_u32(value.to_bits())
}

/// Decodes a big-endian IEEE 754 `f64`.
pub fn decode_f64(bytes: [u8; 8]) -> f64 {
    f64::from_bits(decode_u64(bytes))
}

/// Encodes an `f64` as big-endian IEEE 754 bytes.
pub fn encode_f64(value: f64) -> [u8; 8] {
    encode_u64(value.to_bits())
}

/// Decodes a packed ARGB colour, normalising every channel to `[0, 1]`.
pub fn decode_color(bytes: [u8; 4]) -> Color {
    Color::from_packed(decode_u32(bytes))
}

/// Encodes a colour as packed ARGB.
pub fn encode_color(color: Color) -> [u8; 4] {
    encode_u32(color.to_packed())
}

/// Returns an error unless `buf` holds at least `needed` bytes.
///
/// # Errors
///
/// Returns [`CodecError::InsufficientData`] when the slice is too short.
pub fn require_len(buf: &[u8], needed: usize) -> Result<(), CodecError> {
    if buf.len() < needed {
        Err(CodecError::InsufficientData {
            needed,
            available: buf.len(),
        })
    } else {
        Ok(())
    }
}

/// Returns an error unless `buf` is empty.
///
/// # Errors
///
/// Returns [`CodecError::TrailingData`] when any byte is left over.
pub fn require_empty(buf: &[u8]) -> Result<(), CodecError> {
    match buf.len() {
        0 => Ok(()),
        extra => Err(CodecError::TrailingData { extra }),
    }
}

// ── PayloadReader ─────────────────────────────────────────────────────────────

/// A bounds-checked cursor over a request payload.
///
/// # Examples
///
/// ```rust
/// use iopanel_core::protocol::codec::PayloadReader;
///
/// let bytes = [0x00, 0x00, 0x00, 0x2A, 3, b'a', b'b', b'c'];
/// let mut reader = PayloadReader::new(&bytes);
/// assert_eq!(reader.u32().unwrap(), 42);
/// assert_eq!(reader.short_bytes().unwrap(), b"abc");
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct PayloadReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    /// Creates a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Creates a reader positioned at `offset`.
    pub fn at(buf: &'a [u8], offset: usize) -> Self {
        Self {
            buf,
            pos: offset.min(buf.len()),
        }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads exactly `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InsufficientData`] if fewer than `n` bytes remain.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let end = self.pos + n;
        if end > self.buf.len() {
            return Err(CodecError::InsufficientData {
                needed: end,
                available: self.buf.len(),
            });
        }
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.array::<1>()?[0])
    }

    /// Reads a byte and interprets any non-zero value as `true`.
    pub fn flag(&mut self) -> Result<bool, CodecError> {
        Ok(self.u8()? != 0)
    }

    pub fn u32(&mut self) -> Result<u32, CodecError> {
        self.array().map(decode_u32)
    }

    pub fn u64(&mut self) -> Result<u64, CodecError> {
        self.array().map(decode_u64)
    }

    pub fn f32(&mut self) -> Result<f32, CodecError> {
        self.array().map(decode_f32)
    }

    pub fn f64(&mut self) -> Result<f64, CodecError> {
        self.array().map(decode_f64)
    }

    pub fn color(&mut self) -> Result<Color, CodecError> {
        self.array().map(decode_color)
    }

    /// Reads a one-byte length prefix followed by that many bytes.
    pub fn short_bytes(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.u8()? as usize;
        self.bytes(len)
    }

    /// Consumes and returns every remaining byte.
    pub fn rest(&mut self) -> &'a [u8] {
        let out = &self.buf[self.pos..];
        self.pos = self.buf.len();
        out
    }

    /// Consumes every remaining byte as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidUtf8`] if the bytes are not valid UTF-8.
    pub fn rest_utf8(&mut self) -> Result<String, CodecError> {
        let raw = self.rest();
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8)
    }
}

// ── PayloadWriter ─────────────────────────────────────────────────────────────

/// Builder for outbound payloads.
#[derive(Debug, Default, Clone)]
pub struct PayloadWriter {
    buf: Vec<u8>,
}

impl PayloadWriter {
    /// Starts a payload with the given opcode byte.
    pub fn with_opcode(opcode: u8) -> Self {
        Self { buf: vec![opcode] }
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.buf.push(value);
        self
    }

    pub fn flag(self, value: bool) -> Self {
        self.u8(u8::from(value))
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.buf.extend_from_slice(&encode_u32(value));
        self
    }

    pub fn f32(mut self, value: f32) -> Self {
        self.buf.extend_from_slice(&encode_f32(value));
        self
    }

    pub fn f64(mut self, value: f64) -> Self {
        self.buf.extend_from_slice(&encode_f64(value));
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.buf.extend_from_slice(value);
        self
    }

    /// Writes a one-byte length prefix followed by `value`.
    ///
    /// Values longer than 255 bytes are truncated to 255.
    pub fn short_bytes(mut self, value: &[u8]) -> Self {
        let len = value.len().min(u8::MAX as usize);
        self.buf.push(len as u8);
        self.buf.extend_from_slice(&value[..len]);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

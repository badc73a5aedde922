//! Per-stream sequence numbers for continuous events.
//!
//! # Why sequence numbers? (for beginners)
//!
//! UDP datagrams can arrive out of order or not at all.  Sliders, joysticks
//! and touchpads stream many small updates, so each update carries a `u32`
//! sequence number.  The server keeps the highest number it has seen for a
//! control and discards anything older, which stops a late datagram from
//! snapping a joystick back to a stale position.
//!
//! Each control owns its own counter, as does the sensor push stream.  A
//! counter starts at 0 and increases by exactly 1 per emitted event.

/// A monotonically increasing `u32` counter.
///
/// Wraps from `u32::MAX` back to 0 without panicking.
///
/// # Examples
///
/// ```rust
/// use iopanel_core::protocol::SequenceCounter;
///
/// let mut counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 0);
/// assert_eq!(counter.next(), 1);
/// assert_eq!(counter.peek(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceCounter {
    next: u32,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next sequence number and advances the counter.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u32 {
        let value = self.next;
        self.next = self.next.wrapping_add(1);
        value
    }

    /// Returns the number the next call to [`next`](Self::next) will produce.
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Starts over from 0.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

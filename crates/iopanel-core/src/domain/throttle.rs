//! Rate limiting for continuous-interaction events.
//!
//! Sliders, joysticks and touchpads can generate a move event for every
//! frame the finger is down.  The throttle lets the first and last events of
//! a gesture through unconditionally and spaces the ones in between at least
//! [`THROTTLE_INTERVAL`] apart.

use std::time::{Duration, Instant};

use crate::protocol::SequenceCounter;

/// Minimum wall-clock spacing between move-driven emissions.
pub const THROTTLE_INTERVAL: Duration = Duration::from_millis(100);

/// Decides whether an event may be sent and numbers the ones that are.
#[derive(Debug, Clone, Default)]
pub struct EventThrottle {
    seq: SequenceCounter,
    last_emit: Option<Instant>,
}

impl EventThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sequence number to send with, or `None` if the event must
    /// be suppressed.
    ///
    /// A `forced` event (pointer down or up) is always admitted.
    pub fn admit(&mut self, now: Instant, forced: bool) -> Option<u32> {
        let due = match self.last_emit {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= THROTTLE_INTERVAL,
        };
        if !(forced || due) {
            return None;
        }
        self.last_emit = Some(now);
        Some(self.seq.next())
    }

    /// The sequence number the next admitted event will carry.
    pub fn next_seq(&self) -> u32 {
        self.seq.peek()
    }
}

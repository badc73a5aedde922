//! Events a control sends to the server on its own initiative.
//!
//! ```text
//! b                              ++ id      button pressed
//! z, checked u8                  ++ id      toggle / radio changed
//! d, seq u32, level f32          ++ id      slider moved
//! K, seq u32, x f32, y f32       ++ id      joystick moved
//! n, seq u32, tag u8 [, x, y]    ++ id      touchpad moved (tag 0 = released)
//! t, len u8, id                  ++ text    text edited
//! f                              ++ id      image picked
//! ```
//!
//! The id goes last wherever the rest of the packet has a fixed size, so it
//! needs no length prefix.  A text event ends with free-length text, so its
//! id is length-prefixed instead.

use super::ControlId;
use crate::protocol::codec::PayloadWriter;
use crate::protocol::opcodes::EventOpcode;

#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    ButtonPressed {
        id: ControlId,
    },
    ToggleChanged {
        id: ControlId,
        checked: bool,
    },
    SliderMoved {
        id: ControlId,
        seq: u32,
        level: f32,
    },
    JoystickMoved {
        id: ControlId,
        seq: u32,
        x: f32,
        y: f32,
    },
    TouchpadMoved {
        id: ControlId,
        seq: u32,
        position: Option<(f32, f32)>,
    },
    TextChanged {
        id: ControlId,
        text: String,
    },
    ImageChanged {
        id: ControlId,
    },
}

impl ControlEvent {
    pub fn id(&self) -> &ControlId {
        match self {
            ControlEvent::ButtonPressed { id }
            | ControlEvent::ToggleChanged { id, .. }
            | ControlEvent::SliderMoved { id, .. }
            | ControlEvent::JoystickMoved { id, .. }
            | ControlEvent::TouchpadMoved { id, .. }
            | ControlEvent::TextChanged { id, .. }
            | ControlEvent::ImageChanged { id } => id,
        }
    }

    /// The sequence number, for the throttled kinds.
    pub fn seq(&self) -> Option<u32> {
        match self {
            ControlEvent::SliderMoved { seq, .. }
            | ControlEvent::JoystickMoved { seq, .. }
            | ControlEvent::TouchpadMoved { seq, .. } => Some(*seq),
            _ => None,
        }
    }

    /// Encodes the event payload (without the device-id frame prefix).
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ControlEvent::ButtonPressed { id } => {
                PayloadWriter::with_opcode(EventOpcode::ButtonPressed as u8)
                    .bytes(id.as_bytes())
                    .finish()
            }
            ControlEvent::ToggleChanged { id, checked } => {
                PayloadWriter::with_opcode(EventOpcode::ToggleChanged as u8)
                    .flag(*checked)
                    .bytes(id.as_bytes())
                    .finish()
            }
            ControlEvent::SliderMoved { id, seq, level } => {
                PayloadWriter::with_opcode(EventOpcode::SliderMoved as u8)
                    .u32(*seq)
                    .f32(*level)
                    .bytes(id.as_bytes())
                    .finish()
            }
            ControlEvent::JoystickMoved { id, seq, x, y } => {
                PayloadWriter::with_opcode(EventOpcode::JoystickMoved as u8)
                    .u32(*seq)
                    .f32(*x)
                    .f32(*y)
                    .bytes(id.as_bytes())
                    .finish()
            }
            ControlEvent::TouchpadMoved { id, seq, position } => {
                let w = PayloadWriter::with_opcode(EventOpcode::TouchpadMoved as u8).u32(*seq);
                let w = match position {
                    Some((x, y)) => w.u8(1).f32(*x).f32(*y),
                    None => w.u8(0),
                };
                w.bytes(id.as_bytes()).finish()
            }
            ControlEvent::TextChanged { id, text } => {
                PayloadWriter::with_opcode(EventOpcode::TextChanged as u8)
                    .short_bytes(id.as_bytes())
                    .bytes(text.as_bytes())
                    .finish()
            }
            ControlEvent::ImageChanged { id } => {
                PayloadWriter::with_opcode(EventOpcode::ImageChanged as u8)
                    .bytes(id.as_bytes())
                    .finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::encode_f32;

    #[test]
    fn test_button_event_is_opcode_then_id() {
        let ev = ControlEvent::ButtonPressed { id: "go".into() };
        assert_eq!(ev.encode(), b"bgo");
    }

    #[test]
    fn test_toggle_event_carries_state_byte() {
        let ev = ControlEvent::ToggleChanged {
            id: "t".into(),
            checked: true,
        };
        assert_eq!(ev.encode(), vec![b'z', 1, b't']);
    }

    #[test]
    fn test_slider_event_layout() {
        // Arrange
        let ev = ControlEvent::SliderMoved {
            id: "s".into(),
            seq: 3,
            level: 0.5,
        };

        // Act
        let bytes = ev.encode();

        // Assert
        assert_eq!(bytes[0], b'd');
        assert_eq!(&bytes[1..5], &[0, 0, 0, 3]);
        assert_eq!(&bytes[5..9], &encode_f32(0.5));
        assert_eq!(&bytes[9..], b"s");
    }

    #[test]
    fn test_released_touchpad_event_has_no_coordinates() {
        let ev = ControlEvent::TouchpadMoved {
            id: "pad".into(),
            seq: 0,
            position: None,
        };
        assert_eq!(ev.encode(), vec![b'n', 0, 0, 0, 0, 0, b'p', b'a', b'd']);
    }

    #[test]
    fn test_text_event_length_prefixes_the_id() {
        let ev = ControlEvent::TextChanged {
            id: "f".into(),
            text: "hi".into(),
        };
        assert_eq!(ev.encode(), vec![b't', 1, b'f', b'h', b'i']);
    }
}

//! Opcode bytes for requests and device-initiated events.
//!
//! Every opcode is a single printable ASCII byte.  The set is fixed and
//! version-less; an unrecognised byte is simply not a request.

use crate::domain::sensors::SensorKind;

/// Request opcodes understood by the device.
///
/// The discriminant is the byte on the wire, so `Opcode::Echo as u8 == b'a'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // Session
    Heartbeat = b'I',
    Echo = b'a',
    SetPushPeriods = b'p',

    // Registry
    ClearControls = b'C',
    RemoveControl = b'c',

    // Control state
    SetText = b'H',
    GetText = b'h',
    SetImage = b'i',
    GetImage = b'u',
    SetToggleState = b'w',
    GetToggleState = b'W',
    IsPressed = b'V',
    GetPosition = b'J',

    // Control creation
    AddLabel = b'g',
    AddButton = b'B',
    AddTextField = b'T',
    AddImageDisplay = b'U',
    AddJoystick = b'j',
    AddTouchpad = b'N',
    AddToggle = b'Z',
    AddRadioButton = b'y',

    // Sensor reads
    Accelerometer = b'A',
    Gravity = b'G',
    LinearAcceleration = b'L',
    Gyroscope = b'Y',
    RotationVector = b'R',
    GameRotationVector = b'r',
    Magnetometer = b'M',
    MicrophoneLevel = b'm',
    Proximity = b'P',
    StepCount = b'S',
    LightLevel = b'l',
    Location = b'X',
    Orientation = b'O',
}

impl Opcode {
    /// Returns the sensor this opcode reads, if it is a sensor request.
    pub fn sensor_kind(self) -> Option<SensorKind> {
        SensorKind::from_opcode(self as u8)
    }

    /// Returns `true` for the opcodes that create a control.
    pub fn is_add_control(self) -> bool {
        matches!(
            self,
            Opcode::AddLabel
                | Opcode::AddButton
                | Opcode::AddTextField
                | Opcode::AddImageDisplay
                | Opcode::AddJoystick
                | Opcode::AddTouchpad
                | Opcode::AddToggle
                | Opcode::AddRadioButton
        )
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        let op = match value {
            b'I' => Opcode::Heartbeat,
            b'a' => Opcode::Echo,
            b'p' => Opcode::SetPushPeriods,
            b'C' => Opcode::ClearControls,
            b'c' => Opcode::RemoveControl,
            b'H' => Opcode::SetText,
            b'h' => Opcode::GetText,
            b'i' => Opcode::SetImage,
            b'u' => Opcode::GetImage,
            b'w' => Opcode::SetToggleState,
            b'W' => Opcode::GetToggleState,
            b'V' => Opcode::IsPressed,
            b'J' => Opcode::GetPosition,
            b'g' => Opcode::AddLabel,
            b'B' => Opcode::AddButton,
            b'T' => Opcode::AddTextField,
            b'U' => Opcode::AddImageDisplay,
            b'j' => Opcode::AddJoystick,
            b'N' => Opcode::AddTouchpad,
            b'Z' => Opcode::AddToggle,
            b'y' => Opcode::AddRadioButton,
            b'A' => Opcode::Accelerometer,
            b'G' => Opcode::Gravity,
            b'L' => Opcode::LinearAcceleration,
            b'Y' => Opcode::Gyroscope,
            b'R' => Opcode::RotationVector,
            b'r' => Opcode::GameRotationVector,
            b'M' => Opcode::Magnetometer,
            b'm' => Opcode::MicrophoneLevel,
            b'P' => Opcode::Proximity,
            b'S' => Opcode::StepCount,
            b'l' => Opcode::LightLevel,
            b'X' => Opcode::Location,
            b'O' => Opcode::Orientation,
            _ => return Err(()),
        };
        Ok(op)
    }
}

/// Opcodes of packets the device sends without being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventOpcode {
    Heartbeat = b'I',
    ButtonPressed = b'b',
    ToggleChanged = b'z',
    SliderMoved = b'd',
    JoystickMoved = b'K',
    TouchpadMoved = b'n',
    TextChanged = b't',
    ImageChanged = b'f',
    SensorPush = b'Q',
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_REQUESTS: &[Opcode] = &[
        Opcode::Heartbeat,
        Opcode::Echo,
        Opcode::SetPushPeriods,
        Opcode::ClearControls,
        Opcode::RemoveControl,
        Opcode::SetText,
        Opcode::GetText,
        Opcode::SetImage,
        Opcode::GetImage,
        Opcode::SetToggleState,
        Opcode::GetToggleState,
        Opcode::IsPressed,
        Opcode::GetPosition,
        Opcode::AddLabel,
        Opcode::AddButton,
        Opcode::AddTextField,
        Opcode::AddImageDisplay,
        Opcode::AddJoystick,
        Opcode::AddTouchpad,
        Opcode::AddToggle,
        Opcode::AddRadioButton,
        Opcode::Accelerometer,
        Opcode::Gravity,
        Opcode::LinearAcceleration,
        Opcode::Gyroscope,
        Opcode::RotationVector,
        Opcode::GameRotationVector,
        Opcode::Magnetometer,
        Opcode::MicrophoneLevel,
        Opcode::Proximity,
        Opcode::StepCount,
        Opcode::LightLevel,
        Opcode::Location,
        Opcode::Orientation,
    ];

    #[test]
    fn test_try_from_recovers_every_request_opcode() {
        for &op in ALL_REQUESTS {
            assert_eq!(Opcode::try_from(op as u8), Ok(op), "opcode {op:?}");
        }
    }

    #[test]
    fn test_opcode_bytes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for &op in ALL_REQUESTS {
            assert!(seen.insert(op as u8), "duplicate byte for {op:?}");
        }
    }

    #[test]
    fn test_unknown_byte_is_rejected() {
        assert_eq!(Opcode::try_from(b'?'), Err(()));
        assert_eq!(Opcode::try_from(0x00), Err(()));
    }

    #[test]
    fn test_exactly_thirteen_opcodes_read_sensors() {
        let sensors = ALL_REQUESTS.iter().filter(|op| op.sensor_kind().is_some()).count();
        assert_eq!(sensors, 13);
    }

    #[test]
    fn test_add_control_opcodes_do_not_overlap_sensors() {
        for &op in ALL_REQUESTS {
            assert!(!(op.is_add_control() && op.sensor_kind().is_some()));
        }
    }
}

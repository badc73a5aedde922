//! Sensor kinds the server can read or subscribe to.
//!
//! Raw acquisition belongs to the platform; this module only names the
//! sensors and fixes their opcode and their order inside a push packet.

/// One device sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Accelerometer,
    Gravity,
    LinearAcceleration,
    Gyroscope,
    RotationVector,
    GameRotationVector,
    Magnetometer,
    MicrophoneLevel,
    Proximity,
    StepCount,
    LightLevel,
    Location,
    Orientation,
}

impl SensorKind {
    /// Every sensor, in push-packet order.
    pub const ALL: [SensorKind; 13] = [
        SensorKind::Accelerometer,
        SensorKind::Gravity,
        SensorKind::LinearAcceleration,
        SensorKind::Gyroscope,
        SensorKind::RotationVector,
        SensorKind::GameRotationVector,
        SensorKind::Magnetometer,
        SensorKind::MicrophoneLevel,
        SensorKind::Proximity,
        SensorKind::StepCount,
        SensorKind::LightLevel,
        SensorKind::Location,
        SensorKind::Orientation,
    ];

    /// The request opcode that reads this sensor.
    pub fn opcode(self) -> u8 {
        match self {
            SensorKind::Accelerometer => b'A',
            SensorKind::Gravity => b'G',
            SensorKind::LinearAcceleration => b'L',
            SensorKind::Gyroscope => b'Y',
            SensorKind::RotationVector => b'R',
            SensorKind::GameRotationVector => b'r',
            SensorKind::Magnetometer => b'M',
            SensorKind::MicrophoneLevel => b'm',
            SensorKind::Proximity => b'P',
            SensorKind::StepCount => b'S',
            SensorKind::LightLevel => b'l',
            SensorKind::Location => b'X',
            SensorKind::Orientation => b'O',
        }
    }

    pub fn from_opcode(op: u8) -> Option<SensorKind> {
        SensorKind::ALL.into_iter().find(|k| k.opcode() == op)
    }

    /// Number of values a reading of this sensor usually has.
    ///
    /// Location is the exception: providers may report 2 to 4 values.
    pub fn typical_arity(self) -> usize {
        match self {
            SensorKind::RotationVector => 4,
            SensorKind::MicrophoneLevel
            | SensorKind::Proximity
            | SensorKind::StepCount
            | SensorKind::LightLevel => 1,
            SensorKind::Location => 4,
            _ => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_round_trips_for_every_kind() {
        for kind in SensorKind::ALL {
            assert_eq!(SensorKind::from_opcode(kind.opcode()), Some(kind));
        }
    }

    #[test]
    fn test_non_sensor_opcode_maps_to_none() {
        assert_eq!(SensorKind::from_opcode(b'a'), None);
        assert_eq!(SensorKind::from_opcode(b'y'), None);
    }

    #[test]
    fn test_push_order_starts_with_accelerometer_and_ends_with_orientation() {
        assert_eq!(SensorKind::ALL[0], SensorKind::Accelerometer);
        assert_eq!(SensorKind::ALL[12], SensorKind::Orientation);
    }
}

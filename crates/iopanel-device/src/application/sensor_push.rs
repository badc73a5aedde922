//! Sensor reads and the periodic sensor push.
//!
//! A `p` request carries one `u32` period in milliseconds per subscribed
//! stream.  The device runs a single push timer at the fastest requested
//! rate; a period of zero means "not subscribed" and is ignored.  Each tick
//! sends one `Q` packet with every sensor's latest reading:
//!
//! ```text
//! Q, seq u32, { count u8, f64 * count } * 13   (order of SensorKind::ALL)
//! ```

use std::time::Duration;

use iopanel_core::protocol::codec::{CodecError, PayloadReader};
use iopanel_core::protocol::{EventOpcode, PayloadWriter};
use iopanel_core::SensorKind;

use super::collaborators::SensorProvider;

/// Parses the period list of a `p` request body.
///
/// # Errors
///
/// Returns [`CodecError::InsufficientData`] if `body` is not a whole number
/// of `u32` values.
pub fn parse_periods(body: &[u8]) -> Result<Vec<u32>, CodecError> {
    if body.len() % 4 != 0 {
        return Err(CodecError::InsufficientData {
            needed: body.len().div_ceil(4) * 4,
            available: body.len(),
        });
    }
    let mut r = PayloadReader::new(body);
    let mut periods = Vec::with_capacity(body.len() / 4);
    while !r.is_empty() {
        periods.push(r.u32()?);
    }
    Ok(periods)
}

/// The push interval for a set of requested periods, or `None` to stop.
pub fn select_period(periods: &[u32]) -> Option<Duration> {
    periods
        .iter()
        .copied()
        .filter(|&ms| ms > 0)
        .min()
        .map(|ms| Duration::from_millis(u64::from(ms)))
}

/// Reply to a single-sensor read: the opcode then the values, possibly none.
pub fn encode_reading(kind: SensorKind, values: &[f64]) -> Vec<u8> {
    values
        .iter()
        .fold(PayloadWriter::with_opcode(kind.opcode()), |w, v| w.f64(*v))
        .finish()
}

/// Builds one composite push packet.
///
/// A run holds at most 255 values; longer readings are cut.
pub fn encode_push(seq: u32, sensors: &dyn SensorProvider) -> Vec<u8> {
    let mut w = PayloadWriter::with_opcode(EventOpcode::SensorPush as u8).u32(seq);
    for kind in SensorKind::ALL {
        let values = sensors.read(kind).unwrap_or_default();
        let run = &values[..values.len().min(u8::MAX as usize)];
        w = run.iter().fold(w.u8(run.len() as u8), |w, v| w.f64(*v));
    }
    w.finish()
}

#[cfg(test)]
mod tests {
    use iopanel_core::protocol::codec::{encode_f64, encode_u32};

    use super::*;
    use crate::application::collaborators::MockSensorProvider;

    #[test]
    fn test_parse_periods_reads_big_endian_values() {
        let body = [0, 0, 0, 100, 0, 0, 1, 0];
        assert_eq!(parse_periods(&body).unwrap(), vec![100, 256]);
    }

    #[test]
    fn test_parse_periods_rejects_partial_value() {
        assert!(parse_periods(&[0, 0, 1]).is_err());
    }

    #[test]
    fn test_select_period_takes_smallest_non_zero() {
        assert_eq!(select_period(&[0, 250, 100, 0]), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_select_period_all_zero_disables_push() {
        assert_eq!(select_period(&[0, 0]), None);
        assert_eq!(select_period(&[]), None);
    }

    #[test]
    fn test_encode_reading_appends_values() {
        let out = encode_reading(SensorKind::Proximity, &[5.0]);
        let mut expected = vec![b'P'];
        expected.extend_from_slice(&encode_f64(5.0));
        assert_eq!(out, expected);
    }

    #[test]
    fn test_encode_reading_unavailable_is_opcode_only() {
        assert_eq!(encode_reading(SensorKind::Gyroscope, &[]), vec![b'Y']);
    }

    #[test]
    fn test_push_packet_has_one_run_per_sensor_in_order() {
        // Arrange – only the accelerometer and the light sensor report
        let mut sensors = MockSensorProvider::new();
        sensors.expect_read().returning(|kind| match kind {
            SensorKind::Accelerometer => Some(vec![1.0, 2.0, 3.0]),
            SensorKind::LightLevel => Some(vec![40.0]),
            _ => None,
        });

        // Act
        let out = encode_push(7, &sensors);

        // Assert
        let mut expected = vec![b'Q'];
        expected.extend_from_slice(&encode_u32(7));
        for kind in SensorKind::ALL {
            match kind {
                SensorKind::Accelerometer => {
                    expected.push(3);
                    for v in [1.0, 2.0, 3.0] {
                        expected.extend_from_slice(&encode_f64(v));
                    }
                }
                SensorKind::LightLevel => {
                    expected.push(1);
                    expected.extend_from_slice(&encode_f64(40.0));
                }
                _ => expected.push(0),
            }
        }
        assert_eq!(out, expected);
    }
}

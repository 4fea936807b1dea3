use crate::answers::*;
use crate::error::{Error, Result};
use crate::types::Measurement;
use byteorder::{ByteOrder, LittleEndian};

/// Decode a single legacy measurement packet into a [`Measurement`].
///
/// The packet carries a new-scan flag pair, a quality value, a Q6 fixed
/// point angle and a Q2 fixed point distance. Both scan responses of the
/// legacy family (normal and force) use this layout.
pub fn parse_measurement(raw: &[u8]) -> Result<Measurement> {
    if raw.len() != RPLIDAR_ANS_LEN_MEASUREMENT {
        return Err(Error::FramingError {
            description: format!(
                "wrong measurement packet length: expected {}, got {}",
                RPLIDAR_ANS_LEN_MEASUREMENT,
                raw.len()
            ),
        });
    }

    let new_scan = (raw[0] & RPLIDAR_RESP_MEASUREMENT_SYNCBIT) != 0;
    let inverted = (raw[0] & RPLIDAR_RESP_MEASUREMENT_SYNCBIT_INV) != 0;
    if new_scan == inverted {
        return Err(Error::FramingError {
            description: "new-scan bit and its inverse agree".to_owned(),
        });
    }
    if (raw[1] & RPLIDAR_RESP_MEASUREMENT_CHECKBIT) == 0 {
        return Err(Error::FramingError {
            description: "measurement check bit is not set".to_owned(),
        });
    }

    let quality = raw[0] >> RPLIDAR_RESP_MEASUREMENT_QUALITY_SHIFT;
    let angle_q6 = LittleEndian::read_u16(&raw[1..3]) >> RPLIDAR_RESP_MEASUREMENT_ANGLE_SHIFT;
    let distance_q2 = LittleEndian::read_u16(&raw[3..5]);

    Ok(Measurement {
        new_scan,
        quality: Some(quality),
        angle: (angle_q6 as f32 / 64.0) % 360.0,
        distance: distance_q2 as f32 / 4.0,
    })
}

use crate::answers::*;
use crate::checksum::Checksum;
use crate::error::{Error, Result};
use crate::types::Measurement;
use byteorder::{ByteOrder, LittleEndian};

/// One decoded express frame: the sweep angle at which the frame starts and
/// the 32 distance/angle-compensation pairs packed into its 16 cabins.
///
/// A frame on its own does not yield measurements. Sample angles are spread
/// between the start angles of two consecutive frames, so the driver holds a
/// pair of frames and interpolates with [`interpolate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressFrame {
    /// Angle of the first sample in degrees, before per-sample compensation.
    pub start_angle: f32,
    /// Set when the frame opens a new rotation.
    pub new_scan: bool,
    /// Distances in millimeters, in sample order.
    pub distances: [f32; RPLIDAR_EXPRESS_FRAME_SAMPLES],
    /// Per-sample angle compensation in degrees, subtracted when interpolating.
    pub angle_deltas: [f32; RPLIDAR_EXPRESS_FRAME_SAMPLES],
}

/// Parse an 84-byte express scan response into an [`ExpressFrame`].
///
/// The first two bytes carry sync nibbles in their high halves and the frame
/// checksum split across their low halves. The checksum is the XOR of every
/// byte that follows.
pub fn parse_frame(raw: &[u8]) -> Result<ExpressFrame> {
    if raw.len() != RPLIDAR_ANS_LEN_MEASUREMENT_CAPSULED {
        return Err(Error::FramingError {
            description: format!(
                "wrong express frame length: expected {}, got {}",
                RPLIDAR_ANS_LEN_MEASUREMENT_CAPSULED,
                raw.len()
            ),
        });
    }
    if raw[0] >> 4 != RPLIDAR_RESP_MEASUREMENT_EXP_SYNC_1
        || raw[1] >> 4 != RPLIDAR_RESP_MEASUREMENT_EXP_SYNC_2
    {
        return Err(Error::FramingError {
            description: format!(
                "express frame sync nibbles mismatch: got {:02X} {:02X}",
                raw[0], raw[1]
            ),
        });
    }

    let expected = (raw[0] & 0x0F) | ((raw[1] & 0x0F) << 4);
    let actual = Checksum::of(&raw[2..]);
    if actual != expected {
        return Err(Error::ChecksumError {
            description: format!(
                "express frame checksum mismatch: expected {:02X}, got {:02X}",
                expected, actual
            ),
        });
    }

    let angle_word = LittleEndian::read_u16(&raw[2..4]);
    let mut frame = ExpressFrame {
        start_angle: (angle_word & 0x7FFF) as f32 / 64.0,
        new_scan: (angle_word & 0x8000) != 0,
        distances: [0.0; RPLIDAR_EXPRESS_FRAME_SAMPLES],
        angle_deltas: [0.0; RPLIDAR_EXPRESS_FRAME_SAMPLES],
    };

    for index in 0..RPLIDAR_EXPRESS_CABIN_COUNT {
        let cabin = &raw[4 + index * 5..4 + index * 5 + 5];
        let [(dist_1, delta_1), (dist_2, delta_2)] = parse_cabin(cabin);
        frame.distances[index * 2] = dist_1;
        frame.angle_deltas[index * 2] = delta_1;
        frame.distances[index * 2 + 1] = dist_2;
        frame.angle_deltas[index * 2 + 1] = delta_2;
    }

    Ok(frame)
}

/// Interpolate the angle of sample `trame` (1 based, up to 32) of `prev` from
/// the start angles of the frame pair.
///
/// The angular span of `prev` is the distance from its start angle to
/// `new_start_angle`, measured forward around the circle. Each sample sits one
/// thirty-second of that span further along, minus its own compensation delta.
/// The first sample reports a new scan when the sweep wrapped past zero
/// between the two frames.
pub fn interpolate(prev: &ExpressFrame, new_start_angle: f32, trame: usize) -> Measurement {
    let span = (new_start_angle - prev.start_angle).rem_euclid(360.0);
    let step = span / RPLIDAR_EXPRESS_FRAME_SAMPLES as f32;
    let angle = prev.start_angle + step * trame as f32 - prev.angle_deltas[trame - 1];

    Measurement {
        new_scan: new_start_angle < prev.start_angle && trame == 1,
        quality: None,
        angle: wrap_degrees(angle),
        distance: prev.distances[trame - 1],
    }
}

#[inline]
fn parse_cabin(cabin: &[u8]) -> [(f32, f32); 2] {
    let dist_1 = (cabin[0] >> 2) as u16 | (cabin[1] as u16) << 6;
    let dist_2 = (cabin[2] >> 2) as u16 | (cabin[3] as u16) << 6;
    [
        (dist_1 as f32, angle_delta(cabin[0], cabin[4] & 0x0F)),
        (dist_2 as f32, angle_delta(cabin[2], cabin[4] >> 4)),
    ]
}

/// Decode one 5-bit angle compensation value. The low nibble comes from the
/// shared fifth cabin byte, the high bit and the sign ride in the low bits of
/// the sample's first distance byte.
#[inline]
fn angle_delta(dist_byte: u8, nibble: u8) -> f32 {
    let magnitude = (nibble | ((dist_byte & 0x01) << 4)) as f32 / 8.0;
    if dist_byte & 0x02 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// `rem_euclid` on f32 can round up to exactly 360.0 for tiny negative inputs.
#[inline]
fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Response type identifier for device information.
pub const RPLIDAR_ANS_TYPE_DEVINFO: u8 = 0x4;

/// Payload length of a device information response: model (1), firmware
/// minor/major (2), hardware revision (1) and a 16-byte serial number.
pub const RPLIDAR_ANS_LEN_DEVINFO: usize = 20;

/// Response type identifier for device health status.
pub const RPLIDAR_ANS_TYPE_DEVHEALTH: u8 = 0x6;

/// Payload length of a device health response: status byte plus a big-endian
/// 16-bit error code.
pub const RPLIDAR_ANS_LEN_DEVHEALTH: usize = 3;

// health status

/// Health status code indicating the LIDAR is operating correctly.
pub const RPLIDAR_HEALTH_STATUS_OK: u8 = 0;

/// Health status code indicating a non-critical warning. The LIDAR might still function.
pub const RPLIDAR_HEALTH_STATUS_WARNING: u8 = 1;

/// Health status code indicating a critical error. The LIDAR is likely non-operational.
pub const RPLIDAR_HEALTH_STATUS_ERROR: u8 = 2;

// Measurement answers

/// Response type identifier for legacy measurement data (one sample per packet).
pub const RPLIDAR_ANS_TYPE_MEASUREMENT: u8 = 0x81;

/// Packet length of a legacy measurement response.
pub const RPLIDAR_ANS_LEN_MEASUREMENT: usize = 5;

/// Mask for the new-scan bit in byte 0 of a legacy measurement packet.
pub const RPLIDAR_RESP_MEASUREMENT_SYNCBIT: u8 = 0x01;

/// Mask for the inverted new-scan check bit in byte 0 of a legacy measurement
/// packet. Valid packets have exactly one of the two sync bits set.
pub const RPLIDAR_RESP_MEASUREMENT_SYNCBIT_INV: u8 = 0x02;

/// Bit shift for extracting the quality value from byte 0 of a legacy
/// measurement packet.
pub const RPLIDAR_RESP_MEASUREMENT_QUALITY_SHIFT: usize = 2;

/// Mask for the always-one check bit in byte 1 of a legacy measurement packet.
pub const RPLIDAR_RESP_MEASUREMENT_CHECKBIT: u8 = 0x01;

/// Bit shift for extracting the Q6 angle from the 16-bit word at bytes 1..3
/// of a legacy measurement packet.
pub const RPLIDAR_RESP_MEASUREMENT_ANGLE_SHIFT: usize = 1;

/// Response type identifier for express (capsuled) measurement data.
/// Added in firmware version 1.17.
pub const RPLIDAR_ANS_TYPE_MEASUREMENT_CAPSULED: u8 = 0x82;

/// Packet length of an express measurement frame: 2 sync/checksum bytes,
/// a 2-byte start angle and 16 five-byte cabins.
pub const RPLIDAR_ANS_LEN_MEASUREMENT_CAPSULED: usize = 84;

/// Number of five-byte cabins in an express frame.
pub const RPLIDAR_EXPRESS_CABIN_COUNT: usize = 16;

/// Number of samples carried by one express frame (two per cabin).
pub const RPLIDAR_EXPRESS_FRAME_SAMPLES: usize = 32;

/// Expected value of the upper nibble of the first sync/checksum byte in express frames.
pub const RPLIDAR_RESP_MEASUREMENT_EXP_SYNC_1: u8 = 0xA;

/// Expected value of the upper nibble of the second sync/checksum byte in express frames.
pub const RPLIDAR_RESP_MEASUREMENT_EXP_SYNC_2: u8 = 0x5;

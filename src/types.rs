use crate::answers::*;
use crate::cmds::*;
use crate::internals::{RPLIDAR_DEFAULT_MAX_BUFFERED, RPLIDAR_DEFAULT_MIN_SCAN_LEN};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single decoded lidar sample.
///
/// `new_scan` marks the first sample of a fresh 360-degree rotation and is
/// what the scan assembler segments on. `quality` is the reflected pulse
/// strength (0-63) in legacy modes and `None` in express mode, where the
/// packet format carries no quality field. A `distance` of `0.0` means the
/// pulse produced no valid return; such samples still carry a meaningful
/// `new_scan` flag.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    /// `true` if this sample starts a new 360-degree scan.
    pub new_scan: bool,
    /// Reflected signal quality (0-63), `None` in express mode.
    pub quality: Option<u8>,
    /// Angle in degrees, within `[0, 360)`.
    pub angle: f32,
    /// Distance in millimeters. `0.0` denotes an invalid sample.
    pub distance: f32,
}

impl Measurement {
    /// Returns `true` if the sample carries a usable distance.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.distance > 0.0
    }
}

/// One entry of an assembled scan: a valid measurement stripped of its
/// scan-boundary flag.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanPoint {
    /// Reflected signal quality (0-63), `None` in express mode.
    pub quality: Option<u8>,
    /// Angle in degrees, within `[0, 360)`.
    pub angle: f32,
    /// Distance in millimeters, greater than zero.
    pub distance: f32,
}

impl From<Measurement> for ScanPoint {
    fn from(m: Measurement) -> ScanPoint {
        ScanPoint {
            quality: m.quality,
            angle: m.angle,
            distance: m.distance,
        }
    }
}

/// Device identity reported by the GET_INFO command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceInfo {
    /// Model ID of the connected unit.
    pub model: u8,
    /// Firmware major version.
    pub firmware_major: u8,
    /// Firmware minor version.
    pub firmware_minor: u8,
    /// Hardware revision.
    pub hardware: u8,
    /// The unit's 16-byte serial number, uppercase hex encoded.
    pub serial_number: String,
}

/// Health state reported by the GET_HEALTH command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HealthStatus {
    /// The device reports normal operation.
    Good,
    /// The device reports a recoverable condition; scanning may still work.
    Warning,
    /// The device reports a fatal condition and needs a reset.
    Error,
}

impl HealthStatus {
    /// Maps the wire status byte to a status, `None` for undefined codes.
    pub fn from_status_byte(byte: u8) -> Option<HealthStatus> {
        match byte {
            RPLIDAR_HEALTH_STATUS_OK => Some(HealthStatus::Good),
            RPLIDAR_HEALTH_STATUS_WARNING => Some(HealthStatus::Warning),
            RPLIDAR_HEALTH_STATUS_ERROR => Some(HealthStatus::Error),
            _ => None,
        }
    }
}

/// A complete health snapshot: status plus the device's error code, which is
/// reported even when the status is `Good`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Health {
    /// Coarse device state.
    pub status: HealthStatus,
    /// Device-specific error code (0 when nothing is wrong).
    pub error_code: u16,
}

/// The measurement modes this driver can put the device into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScanMode {
    /// One 5-byte sample per packet at nominal motor speed.
    Normal,
    /// Like `Normal`, but the device samples regardless of motor speed.
    Force,
    /// 32 samples per 84-byte frame, angles interpolated across frames.
    Express,
}

impl ScanMode {
    /// The command byte that starts this mode.
    pub(crate) fn command(self) -> u8 {
        match self {
            ScanMode::Normal => RPLIDAR_CMD_SCAN,
            ScanMode::Force => RPLIDAR_CMD_FORCE_SCAN,
            ScanMode::Express => RPLIDAR_CMD_EXPRESS_SCAN,
        }
    }

    /// The fixed measurement packet length of this mode.
    pub(crate) fn response_len(self) -> usize {
        match self {
            ScanMode::Normal | ScanMode::Force => RPLIDAR_ANS_LEN_MEASUREMENT,
            ScanMode::Express => RPLIDAR_ANS_LEN_MEASUREMENT_CAPSULED,
        }
    }

    /// The descriptor data type announcing measurements of this mode.
    pub(crate) fn response_type(self) -> u8 {
        match self {
            ScanMode::Normal | ScanMode::Force => RPLIDAR_ANS_TYPE_MEASUREMENT,
            ScanMode::Express => RPLIDAR_ANS_TYPE_MEASUREMENT_CAPSULED,
        }
    }
}

impl Default for ScanMode {
    /// The legacy one-sample-per-packet mode.
    fn default() -> ScanMode {
        ScanMode::Normal
    }
}

/// Options for the measurement and scan iterators.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// The measurement mode to start if no scan is active yet.
    pub mode: ScanMode,

    /// Ceiling, in bytes, on the transport's unread backlog. When a pull
    /// finds more buffered bytes than this, the driver silently stops and
    /// restarts the scan to drop the stale data. `None` disables the check.
    pub max_buffered: Option<usize>,

    /// A completed rotation is only emitted as a scan when it holds strictly
    /// more than this many valid points. Filters sensor spin-up noise.
    pub min_scan_len: usize,
}

impl ScanOptions {
    /// Creates `ScanOptions` for the given mode with default buffering limits.
    ///
    /// # Arguments
    ///
    /// * `mode` - The measurement mode to run.
    pub fn with_mode(mode: ScanMode) -> ScanOptions {
        ScanOptions {
            mode,
            max_buffered: Some(RPLIDAR_DEFAULT_MAX_BUFFERED),
            min_scan_len: RPLIDAR_DEFAULT_MIN_SCAN_LEN,
        }
    }
}

impl Default for ScanOptions {
    /// Default options: normal mode, default backlog ceiling and minimum
    /// scan length.
    fn default() -> ScanOptions {
        ScanOptions::with_mode(ScanMode::Normal)
    }
}

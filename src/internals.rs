use crate::answers::RPLIDAR_EXPRESS_FRAME_SAMPLES;
use crate::parsers::express::ExpressFrame;
use crate::types::ScanMode;
use std::time::Duration;

/// Default timeout for waiting on response bytes from the RPLIDAR.
pub const RPLIDAR_DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Default serial baud rate of A2 series units.
pub const RPLIDAR_DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default PWM value used when starting the motor with `start_motor()`.
pub const RPLIDAR_DEFAULT_MOTOR_PWM: u16 = 660;

/// Largest PWM duty cycle the accessory board accepts.
pub const RPLIDAR_MAX_MOTOR_PWM: u16 = 1023;

/// Default ceiling on unread transport bytes before a scan is silently
/// stopped and restarted to shed the backlog.
pub const RPLIDAR_DEFAULT_MAX_BUFFERED: usize = 3000;

/// Default minimum number of points a rotation must exceed to be emitted as
/// a scan.
pub const RPLIDAR_DEFAULT_MIN_SCAN_LEN: usize = 5;

/// Settle delay after a STOP command before the device is treated as idle.
pub const RPLIDAR_STOP_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Reboot grace period after a RESET command.
pub const RPLIDAR_RESET_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Sleep interval between "bytes available" polls while waiting for a
/// fixed-size response.
pub const RPLIDAR_READ_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// The scan the device is currently streaming. Held by the driver while
/// scanning; dropped on stop. At most one exists per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSession {
    /// The active measurement mode.
    pub mode: ScanMode,
    /// Fixed packet length of this mode's measurement responses.
    pub packet_size: usize,
}

/// Pairing state of the express decoder.
///
/// Express angles are interpolated between the start angles of two
/// consecutive frames, so the previous frame stays alive until all of its
/// samples have been emitted. `trame` counts emissions within the current
/// pair (1..=32); parked at 32 it forces a frame rotation on the next pull,
/// which is also the initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressScanState {
    /// Index of the next sub-measurement within the current frame pair.
    pub trame: usize,
    /// Frame whose samples are currently being emitted.
    pub prev: Option<ExpressFrame>,
    /// Most recently read frame; provides the interpolation end angle.
    pub current: Option<ExpressFrame>,
}

impl ExpressScanState {
    /// Creates the initial state: no frames buffered, rotation due.
    pub fn new() -> ExpressScanState {
        ExpressScanState {
            trame: RPLIDAR_EXPRESS_FRAME_SAMPLES,
            prev: None,
            current: None,
        }
    }

    /// Drops any buffered frames and parks the counter so the next express
    /// pull starts from a fresh frame pair. Called whenever the input stream
    /// is flushed.
    pub fn reset(&mut self) {
        *self = ExpressScanState::new();
    }
}

impl Default for ExpressScanState {
    fn default() -> ExpressScanState {
        ExpressScanState::new()
    }
}

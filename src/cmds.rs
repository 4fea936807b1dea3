// Commands without payload and response

/// Command code to stop the measurement process of the LIDAR.
pub const RPLIDAR_CMD_STOP: u8 = 0x25;

/// Command code to start a scan in the legacy one-sample-per-packet mode.
pub const RPLIDAR_CMD_SCAN: u8 = 0x20;

/// Command code to start a forced scan.
/// A forced scan makes the LIDAR send measurements even when the motor is not
/// spinning at its nominal speed.
pub const RPLIDAR_CMD_FORCE_SCAN: u8 = 0x21;

/// Command code to reset the LIDAR core. The device reboots and needs a
/// grace period before it accepts further commands.
pub const RPLIDAR_CMD_RESET: u8 = 0x40;

// Commands without payload but have response

/// Command code to request device information (model, firmware, hardware, serial number).
pub const RPLIDAR_CMD_GET_DEVICE_INFO: u8 = 0x50;

/// Command code to request the device's health status.
pub const RPLIDAR_CMD_GET_DEVICE_HEALTH: u8 = 0x52;

// Commands with payload

/// Command code to start an express scan, which packs 32 samples into each
/// 84-byte response frame. Added in firmware version 1.17.
pub const RPLIDAR_CMD_EXPRESS_SCAN: u8 = 0x82;

/// Payload of `RPLIDAR_CMD_EXPRESS_SCAN`: working mode 0 (legacy express)
/// followed by four reserved zero bytes.
pub const RPLIDAR_EXPRESS_SCAN_PAYLOAD: [u8; 5] = [0; 5];

/// Command code to set the motor PWM duty cycle through the accessory board
/// of A2/A3 models. Requires a 2-byte payload (u16 little-endian).
pub const RPLIDAR_CMD_SET_MOTOR_PWM: u8 = 0xF0;

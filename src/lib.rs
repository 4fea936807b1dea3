//! # RPLIDAR A2 Driver
//!
//! `rplidar_a2` is a serial protocol driver for Slamtec RPLIDAR A2 series laser
//! scanners. It frames commands, validates response descriptors and decodes both
//! measurement packet formats (legacy and express) into angle, distance and
//! quality samples, optionally grouped into full 360 degree scans.
//!
//! Reading is pull based: [`RplidarDevice::measurements`] and
//! [`RplidarDevice::scans`] return iterators that drive the device one sample at
//! a time, so the consumer controls pacing and sees every transport or decode
//! error as an `Err` item. The driver also covers motor PWM control, device info
//! and health queries and input backlog recovery.

mod answers;
mod checksum;
mod cmds;
mod error;
mod internals;
mod parsers;
mod protocol;
mod scan;
mod transport;
pub mod types;
pub mod zones;

pub use crate::error::{Error, Result};
pub use crate::scan::{Measurements, ScanAssembler, Scans};
pub use crate::transport::{SerialTransport, Transport};
pub use crate::types::{
    DeviceInfo, Health, HealthStatus, Measurement, ScanMode, ScanOptions, ScanPoint,
};

use crate::answers::*;
use crate::cmds::*;
use crate::internals::*;
use crate::parsers::{express, plain};
use crate::protocol::{encode_command, parse_descriptor, ResponseDescriptor, RPLIDAR_DESCRIPTOR_LEN};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, info, trace, warn};
use std::thread;
use std::time::{Duration, Instant};

/// Represents a connection to and control interface for an RPLIDAR device.
///
/// The device owns its [`Transport`] exclusively. Commands, descriptor
/// validation and measurement decoding all run on the caller's thread inside
/// the pull loop; nothing is read from the port until the consumer asks for
/// the next sample.
///
/// # Example
/// ```ignore
/// # use rplidar_a2::{RplidarDevice, ScanMode};
/// # fn main() -> rplidar_a2::Result<()> {
/// let mut device = RplidarDevice::open("/dev/ttyUSB0")?;
/// let info = device.get_info()?;
/// println!("model {:02X}, serial {}", info.model, info.serial_number);
///
/// for scan in device.scans(ScanMode::Normal)? {
///     println!("{} points", scan?.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RplidarDevice<T> {
    transport: T,
    timeout: Duration,
    motor_pwm: u16,
    motor_running: bool,
    session: Option<ScanSession>,
    express: ExpressScanState,
}

impl RplidarDevice<SerialTransport> {
    /// Opens the serial port at `path` with the default A2 settings
    /// (115200 baud, 1 s timeout) and wraps it in a device.
    ///
    /// # Arguments
    ///
    /// * `path` - Serial port path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub fn open(path: &str) -> Result<RplidarDevice<SerialTransport>> {
        Ok(RplidarDevice::new(SerialTransport::open(path)?))
    }

    /// Opens the serial port at `path` with an explicit baud rate and timeout.
    pub fn open_with_options(
        path: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<RplidarDevice<SerialTransport>> {
        let transport = SerialTransport::open_with_options(path, baud_rate, timeout)?;
        Ok(RplidarDevice::with_timeout(transport, timeout))
    }
}

impl<T: Transport> RplidarDevice<T> {
    /// Constructs a new `RplidarDevice` over an already opened transport,
    /// using the default response timeout (1 s).
    pub fn new(transport: T) -> RplidarDevice<T> {
        RplidarDevice::with_timeout(transport, RPLIDAR_DEFAULT_TIMEOUT)
    }

    /// Constructs a new `RplidarDevice` with an explicit response timeout.
    ///
    /// The timeout bounds how long a single pull waits for the device to
    /// produce a complete response packet.
    pub fn with_timeout(transport: T, timeout: Duration) -> RplidarDevice<T> {
        trace!("Creating new RplidarDevice");
        RplidarDevice {
            transport,
            timeout,
            motor_pwm: RPLIDAR_DEFAULT_MOTOR_PWM,
            motor_running: false,
            session: None,
            express: ExpressScanState::new(),
        }
    }

    /// Whether a measurement stream is currently active.
    pub fn is_scanning(&self) -> bool {
        self.session.is_some()
    }

    /// Gets the device information (model, firmware, hardware, serial number).
    ///
    /// Refused with [`Error::BufferNotEmpty`] while unread bytes are waiting,
    /// since a response descriptor cannot be told apart from scan data. Stop
    /// the scan or call [`RplidarDevice::clean_input`] first.
    pub fn get_info(&mut self) -> Result<DeviceInfo> {
        self.require_empty_input()?;
        self.send_command(RPLIDAR_CMD_GET_DEVICE_INFO)?;

        let descriptor = self.read_descriptor()?;
        descriptor.expect_single(RPLIDAR_ANS_LEN_DEVINFO, RPLIDAR_ANS_TYPE_DEVINFO)?;

        let raw = self.read_fixed(RPLIDAR_ANS_LEN_DEVINFO)?;
        let serial_number: String = raw[4..].iter().map(|byte| format!("{:02X}", byte)).collect();
        let info = DeviceInfo {
            model: raw[0],
            firmware_minor: raw[1],
            firmware_major: raw[2],
            hardware: raw[3],
            serial_number,
        };
        debug!("Received device info: {:?}", info);
        Ok(info)
    }

    /// Gets the device health status.
    ///
    /// Subject to the same empty-input requirement as
    /// [`RplidarDevice::get_info`].
    pub fn get_health(&mut self) -> Result<Health> {
        self.require_empty_input()?;
        self.send_command(RPLIDAR_CMD_GET_DEVICE_HEALTH)?;

        let descriptor = self.read_descriptor()?;
        descriptor.expect_single(RPLIDAR_ANS_LEN_DEVHEALTH, RPLIDAR_ANS_TYPE_DEVHEALTH)?;

        let raw = self.read_fixed(RPLIDAR_ANS_LEN_DEVHEALTH)?;
        let status =
            HealthStatus::from_status_byte(raw[0]).ok_or_else(|| Error::ProtocolError {
                description: format!("unknown health status byte: {:02X}", raw[0]),
            })?;
        let health = Health {
            status,
            error_code: BigEndian::read_u16(&raw[1..3]),
        };
        debug!("Received health status: {:?}", health);
        Ok(health)
    }

    /// Starts a measurement stream in the given mode.
    ///
    /// A no-op when a stream is already active, even in a different mode.
    /// The device health is checked first: a warning is logged and scanning
    /// proceeds, while an error triggers one reset attempt before giving up
    /// with [`Error::HardwareFault`].
    pub fn start_scan(&mut self, mode: ScanMode) -> Result<()> {
        if self.session.is_some() {
            warn!("Scanning is already running, ignoring the start request");
            return Ok(());
        }

        let health = self.get_health()?;
        match health.status {
            HealthStatus::Good => {}
            HealthStatus::Warning => {
                warn!(
                    "Device health warning, error code: {:02X}",
                    health.error_code
                );
            }
            HealthStatus::Error => {
                warn!(
                    "Device health error (code {:02X}), trying a reset",
                    health.error_code
                );
                self.reset()?;
                let health = self.get_health()?;
                if health.status == HealthStatus::Error {
                    return Err(Error::HardwareFault {
                        error_code: health.error_code,
                    });
                }
            }
        }

        info!("Starting scan in {:?} mode", mode);
        match mode {
            ScanMode::Express => {
                self.send_payload_command(mode.command(), &RPLIDAR_EXPRESS_SCAN_PAYLOAD)?
            }
            _ => self.send_command(mode.command())?,
        }

        let descriptor = self.read_descriptor()?;
        descriptor.expect_multi(mode.response_len(), mode.response_type())?;
        self.session = Some(ScanSession {
            mode,
            packet_size: descriptor.size,
        });
        Ok(())
    }

    /// Stops the measurement stream and discards whatever the device sent
    /// since the last pull. Safe to call when no scan is active.
    pub fn stop(&mut self) -> Result<()> {
        info!("Stopping scan");
        self.send_command(RPLIDAR_CMD_STOP)?;
        thread::sleep(RPLIDAR_STOP_SETTLE_DELAY);
        self.session = None;
        self.clean_input()
    }

    /// Reboots the RPLIDAR core and waits out its startup grace period.
    ///
    /// Any active scan is gone afterwards; the device boots into the idle
    /// state, so the driver drops its session and flushes the input.
    pub fn reset(&mut self) -> Result<()> {
        info!("Resetting the device");
        self.send_command(RPLIDAR_CMD_RESET)?;
        thread::sleep(RPLIDAR_RESET_GRACE_PERIOD);
        self.session = None;
        self.clean_input()
    }

    /// Discards all unread input and the buffered express frame pair.
    ///
    /// Refused (with a warning, not an error) while a scan is active, because
    /// dropping bytes mid-stream would desynchronize packet framing. Stop the
    /// scan first.
    pub fn clean_input(&mut self) -> Result<()> {
        if self.session.is_some() {
            warn!("Flushing the input is not allowed while scanning");
            return Ok(());
        }
        self.transport.flush_input()?;
        self.express.reset();
        Ok(())
    }

    /// Sets the motor's Pulse Width Modulation duty cycle via the accessory
    /// board. 0 stops the motor.
    ///
    /// # Arguments
    ///
    /// * `pwm` - Duty cycle, 0 to 1023.
    pub fn set_motor_pwm(&mut self, pwm: u16) -> Result<()> {
        if pwm > RPLIDAR_MAX_MOTOR_PWM {
            return Err(Error::InvalidArgument {
                description: format!(
                    "motor pwm {} exceeds the maximum of {}",
                    pwm, RPLIDAR_MAX_MOTOR_PWM
                ),
            });
        }
        trace!("Setting motor PWM to {}", pwm);
        let mut payload = [0; 2];
        LittleEndian::write_u16(&mut payload, pwm);
        self.send_payload_command(RPLIDAR_CMD_SET_MOTOR_PWM, &payload)
    }

    /// Starts the motor at the configured speed (see
    /// [`RplidarDevice::set_motor_speed`]; 660 by default).
    pub fn start_motor(&mut self) -> Result<()> {
        info!("Starting motor with PWM {}", self.motor_pwm);
        self.set_motor_pwm(self.motor_pwm)?;
        self.motor_running = true;
        Ok(())
    }

    /// Stops the motor.
    pub fn stop_motor(&mut self) -> Result<()> {
        info!("Stopping motor");
        self.set_motor_pwm(0)?;
        self.motor_running = false;
        Ok(())
    }

    /// The PWM value [`RplidarDevice::start_motor`] uses.
    pub fn motor_speed(&self) -> u16 {
        self.motor_pwm
    }

    /// Sets the motor speed for subsequent starts and, when the motor is
    /// already running, applies it immediately.
    pub fn set_motor_speed(&mut self, pwm: u16) -> Result<()> {
        if pwm > RPLIDAR_MAX_MOTOR_PWM {
            return Err(Error::InvalidArgument {
                description: format!(
                    "motor pwm {} exceeds the maximum of {}",
                    pwm, RPLIDAR_MAX_MOTOR_PWM
                ),
            });
        }
        self.motor_pwm = pwm;
        if self.motor_running {
            self.set_motor_pwm(pwm)
        } else {
            Ok(())
        }
    }

    /// Returns an iterator over single measurements in the given mode,
    /// starting the motor and the scan as needed.
    ///
    /// # Example
    /// ```ignore
    /// # use rplidar_a2::{RplidarDevice, ScanMode};
    /// # fn main() -> rplidar_a2::Result<()> {
    /// let mut device = RplidarDevice::open("/dev/ttyUSB0")?;
    /// for measurement in device.measurements(ScanMode::Express)? {
    ///     let measurement = measurement?;
    ///     println!("{:.2} deg -> {:.1} mm", measurement.angle, measurement.distance);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn measurements(&mut self, mode: ScanMode) -> Result<Measurements<'_, T>> {
        self.measurements_with_options(ScanOptions::with_mode(mode))
    }

    /// Like [`RplidarDevice::measurements`], with explicit scan options.
    pub fn measurements_with_options(
        &mut self,
        options: ScanOptions,
    ) -> Result<Measurements<'_, T>> {
        self.prepare_scan(&options)?;
        Ok(Measurements {
            device: self,
            options,
        })
    }

    /// Returns an iterator over assembled 360 degree scans in the given mode,
    /// starting the motor and the scan as needed.
    ///
    /// Rotations with [`ScanOptions::min_scan_len`] points or fewer are
    /// dropped, which silently swallows the partial first rotation.
    pub fn scans(&mut self, mode: ScanMode) -> Result<Scans<'_, T>> {
        self.scans_with_options(ScanOptions::with_mode(mode))
    }

    /// Like [`RplidarDevice::scans`], with explicit scan options.
    pub fn scans_with_options(&mut self, options: ScanOptions) -> Result<Scans<'_, T>> {
        self.prepare_scan(&options)?;
        let assembler = ScanAssembler::new(options.min_scan_len);
        Ok(Scans {
            device: self,
            options,
            assembler,
        })
    }

    /// Produces the next measurement of the active stream, restarting the
    /// scan first when the unread backlog exceeds the configured ceiling.
    pub(crate) fn poll_measurement(&mut self, options: &ScanOptions) -> Result<Measurement> {
        let session = match self.session {
            Some(session) => session,
            None => {
                return Err(Error::OperationFail {
                    description: "no scan is active".to_owned(),
                })
            }
        };

        if let Some(limit) = options.max_buffered {
            let backlog = self.transport.bytes_available()?;
            if backlog > limit {
                warn!(
                    "Too many unread bytes ({} > {}), restarting the scan",
                    backlog, limit
                );
                self.stop()?;
                self.start_scan(session.mode)?;
            }
        }

        match session.mode {
            ScanMode::Normal | ScanMode::Force => {
                let raw = self.read_fixed(session.packet_size)?;
                plain::parse_measurement(&raw)
            }
            ScanMode::Express => self.poll_express_measurement(session.packet_size),
        }
    }

    /// Emits one interpolated sample from the buffered express frame pair,
    /// reading further frames off the wire whenever the pair is exhausted.
    fn poll_express_measurement(&mut self, packet_size: usize) -> Result<Measurement> {
        if self.express.trame == RPLIDAR_EXPRESS_FRAME_SAMPLES {
            if self.express.current.is_none() {
                let first = self.read_express_frame(packet_size)?;
                self.express.current = Some(first);
            }
            // state changes only after the read succeeds, so a timed out
            // pull can simply be retried
            let next = self.read_express_frame(packet_size)?;
            self.express.prev = self.express.current.take();
            self.express.current = Some(next);
            self.express.trame = 0;
        }
        self.express.trame += 1;

        match (&self.express.prev, &self.express.current) {
            (Some(prev), Some(current)) => Ok(express::interpolate(
                prev,
                current.start_angle,
                self.express.trame,
            )),
            _ => Err(Error::OperationFail {
                description: "express frame pair is not primed".to_owned(),
            }),
        }
    }

    fn read_express_frame(&mut self, packet_size: usize) -> Result<express::ExpressFrame> {
        let raw = self.read_fixed(packet_size)?;
        express::parse_frame(&raw)
    }

    /// Starts the motor and the scan for a measurement iterator. An already
    /// active session is kept as is, even when its mode differs.
    fn prepare_scan(&mut self, options: &ScanOptions) -> Result<()> {
        self.start_motor()?;
        match self.session {
            None => self.start_scan(options.mode),
            Some(session) if session.mode != options.mode => {
                warn!(
                    "A {:?} mode scan is already running, keeping it",
                    session.mode
                );
                Ok(())
            }
            Some(_) => Ok(()),
        }
    }

    fn send_command(&mut self, cmd: u8) -> Result<()> {
        let frame = encode_command(cmd, &[])?;
        trace!("Sending command: {:02X?}", frame);
        self.transport.write(&frame)
    }

    fn send_payload_command(&mut self, cmd: u8, payload: &[u8]) -> Result<()> {
        let frame = encode_command(cmd, payload)?;
        trace!("Sending command: {:02X?}", frame);
        self.transport.write(&frame)
    }

    fn read_descriptor(&mut self) -> Result<ResponseDescriptor> {
        let raw = self.transport.read(RPLIDAR_DESCRIPTOR_LEN)?;
        trace!("Received descriptor: {:02X?}", raw);
        parse_descriptor(&raw)
    }

    /// Reads exactly `n` response bytes, polling the transport until they
    /// have arrived or the response timeout elapses.
    fn read_fixed(&mut self, n: usize) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if self.transport.bytes_available()? >= n {
                let raw = self.transport.read(n)?;
                if raw.len() != n {
                    return Err(Error::FramingError {
                        description: format!("short read: expected {} bytes, got {}", n, raw.len()),
                    });
                }
                return Ok(raw);
            }
            if Instant::now() >= deadline {
                return Err(Error::OperationTimeout);
            }
            thread::sleep(RPLIDAR_READ_POLL_INTERVAL);
        }
    }

    fn require_empty_input(&mut self) -> Result<()> {
        if self.transport.bytes_available()? > 0 {
            return Err(Error::BufferNotEmpty);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Checksum;
    use crate::transport::mock::MockTransport;

    const TEST_TIMEOUT: Duration = Duration::from_millis(50);

    fn device() -> RplidarDevice<MockTransport> {
        RplidarDevice::with_timeout(MockTransport::new(), TEST_TIMEOUT)
    }

    fn descriptor(size: u32, single: bool, data_type: u8) -> Vec<u8> {
        let word = size | if single { 0 } else { 1 << 30 };
        let mut raw = vec![0xA5, 0x5A, 0, 0, 0, 0, data_type];
        LittleEndian::write_u32(&mut raw[2..6], word);
        raw
    }

    fn single_reply(data_type: u8, payload: &[u8]) -> Vec<u8> {
        let mut raw = descriptor(payload.len() as u32, true, data_type);
        raw.extend_from_slice(payload);
        raw
    }

    fn health_reply(status: u8, error_code: u16) -> Vec<u8> {
        single_reply(
            RPLIDAR_ANS_TYPE_DEVHEALTH,
            &[status, (error_code >> 8) as u8, error_code as u8],
        )
    }

    fn plain_packet(new_scan: bool, quality: u8, angle_q6: u16, distance_q2: u16) -> [u8; 5] {
        let angle_word = (angle_q6 << 1) | 0x01;
        [
            (quality << 2) | if new_scan { 0x01 } else { 0x02 },
            angle_word as u8,
            (angle_word >> 8) as u8,
            distance_q2 as u8,
            (distance_q2 >> 8) as u8,
        ]
    }

    fn express_frame(start_angle_q6: u16, distance: u16) -> Vec<u8> {
        let mut raw = vec![0u8; RPLIDAR_ANS_LEN_MEASUREMENT_CAPSULED];
        raw[2] = start_angle_q6 as u8;
        raw[3] = (start_angle_q6 >> 8) as u8;
        let low = ((distance & 0x3F) as u8) << 2;
        let high = (distance >> 6) as u8;
        let cabin = [low, high, low, high, 0];
        for index in 0..RPLIDAR_EXPRESS_CABIN_COUNT {
            raw[4 + index * 5..4 + index * 5 + 5].copy_from_slice(&cabin);
        }
        let checksum = Checksum::of(&raw[2..]);
        raw[0] = 0xA0 | (checksum & 0x0F);
        raw[1] = 0x50 | (checksum >> 4);
        raw
    }

    fn started_normal_device() -> RplidarDevice<MockTransport> {
        let mut device = device();
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_OK, 0));
        device
            .transport
            .push_reply(&descriptor(5, false, RPLIDAR_ANS_TYPE_MEASUREMENT));
        device.start_scan(ScanMode::Normal).unwrap();
        device
    }

    #[test]
    fn get_info_decodes_device_identity() {
        let mut device = device();
        let mut payload = vec![0x28, 0x15, 0x01, 0x02];
        payload.extend(0x10u8..0x20);
        device
            .transport
            .push_reply(&single_reply(RPLIDAR_ANS_TYPE_DEVINFO, &payload));

        let info = device.get_info().unwrap();
        assert_eq!(info.model, 0x28);
        assert_eq!(info.firmware_major, 0x01);
        assert_eq!(info.firmware_minor, 0x15);
        assert_eq!(info.hardware, 0x02);
        assert_eq!(info.serial_number, "101112131415161718191A1B1C1D1E1F");
        assert_eq!(device.transport.written, vec![vec![0xA5, 0x50]]);
    }

    #[test]
    fn get_health_decodes_status_and_code() {
        let mut device = device();
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_OK, 5));

        let health = device.get_health().unwrap();
        assert_eq!(
            health,
            Health {
                status: HealthStatus::Good,
                error_code: 5
            }
        );
        assert_eq!(device.transport.written, vec![vec![0xA5, 0x52]]);
    }

    #[test]
    fn get_health_rejects_unknown_status_bytes() {
        let mut device = device();
        device.transport.push_reply(&health_reply(7, 0));
        assert!(matches!(
            device.get_health(),
            Err(Error::ProtocolError { .. })
        ));
    }

    #[test]
    fn queries_are_refused_while_input_is_pending() {
        let mut device = device();
        device.transport.preload(&[0xAA]);

        assert!(matches!(device.get_info(), Err(Error::BufferNotEmpty)));
        assert!(matches!(device.get_health(), Err(Error::BufferNotEmpty)));
        assert!(device.transport.written.is_empty());
    }

    #[test]
    fn start_scan_checks_health_then_descriptor() {
        let mut device = started_normal_device();
        assert!(device.is_scanning());
        assert_eq!(
            device.transport.written,
            vec![vec![0xA5, 0x52], vec![0xA5, 0x20]]
        );

        // starting again is a no-op, even in another mode
        device.start_scan(ScanMode::Express).unwrap();
        assert_eq!(device.transport.written.len(), 2);
    }

    #[test]
    fn start_scan_proceeds_on_health_warning() {
        let mut device = device();
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_WARNING, 1));
        device
            .transport
            .push_reply(&descriptor(5, false, RPLIDAR_ANS_TYPE_MEASUREMENT));

        device.start_scan(ScanMode::Normal).unwrap();
        assert!(device.is_scanning());
    }

    #[test]
    fn start_scan_express_sends_the_padded_payload() {
        let mut device = device();
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_OK, 0));
        device.transport.push_reply(&descriptor(
            84,
            false,
            RPLIDAR_ANS_TYPE_MEASUREMENT_CAPSULED,
        ));

        device.start_scan(ScanMode::Express).unwrap();
        assert_eq!(
            device.transport.written[1],
            vec![0xA5, 0x82, 0x05, 0, 0, 0, 0, 0, 0x22]
        );
    }

    #[test]
    fn start_scan_rejects_descriptor_mismatches() {
        let mut device = device();

        // single-response mode where a stream is required
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_OK, 0));
        device
            .transport
            .push_reply(&descriptor(5, true, RPLIDAR_ANS_TYPE_MEASUREMENT));
        assert!(matches!(
            device.start_scan(ScanMode::Normal),
            Err(Error::ProtocolError { .. })
        ));
        assert!(!device.is_scanning());

        // wrong data type
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_OK, 0));
        device.transport.push_reply(&descriptor(
            5,
            false,
            RPLIDAR_ANS_TYPE_MEASUREMENT_CAPSULED,
        ));
        assert!(matches!(
            device.start_scan(ScanMode::Normal),
            Err(Error::ProtocolError { .. })
        ));
        assert!(!device.is_scanning());
    }

    #[test]
    fn start_scan_health_error_recovers_after_reset() {
        let mut device = device();
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_ERROR, 0x21));
        device.transport.push_reply(&[]); // RESET has no response
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_OK, 0));
        device
            .transport
            .push_reply(&descriptor(5, false, RPLIDAR_ANS_TYPE_MEASUREMENT));

        device.start_scan(ScanMode::Normal).unwrap();
        assert!(device.is_scanning());
        assert_eq!(
            device.transport.written,
            vec![
                vec![0xA5, 0x52],
                vec![0xA5, 0x40],
                vec![0xA5, 0x52],
                vec![0xA5, 0x20]
            ]
        );
        assert_eq!(device.transport.flushes, 1);
    }

    #[test]
    fn start_scan_health_error_becomes_a_hardware_fault() {
        let mut device = device();
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_ERROR, 0x33));
        device.transport.push_reply(&[]); // RESET
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_ERROR, 0x33));

        assert!(matches!(
            device.start_scan(ScanMode::Normal),
            Err(Error::HardwareFault { error_code: 0x33 })
        ));
        assert!(!device.is_scanning());
    }

    #[test]
    fn missing_descriptor_is_a_framing_error() {
        let mut device = device();
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_OK, 0));
        // nothing scripted for the scan command itself

        assert!(matches!(
            device.start_scan(ScanMode::Normal),
            Err(Error::FramingError { .. })
        ));
    }

    #[test]
    fn poll_without_an_active_scan_fails() {
        let mut device = device();
        assert!(matches!(
            device.poll_measurement(&ScanOptions::default()),
            Err(Error::OperationFail { .. })
        ));
    }

    #[test]
    fn measurements_flow_through_the_pull_iterator() {
        let mut device = device();
        device.transport.push_reply(&[]); // SET_MOTOR_PWM
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_OK, 0));
        let mut stream = descriptor(5, false, RPLIDAR_ANS_TYPE_MEASUREMENT);
        stream.extend_from_slice(&plain_packet(true, 10, 0, 400));
        stream.extend_from_slice(&plain_packet(false, 20, 5760, 2000));
        device.transport.push_reply(&stream);

        let mut measurements = device.measurements(ScanMode::Normal).unwrap();

        let first = measurements.next().unwrap().unwrap();
        assert!(first.new_scan);
        assert_eq!(first.quality, Some(10));
        assert_eq!(first.angle, 0.0);
        assert_eq!(first.distance, 100.0);

        let second = measurements.next().unwrap().unwrap();
        assert!(!second.new_scan);
        assert_eq!(second.angle, 90.0);
        assert_eq!(second.distance, 500.0);

        // the stream is dry now; the iterator reports it instead of ending
        assert!(matches!(
            measurements.next(),
            Some(Err(Error::OperationTimeout))
        ));

        // the motor was started with the default PWM of 660
        assert_eq!(
            device.transport.written[0],
            vec![0xA5, 0xF0, 0x02, 0x94, 0x02, 0xC1]
        );
    }

    #[test]
    fn backlog_overflow_restarts_the_scan_exactly_once() {
        let mut device = started_normal_device();
        let options = ScanOptions {
            mode: ScanMode::Normal,
            max_buffered: Some(100),
            min_scan_len: 5,
        };

        device.transport.preload(&[0x55; 200]);
        device.transport.push_reply(&[]); // STOP
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_OK, 0));
        let mut restart = descriptor(5, false, RPLIDAR_ANS_TYPE_MEASUREMENT);
        restart.extend_from_slice(&plain_packet(false, 30, 640, 40));
        device.transport.push_reply(&restart);

        // the stale backlog is shed and decoding resumes on a clean stream
        let measurement = device.poll_measurement(&options).unwrap();
        assert_eq!(measurement.angle, 10.0);
        assert_eq!(measurement.distance, 10.0);

        let stops = device
            .transport
            .written
            .iter()
            .filter(|frame| frame.as_slice() == [0xA5, 0x25])
            .count();
        assert_eq!(stops, 1);
        assert_eq!(device.transport.flushes, 1);
        assert!(device.is_scanning());
    }

    #[test]
    fn express_pull_paces_two_frames_into_32_samples() {
        let mut device = device();
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_OK, 0));
        let mut stream = descriptor(84, false, RPLIDAR_ANS_TYPE_MEASUREMENT_CAPSULED);
        stream.extend_from_slice(&express_frame(640, 1000)); // start 10 deg
        stream.extend_from_slice(&express_frame(2688, 1000)); // start 42 deg
        device.transport.push_reply(&stream);
        device.start_scan(ScanMode::Express).unwrap();

        let options = ScanOptions {
            mode: ScanMode::Express,
            max_buffered: None,
            min_scan_len: 5,
        };

        // a 32 degree span, one degree per sample
        for trame in 1..=32u16 {
            let measurement = device.poll_measurement(&options).unwrap();
            assert_eq!(measurement.quality, None);
            assert_eq!(measurement.angle, 10.0 + trame as f32);
            assert_eq!(measurement.distance, 1000.0);
        }

        // the 33rd sample needs a third frame, which has not arrived yet
        assert!(matches!(
            device.poll_measurement(&options),
            Err(Error::OperationTimeout)
        ));

        // once it arrives, the pull resumes where it left off
        device.transport.preload(&express_frame(4736, 500)); // start 74 deg
        let measurement = device.poll_measurement(&options).unwrap();
        assert_eq!(measurement.angle, 43.0);
        assert_eq!(measurement.distance, 1000.0);
    }

    #[test]
    fn scans_assemble_complete_rotations() {
        let mut device = device();
        device.transport.push_reply(&[]); // SET_MOTOR_PWM
        device
            .transport
            .push_reply(&health_reply(RPLIDAR_HEALTH_STATUS_OK, 0));
        let mut stream = descriptor(5, false, RPLIDAR_ANS_TYPE_MEASUREMENT);
        stream.extend_from_slice(&plain_packet(true, 10, 0, 400));
        for step in 1u16..6 {
            stream.extend_from_slice(&plain_packet(false, 10, step * 3840, 400));
        }
        stream.extend_from_slice(&plain_packet(true, 10, 64, 400)); // next rotation
        device.transport.push_reply(&stream);

        let mut scans = device.scans(ScanMode::Normal).unwrap();
        let scan = scans.next().unwrap().unwrap();
        assert_eq!(scan.len(), 6);
        assert_eq!(scan[0].angle, 0.0);
        assert_eq!(scan[5].angle, 300.0);
    }

    #[test]
    fn stop_ends_the_session_and_flushes() {
        let mut device = started_normal_device();
        device.transport.push_reply(&[]); // STOP

        device.stop().unwrap();
        assert!(!device.is_scanning());
        assert_eq!(device.transport.flushes, 1);
        assert!(device
            .transport
            .written
            .iter()
            .any(|frame| frame.as_slice() == [0xA5, 0x25]));
    }

    #[test]
    fn clean_input_is_refused_while_scanning() {
        let mut device = started_normal_device();
        device.transport.preload(&[1, 2, 3]);

        device.clean_input().unwrap();
        assert_eq!(device.transport.flushes, 0);
        assert_eq!(device.transport.pending_len(), 3);
    }

    #[test]
    fn motor_speed_is_validated_and_reissued_live() {
        let mut device = device();
        assert!(matches!(
            device.set_motor_pwm(1024),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            device.set_motor_speed(2000),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(device.transport.written.is_empty());

        // stored only: the motor is not running yet
        device.set_motor_speed(300).unwrap();
        assert!(device.transport.written.is_empty());
        assert_eq!(device.motor_speed(), 300);

        device.transport.push_reply(&[]);
        device.start_motor().unwrap();
        device.transport.push_reply(&[]);
        device.set_motor_speed(500).unwrap();
        device.transport.push_reply(&[]);
        device.stop_motor().unwrap();

        assert_eq!(
            device.transport.written,
            vec![
                vec![0xA5, 0xF0, 0x02, 0x2C, 0x01, 0x7A], // 300
                vec![0xA5, 0xF0, 0x02, 0xF4, 0x01, 0xA2], // 500, applied live
                vec![0xA5, 0xF0, 0x02, 0x00, 0x00, 0x57], // 0
            ]
        );
    }
}

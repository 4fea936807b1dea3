use std::error;
use std::fmt;
use std::io;

/// Represents errors that can occur while driving an RPLIDAR device.
#[derive(Debug)]
pub enum Error {
    /// The transport could not be opened. Raised at construction time only.
    ConnectionError { description: String },

    /// The requested operation cannot run in the driver's current state.
    OperationFail { description: String },

    /// Waiting for response bytes exceeded the configured timeout.
    OperationTimeout,

    /// A response descriptor did not match the contract of the command that
    /// was sent (wrong payload size, response mode or data type), or a
    /// response carried a field value the protocol does not define.
    ProtocolError { description: String },

    /// The byte stream lost framing: short descriptor read, bad sync bytes
    /// or nibbles, or a measurement packet whose check bits are inconsistent.
    FramingError { description: String },

    /// An express frame failed its XOR checksum. The frame is discarded.
    ChecksumError { description: String },

    /// The device still reports a hardware error after a reset attempt.
    /// Contains the device's error code.
    HardwareFault { error_code: u16 },

    /// Unread scan bytes are pending in the input buffer, so a command with
    /// a fixed-size response cannot be issued. Stop the scan or call
    /// `clean_input` first.
    BufferNotEmpty,

    /// A caller-supplied value is outside the range the device accepts.
    InvalidArgument { description: String },

    /// An I/O error occurred on the underlying transport.
    IoError(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConnectionError { description } => {
                write!(f, "connection error: {}", description)
            }
            Error::OperationFail { description } => write!(f, "operation failed: {}", description),
            Error::OperationTimeout => write!(f, "operation timeout"),
            Error::ProtocolError { description } => write!(f, "protocol error: {}", description),
            Error::FramingError { description } => write!(f, "framing error: {}", description),
            Error::ChecksumError { description } => write!(f, "checksum error: {}", description),
            Error::HardwareFault { error_code } => {
                write!(f, "device health error, error code: {}", error_code)
            }
            Error::BufferNotEmpty => write!(f, "input buffer holds unread scan bytes"),
            Error::InvalidArgument { description } => {
                write!(f, "invalid argument: {}", description)
            }
            Error::IoError(err) => write!(f, "io error: {}", err),
        }
    }
}

impl error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IoError(err)
    }
}

/// A specialized `Result` type for RPLIDAR operations.
pub type Result<T> = std::result::Result<T, Error>;

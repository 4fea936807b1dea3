use crate::error::{Error, Result};
use crate::internals::{RPLIDAR_DEFAULT_BAUD_RATE, RPLIDAR_DEFAULT_TIMEOUT};
use log::trace;
use serialport::{ClearBuffer, SerialPort};
use std::fmt;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// Byte-stream access to an RPLIDAR unit.
///
/// The driver owns exactly one transport and serializes all access through
/// the consumer's pull loop, so implementations do not need interior
/// synchronization. `read` may return fewer bytes than requested when the
/// transport's own timeout elapses first; callers that need a guaranteed
/// length poll `bytes_available` beforehand.
pub trait Transport {
    /// Number of received bytes waiting to be read.
    fn bytes_available(&mut self) -> Result<usize>;

    /// Reads up to `n` bytes, blocking no longer than the transport timeout.
    fn read(&mut self, n: usize) -> Result<Vec<u8>>;

    /// Writes the whole buffer.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Discards everything currently waiting in the input buffer.
    fn flush_input(&mut self) -> Result<()>;
}

/// `Transport` over a serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl SerialTransport {
    /// Opens `path` at the default A2 baud rate (115200) and timeout (1 s).
    ///
    /// # Arguments
    ///
    /// * `path` - Serial port path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub fn open(path: &str) -> Result<SerialTransport> {
        SerialTransport::open_with_options(path, RPLIDAR_DEFAULT_BAUD_RATE, RPLIDAR_DEFAULT_TIMEOUT)
    }

    /// Opens `path` with an explicit baud rate and read timeout.
    pub fn open_with_options(
        path: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<SerialTransport> {
        trace!("Opening serial port {} at {} baud", path, baud_rate);
        let port = serialport::new(path, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|err| Error::ConnectionError {
                description: format!("failed to open {}: {}", path, err),
            })?;
        Ok(SerialTransport { port, timeout })
    }
}

impl Transport for SerialTransport {
    fn bytes_available(&mut self) -> Result<usize> {
        let count = self.port.bytes_to_read().map_err(io::Error::from)?;
        Ok(count as usize)
    }

    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        let deadline = Instant::now() + self.timeout;
        while filled < n {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(count) => filled += count,
                Err(err) if err.kind() == io::ErrorKind::TimedOut => break,
                Err(err) => return Err(err.into()),
            }
            if Instant::now() >= deadline {
                break;
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn flush_input(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::Input).map_err(io::Error::from)?;
        Ok(())
    }
}

impl fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::Transport;
    use crate::error::Result;
    use std::collections::VecDeque;

    /// Scripted in-memory transport for driver tests.
    ///
    /// Bytes queued with `push_reply` become readable after the next write,
    /// mirroring the command/response rhythm of the real device; `preload`
    /// makes bytes readable immediately (e.g. a stale backlog).
    #[derive(Debug, Default)]
    pub struct MockTransport {
        pending: VecDeque<u8>,
        replies: VecDeque<Vec<u8>>,
        pub written: Vec<Vec<u8>>,
        pub flushes: usize,
    }

    impl MockTransport {
        pub fn new() -> MockTransport {
            MockTransport::default()
        }

        /// Queues the response the device would send to the next command.
        /// One entry is consumed per write; use an empty slice for commands
        /// the device does not answer.
        pub fn push_reply(&mut self, bytes: &[u8]) {
            self.replies.push_back(bytes.to_vec());
        }

        /// Makes bytes readable without waiting for a write.
        pub fn preload(&mut self, bytes: &[u8]) {
            self.pending.extend(bytes.iter().copied());
        }

        pub fn pending_len(&self) -> usize {
            self.pending.len()
        }
    }

    impl Transport for MockTransport {
        fn bytes_available(&mut self) -> Result<usize> {
            Ok(self.pending.len())
        }

        fn read(&mut self, n: usize) -> Result<Vec<u8>> {
            let take = n.min(self.pending.len());
            Ok(self.pending.drain(..take).collect())
        }

        fn write(&mut self, bytes: &[u8]) -> Result<()> {
            self.written.push(bytes.to_vec());
            if let Some(reply) = self.replies.pop_front() {
                self.pending.extend(reply);
            }
            Ok(())
        }

        fn flush_input(&mut self) -> Result<()> {
            self.pending.clear();
            self.flushes += 1;
            Ok(())
        }
    }
}

use crate::checksum::Checksum;
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use log::error;

const RPLIDAR_CMD_SYNC_BYTE: u8 = 0xA5;

const RPLIDAR_ANS_SYNC_BYTES: [u8; 2] = [0xA5, 0x5A];

/// The size of an RPLIDAR response descriptor, sync bytes included.
pub const RPLIDAR_DESCRIPTOR_LEN: usize = 7;

const RPLIDAR_ANS_HEADER_SIZE_MASK: u32 = 0x3FFF_FFFF;
const RPLIDAR_ANS_HEADER_SUBTYPE_SHIFT: usize = 30;

const RPLIDAR_ANS_SEND_MODE_SINGLE: u8 = 0x0;

/// Frames a command for the wire.
///
/// A payload-less command is the sync byte followed by the command byte. A
/// command with a payload appends the payload length, the payload itself and
/// an XOR checksum of every preceding byte in the frame.
pub fn encode_command(cmd: u8, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > 255 {
        error!("Payload too large: {} bytes (max 255)", payload.len());
        return Err(Error::OperationFail {
            description: "payload too big".to_owned(),
        });
    }

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.push(RPLIDAR_CMD_SYNC_BYTE);
    frame.push(cmd);

    if !payload.is_empty() {
        frame.push(payload.len() as u8);
        frame.extend_from_slice(payload);
        frame.push(Checksum::of(&frame));
    }

    Ok(frame)
}

/// A parsed 7-byte response descriptor: what the device is about to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseDescriptor {
    /// Payload size of each following response packet.
    pub size: usize,
    /// `true` for a single response, `false` for a multi-response stream.
    pub single: bool,
    /// Data type code of the following response packets.
    pub data_type: u8,
}

impl ResponseDescriptor {
    /// Checks that the descriptor announces a single response of exactly
    /// `size` bytes with data type `data_type`.
    pub fn expect_single(&self, size: usize, data_type: u8) -> Result<()> {
        if self.size != size {
            return Err(Error::ProtocolError {
                description: format!("wrong reply length: expected {}, got {}", size, self.size),
            });
        }
        if !self.single {
            return Err(Error::ProtocolError {
                description: "not a single response mode".to_owned(),
            });
        }
        self.expect_data_type(data_type)
    }

    /// Checks that the descriptor announces a multi-response stream of
    /// `size`-byte packets with data type `data_type`.
    pub fn expect_multi(&self, size: usize, data_type: u8) -> Result<()> {
        if self.size != size {
            return Err(Error::ProtocolError {
                description: format!("wrong reply length: expected {}, got {}", size, self.size),
            });
        }
        if self.single {
            return Err(Error::ProtocolError {
                description: "not a multiple response mode".to_owned(),
            });
        }
        self.expect_data_type(data_type)
    }

    fn expect_data_type(&self, data_type: u8) -> Result<()> {
        if self.data_type != data_type {
            return Err(Error::ProtocolError {
                description: format!(
                    "wrong response data type: expected {:02X}, got {:02X}",
                    data_type, self.data_type
                ),
            });
        }
        Ok(())
    }
}

/// Parses a raw response descriptor.
///
/// Expects exactly 7 bytes starting with the sync pair. The four bytes after
/// the sync pair form a little-endian word holding the payload size in its
/// low 30 bits and the send mode in the top 2; the final byte is the data
/// type.
pub fn parse_descriptor(raw: &[u8]) -> Result<ResponseDescriptor> {
    if raw.len() != RPLIDAR_DESCRIPTOR_LEN {
        error!(
            "Descriptor length mismatch: expected {}, got {}",
            RPLIDAR_DESCRIPTOR_LEN,
            raw.len()
        );
        return Err(Error::FramingError {
            description: format!(
                "descriptor length mismatch: expected {}, got {}",
                RPLIDAR_DESCRIPTOR_LEN,
                raw.len()
            ),
        });
    }

    if raw[0..2] != RPLIDAR_ANS_SYNC_BYTES {
        error!(
            "Descriptor sync mismatch: got {:02X} {:02X}",
            raw[0], raw[1]
        );
        return Err(Error::FramingError {
            description: "descriptor does not start with the sync pair".to_owned(),
        });
    }

    let size_q30_subtype = LittleEndian::read_u32(&raw[2..6]);
    let send_mode = (size_q30_subtype >> RPLIDAR_ANS_HEADER_SUBTYPE_SHIFT) as u8;

    Ok(ResponseDescriptor {
        size: (size_q30_subtype & RPLIDAR_ANS_HEADER_SIZE_MASK) as usize,
        single: send_mode == RPLIDAR_ANS_SEND_MODE_SINGLE,
        data_type: raw[6],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Checksum;

    #[test]
    fn encode_without_payload() {
        assert_eq!(encode_command(0x25, &[]).unwrap().as_slice(), [0xA5, 0x25]);
        assert_eq!(encode_command(0x40, &[]).unwrap().as_slice(), [0xA5, 0x40]);
    }

    #[test]
    fn encode_with_payload() {
        assert_eq!(
            encode_command(0x82, &[0; 5]).unwrap().as_slice(),
            [0xA5, 0x82, 0x05, 0, 0, 0, 0, 0, 0x22]
        );

        // motor PWM: 660 little-endian
        assert_eq!(
            encode_command(0xF0, &[0x94, 0x02]).unwrap().as_slice(),
            [0xA5, 0xF0, 0x02, 0x94, 0x02, 0xC1]
        );
    }

    #[test]
    fn encoded_checksum_is_xor_of_preceding_bytes() {
        for payload in [&[0u8, 0, 0, 0, 0][..], &[0x94, 0x02], &[0xFF], &[1, 2, 3, 4, 5, 6, 7]] {
            let frame = encode_command(0xF0, payload).unwrap();
            let (body, tail) = frame.split_at(frame.len() - 1);
            assert_eq!(tail[0], Checksum::of(body));
        }
    }

    #[test]
    fn parse_single_response_descriptor() {
        let descriptor = parse_descriptor(&[0xA5, 0x5A, 0x14, 0x00, 0x00, 0x00, 0x04]).unwrap();
        assert_eq!(descriptor.size, 20);
        assert!(descriptor.single);
        assert_eq!(descriptor.data_type, 0x04);
        assert!(descriptor.expect_single(20, 0x04).is_ok());
        assert!(descriptor.expect_multi(20, 0x04).is_err());
    }

    #[test]
    fn parse_multi_response_descriptor() {
        let descriptor = parse_descriptor(&[0xA5, 0x5A, 0x05, 0x00, 0x00, 0x40, 0x81]).unwrap();
        assert_eq!(descriptor.size, 5);
        assert!(!descriptor.single);
        assert_eq!(descriptor.data_type, 0x81);
        assert!(descriptor.expect_multi(5, 0x81).is_ok());
        assert!(descriptor.expect_multi(84, 0x81).is_err());
        assert!(descriptor.expect_multi(5, 0x82).is_err());
        assert!(descriptor.expect_single(5, 0x81).is_err());
    }

    #[test]
    fn parse_express_descriptor() {
        let descriptor = parse_descriptor(&[0xA5, 0x5A, 0x54, 0x00, 0x00, 0x40, 0x82]).unwrap();
        assert_eq!(descriptor.size, 84);
        assert!(!descriptor.single);
        assert!(descriptor.expect_multi(84, 0x82).is_ok());
    }

    #[test]
    fn reject_short_descriptor() {
        let err = parse_descriptor(&[0xA5, 0x5A, 0x05]).unwrap_err();
        assert!(matches!(err, Error::FramingError { .. }));
    }

    #[test]
    fn reject_bad_sync_pair() {
        let err = parse_descriptor(&[0x5A, 0xA5, 0x05, 0x00, 0x00, 0x40, 0x81]).unwrap_err();
        assert!(matches!(err, Error::FramingError { .. }));
    }
}

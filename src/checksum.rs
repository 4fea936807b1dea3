/// 8-bit XOR accumulator used for command frame trailers and express frame
/// validation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Checksum {
    value: u8,
}

impl Checksum {
    /// Creates a new `Checksum` initialized to 0.
    #[inline]
    pub fn new() -> Checksum {
        Checksum { value: 0 }
    }

    /// Includes a single byte in the checksum.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.value ^= byte;
    }

    /// Includes a slice of bytes in the checksum.
    #[inline]
    pub fn push_slice(&mut self, data: &[u8]) {
        for b in data {
            self.value ^= b;
        }
    }

    /// Returns the accumulated checksum value.
    #[inline]
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Convenience for checksumming a complete slice in one call.
    #[inline]
    pub fn of(data: &[u8]) -> u8 {
        let mut checksum = Checksum::new();
        checksum.push_slice(data);
        checksum.value()
    }
}

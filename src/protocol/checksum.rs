//! # Heatmiser Frame Checksum
//!
//! The V3 protocol protects every frame with a 16-bit CRC (polynomial 0x1021,
//! initial value 0xFFFF, no reflection), computed a nibble at a time from two
//! 16-entry lookup tables. The result travels low byte first.
//!
//! The accumulator lives on the stack of each call, so two computations can never
//! influence each other.

/// High accumulator byte contributions, indexed by the combined nibble
const CRC16_LOOKUP_HIGH: [u8; 16] = [
    0x00, 0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x81, 0x91, 0xA1, 0xB1, 0xC1, 0xD1, 0xE1,
    0xF1,
];

/// Low accumulator byte contributions, indexed by the combined nibble
const CRC16_LOOKUP_LOW: [u8; 16] = [
    0x00, 0x21, 0x42, 0x63, 0x84, 0xA5, 0xC6, 0xE7, 0x08, 0x29, 0x4A, 0x6B, 0x8C, 0xAD, 0xCE,
    0xEF,
];

/// A computed checksum, split the way it is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksum {
    pub low: u8,
    pub high: u8,
}

impl Checksum {
    /// The checksum as a 16-bit value.
    pub fn value(&self) -> u16 {
        u16::from_le_bytes([self.low, self.high])
    }

    /// Wire order: low byte first.
    pub fn to_bytes(self) -> [u8; 2] {
        [self.low, self.high]
    }

    pub fn as_pair(&self) -> (u8, u8) {
        (self.low, self.high)
    }
}

struct Accumulator {
    high: u8,
    low: u8,
}

impl Accumulator {
    fn new() -> Self {
        Accumulator {
            high: 0xFF,
            low: 0xFF,
        }
    }

    fn update_nibble(&mut self, nibble: u8) {
        let t = ((self.high >> 4) ^ nibble) as usize & 0x0F;
        self.high = (self.high << 4) | (self.low >> 4);
        self.low <<= 4;
        self.high ^= CRC16_LOOKUP_HIGH[t];
        self.low ^= CRC16_LOOKUP_LOW[t];
    }

    fn update(&mut self, byte: u8) {
        self.update_nibble(byte >> 4);
        self.update_nibble(byte & 0x0F);
    }
}

/// Computes the frame checksum over `data`.
pub fn checksum(data: &[u8]) -> Checksum {
    let mut acc = Accumulator::new();
    for &byte in data {
        acc.update(byte);
    }
    Checksum {
        low: acc.low,
        high: acc.high,
    }
}

/// Appends the checksum of `frame` to it.
pub fn append_checksum(frame: &mut Vec<u8>) {
    let crc = checksum(frame);
    frame.extend_from_slice(&crc.to_bytes());
}

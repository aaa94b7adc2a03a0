//! MSB-first bit packing over caller-owned byte buffers.
//!
//! [`BitWriter`] packs variable-length codes into a fixed slice without ever
//! growing it: a write that would spill past the end fails with
//! `HuffmanError::Overflow` and leaves the slice untouched beyond its end.
//! [`BitReader`] walks a slice one bit at a time.
//!
//! # Padding Rules
//! - BitWriter: the final partial byte keeps zeros in its unused low bits
//!   (the writer zeroes the destination up front)
//! - BitReader: padding bits are indistinguishable from data; callers bound
//!   decoding by symbol count
//!
//! # Example
//! ```
//! use serialpipe_core::bitio::{BitReader, BitWriter};
//!
//! let mut buf = [0xFFu8; 2];
//! let mut writer = BitWriter::new(&mut buf);
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b11, 2).unwrap();
//! assert_eq!(writer.bit_len(), 5);
//! assert_eq!(buf, [0b1011_1000, 0]);
//!
//! let mut reader = BitReader::new(&buf);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! ```

use crate::error::{BitIoError, HuffmanError, Result};

/// Writes bits MSB-first into a fixed-size byte slice.
///
/// # Invariants
/// - `bit_position <= out.len() * 8`
/// - every bit at or after `bit_position` is zero
#[derive(Debug)]
pub struct BitWriter<'a> {
    out: &'a mut [u8],
    bit_position: usize,
}

impl<'a> BitWriter<'a> {
    /// Start writing at the beginning of `out`, which is cleared first.
    pub fn new(out: &'a mut [u8]) -> Self {
        out.fill(0);
        Self {
            out,
            bit_position: 0,
        }
    }

    /// Write the lowest `count` bits of `value`, most significant first.
    ///
    /// Bits may straddle byte boundaries. Writing 0 bits is a no-op.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 32
    /// - `HuffmanError::Overflow` if the bits do not fit; nothing is written
    pub fn write_bits(&mut self, value: u32, count: usize) -> Result<()> {
        if count > 32 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        if count > self.bits_remaining() {
            return Err(HuffmanError::Overflow {
                capacity: self.out.len(),
            }
            .into());
        }

        let mut remaining = count;
        while remaining > 0 {
            let byte_idx = self.bit_position / 8;
            let used = self.bit_position % 8;

            // How many bits fit in the current byte
            let this_write = remaining.min(8 - used);

            // Take the top `this_write` of the remaining bits, shift them
            // down to the LSB, then up into position within the byte
            let read_shift = remaining - this_write;
            let bits = (value >> read_shift) & ((1u32 << this_write) - 1);
            let write_shift = 8 - used - this_write;

            self.out[byte_idx] |= (bits as u8) << write_shift;

            self.bit_position += this_write;
            remaining -= this_write;
        }

        Ok(())
    }

    /// Total number of bits written.
    pub fn bit_len(&self) -> usize {
        self.bit_position
    }

    /// Number of bytes touched so far, including a partial last byte.
    pub fn byte_len(&self) -> usize {
        self.bit_position.div_ceil(8)
    }

    /// Bits of space left in the destination.
    pub fn bits_remaining(&self) -> usize {
        self.out.len() * 8 - self.bit_position
    }
}

/// Reads bits MSB-first from a byte buffer.
///
/// Caller must track how many bits are valid; padding bits at the end
/// of the buffer are not distinguishable from data.
///
/// # Invariants
/// - `bit_position` never exceeds `data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_position: 0,
        }
    }

    /// Read a single bit.
    ///
    /// # Errors
    /// `BitIoError::UnexpectedEof` once every bit has been consumed.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = self
            .data
            .get(self.bit_position / 8)
            .ok_or(BitIoError::UnexpectedEof)?;
        let bit = (byte >> (7 - self.bit_position % 8)) & 1;
        self.bit_position += 1;
        Ok(bit == 1)
    }

    /// Read up to 32 bits as a right-aligned value.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 32
    /// - `BitIoError::UnexpectedEof` if not enough bits remain (nothing is
    ///   consumed in that case)
    pub fn read_bits(&mut self, count: usize) -> Result<u32> {
        if count > 32 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        if count > self.bits_remaining() {
            return Err(BitIoError::UnexpectedEof.into());
        }

        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | u32::from(self.read_bit()?);
        }
        Ok(value)
    }

    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.bit_position
    }

    /// Current bit position (0 = MSB of first byte).
    pub fn position(&self) -> usize {
        self.bit_position
    }

    pub fn is_empty(&self) -> bool {
        self.bit_position >= self.data.len() * 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_write_read_partial_bits() {
        let mut buf = [0u8; 1];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b11, 2).unwrap();
        writer.write_bits(0b000, 3).unwrap();
        assert_eq!(writer.bit_len(), 8);
        assert_eq!(buf, [0b10111000]);

        let mut reader = BitReader::new(&buf);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        assert_eq!(reader.read_bits(3).unwrap(), 0b000);
    }

    #[test]
    fn test_clears_destination() {
        let mut buf = [0xAAu8; 3];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bits(0b1, 1).unwrap();
        assert_eq!(writer.byte_len(), 1);
        assert_eq!(buf, [0b1000_0000, 0, 0]);
    }

    #[test]
    fn test_code_straddles_bytes() {
        let mut buf = [0u8; 3];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bits(0b111111, 6).unwrap();
        writer.write_bits(0b1010_1010_1010, 12).unwrap();
        assert_eq!(writer.bit_len(), 18);
        assert_eq!(writer.byte_len(), 3);
        assert_eq!(buf, [0b1111_1110, 0b1010_1010, 0b1000_0000]);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut buf = [0u8; 1];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bits(0b1111, 4).unwrap();

        let result = writer.write_bits(0b10101, 5);
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::Overflow { capacity: 1 }))
        ));
        assert_eq!(writer.bit_len(), 4);

        // Exactly filling the buffer is fine
        writer.write_bits(0b0101, 4).unwrap();
        assert_eq!(buf, [0b1111_0101]);
    }

    #[test]
    fn test_32_bit_values() {
        let mut buf = [0u8; 5];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bits(0b1, 1).unwrap();
        writer.write_bits(0xDEAD_BEEF, 32).unwrap();

        let mut reader = BitReader::new(&buf);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(32).unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.bits_remaining(), 7);
    }

    #[test]
    fn test_invalid_bit_count() {
        let mut buf = [0u8; 8];
        let mut writer = BitWriter::new(&mut buf);
        assert!(writer.write_bits(0, 33).is_err());

        let mut reader = BitReader::new(&buf);
        assert!(matches!(
            reader.read_bits(33),
            Err(Error::BitIo(BitIoError::InvalidBitCount(33)))
        ));
    }

    #[test]
    fn test_read_past_end() {
        let data = [0b10101010];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(8).unwrap(), 0b10101010);
        assert!(reader.is_empty());
        assert!(matches!(
            reader.read_bit(),
            Err(Error::BitIo(BitIoError::UnexpectedEof))
        ));
    }

    #[test]
    fn test_bit_by_bit() {
        let data = [0b10110010];
        let mut reader = BitReader::new(&data);
        let expected = [true, false, true, true, false, false, true, false];
        for (i, &exp) in expected.iter().enumerate() {
            assert_eq!(reader.position(), i);
            assert_eq!(reader.read_bit().unwrap(), exp);
        }
    }
}

//! Static-table Huffman codec.
//!
//! Encoding looks each symbol up in a [`CodeTable`] and packs its code
//! MSB-first into a caller-owned buffer. Decoding walks the bitstream one
//! bit at a time, testing the accumulated `(length, pattern)` pair against
//! the table after every bit; since the table is prefix-free the first match
//! is the symbol.
//!
//! The encoded stream carries no length information of its own. The final
//! byte may hold zero padding that looks exactly like code bits, so the
//! decoder must be told how many symbols to produce. Callers carry the
//! symbol count and bit count out-of-band (see [`crate::framing`]).
//!
//! # Example
//! ```
//! use serialpipe_core::huffman::{bytes_for_bits, decode, encode};
//!
//! let message = b"hello world";
//! let mut encoded = [0u8; 32];
//! let bits = encode(message, &mut encoded).unwrap();
//!
//! let mut decoded = [0u8; 11];
//! decode(&encoded[..bytes_for_bits(bits)], message.len(), &mut decoded).unwrap();
//! assert_eq!(&decoded, message);
//! ```

use crate::bitio::{BitReader, BitWriter};
use crate::error::{HuffmanError, Result};
use crate::table::{CodeTable, DEFAULT_TABLE};

/// Number of bytes needed to hold `bits` bits.
#[inline]
pub fn bytes_for_bits(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Encoder/decoder bound to one static code table.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    table: &'static CodeTable,
}

impl Codec {
    pub const fn new(table: &'static CodeTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'static CodeTable {
        self.table
    }

    /// Encode `message` into `out`, returning the number of bits written.
    ///
    /// `out` is zeroed first, so the unused low bits of the last byte are 0.
    /// The result is in bits; use [`bytes_for_bits`] for the byte count.
    ///
    /// # Errors
    /// - `HuffmanError::UnknownSymbol` if a byte has no code in the table
    /// - `HuffmanError::Overflow` if the encoding does not fit in `out`
    pub fn encode(&self, message: &[u8], out: &mut [u8]) -> Result<usize> {
        let mut writer = BitWriter::new(out);

        for (position, &symbol) in message.iter().enumerate() {
            let entry = self
                .table
                .lookup(symbol)
                .ok_or(HuffmanError::UnknownSymbol { symbol, position })?;
            writer.write_bits(entry.code, entry.len as usize)?;
        }

        Ok(writer.bit_len())
    }

    /// Encoded size of `message` in bits, without writing anything.
    ///
    /// # Errors
    /// `HuffmanError::UnknownSymbol` if a byte has no code in the table.
    pub fn encoded_bits(&self, message: &[u8]) -> Result<usize> {
        message
            .iter()
            .enumerate()
            .try_fold(0usize, |bits, (position, &symbol)| {
                let entry = self
                    .table
                    .lookup(symbol)
                    .ok_or(HuffmanError::UnknownSymbol { symbol, position })?;
                Ok(bits + entry.len as usize)
            })
    }

    /// Decode exactly `symbol_count` symbols from `encoded` into the front
    /// of `out`.
    ///
    /// Bits after the last symbol (padding) are ignored.
    ///
    /// # Errors
    /// Only reachable for input not produced by this table:
    /// - `HuffmanError::OutputTooSmall` if `out` is shorter than `symbol_count`
    /// - `BitIoError::UnexpectedEof` if the stream ends mid-message
    /// - `HuffmanError::InvalidCode` if no code matches within the table's
    ///   longest code length
    pub fn decode(&self, encoded: &[u8], symbol_count: usize, out: &mut [u8]) -> Result<()> {
        if out.len() < symbol_count {
            return Err(HuffmanError::OutputTooSmall {
                required: symbol_count,
                actual: out.len(),
            }
            .into());
        }

        let mut reader = BitReader::new(encoded);
        for slot in &mut out[..symbol_count] {
            *slot = self.decode_symbol(&mut reader)?;
        }

        Ok(())
    }

    /// Decode `symbol_count` symbols into a new vector.
    pub fn decode_to_vec(&self, encoded: &[u8], symbol_count: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; symbol_count];
        self.decode(encoded, symbol_count, &mut out)?;
        Ok(out)
    }

    fn decode_symbol(&self, reader: &mut BitReader<'_>) -> Result<u8> {
        let position = reader.position();
        let mut code = 0u32;
        let mut len = 0u8;

        loop {
            code = (code << 1) | u32::from(reader.read_bit()?);
            len += 1;

            if let Some(symbol) = self.table.match_code(len, code) {
                return Ok(symbol);
            }
            if len >= self.table.max_len() {
                return Err(HuffmanError::InvalidCode { position }.into());
            }
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(&DEFAULT_TABLE)
    }
}

/// Encode with the built-in table. See [`Codec::encode`].
pub fn encode(message: &[u8], out: &mut [u8]) -> Result<usize> {
    Codec::default().encode(message, out)
}

/// Decode with the built-in table. See [`Codec::decode`].
pub fn decode(encoded: &[u8], symbol_count: usize, out: &mut [u8]) -> Result<()> {
    Codec::default().decode(encoded, symbol_count, out)
}

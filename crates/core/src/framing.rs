//! Serial frame header and message framing.
//!
//! Every compressed unit on the wire is a 3-byte header followed by the
//! packed code bits:
//!
//! ```text
//! +--------------------+
//! | symbol_count (1)   |  original symbols in this frame
//! +--------------------+
//! | encoded_bits (1)   |  total code bits
//! +--------------------+
//! | encoded_bytes (1)  |  ceil(encoded_bits / 8)
//! +--------------------+
//! | payload            |  encoded_bytes bytes, MSB-first, zero padded
//! | (variable)         |
//! +--------------------+
//! ```
//!
//! Each field is a single byte, so one frame carries at most 255 symbols and
//! 255 code bits (32 payload bytes). [`split_message`] cuts longer text into
//! pieces that respect both limits.
//!
//! The receiver bounds decoding with `symbol_count`: padding bits in the
//! last payload byte are not distinguishable from code bits.

use crate::error::{FramingError, HuffmanError, Result};
use crate::huffman::{bytes_for_bits, Codec};

/// Size of the frame header in bytes
pub const HEADER_SIZE: usize = 3;

/// Largest value a one-byte header field can carry
pub const MAX_FIELD: usize = u8::MAX as usize;

/// Largest payload a frame can announce
pub const MAX_PAYLOAD: usize = MAX_FIELD.div_ceil(8);

/// Parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Number of symbols encoded in the payload
    pub symbol_count: u8,

    /// Number of meaningful bits in the payload
    pub encoded_bits: u8,

    /// Payload length in bytes
    pub encoded_bytes: u8,
}

impl FrameHeader {
    /// Build a header for `symbol_count` symbols packed into `encoded_bits`.
    ///
    /// # Errors
    /// `FramingError::FieldOverflow` if either count exceeds 255.
    pub fn new(symbol_count: usize, encoded_bits: usize) -> Result<Self> {
        let symbol_count = narrow("symbol_count", symbol_count)?;
        let encoded_bits = narrow("encoded_bits", encoded_bits)?;

        Ok(Self {
            symbol_count,
            encoded_bits,
            encoded_bytes: bytes_for_bits(encoded_bits as usize) as u8,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        [self.symbol_count, self.encoded_bits, self.encoded_bytes]
    }

    /// Parse a header from the first three bytes of `bytes`.
    ///
    /// # Errors
    /// - `FramingError::HeaderTooShort` if fewer than 3 bytes are given
    /// - `FramingError::ByteCountMismatch` if `encoded_bytes` is not
    ///   `ceil(encoded_bits / 8)`
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let [symbol_count, encoded_bits, encoded_bytes] = match bytes.get(..HEADER_SIZE) {
            Some(&[a, b, c]) => [a, b, c],
            _ => {
                return Err(FramingError::HeaderTooShort {
                    required: HEADER_SIZE,
                    actual: bytes.len(),
                }
                .into())
            }
        };

        let expected = bytes_for_bits(encoded_bits as usize);
        if encoded_bytes as usize != expected {
            return Err(FramingError::ByteCountMismatch {
                bits: encoded_bits as usize,
                expected,
                actual: encoded_bytes as usize,
            }
            .into());
        }

        Ok(Self {
            symbol_count,
            encoded_bits,
            encoded_bytes,
        })
    }

    pub fn payload_len(&self) -> usize {
        self.encoded_bytes as usize
    }
}

fn narrow(field: &'static str, value: usize) -> Result<u8> {
    u8::try_from(value).map_err(|_| FramingError::FieldOverflow { field, value }.into())
}

/// Encode `message` and prepend its header.
///
/// # Errors
/// - `HuffmanError::UnknownSymbol` for bytes outside the table
/// - `FramingError::FieldOverflow` if the message is too long for one frame
pub fn encode_frame(codec: &Codec, message: &[u8]) -> Result<Vec<u8>> {
    let bits = codec.encoded_bits(message)?;
    let header = FrameHeader::new(message.len(), bits)?;

    let mut frame = vec![0u8; HEADER_SIZE + header.payload_len()];
    frame[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
    codec.encode(message, &mut frame[HEADER_SIZE..])?;

    Ok(frame)
}

/// Parse and decode one complete frame.
///
/// Bytes after the announced payload are ignored.
pub fn decode_frame(codec: &Codec, frame: &[u8]) -> Result<Vec<u8>> {
    let header = FrameHeader::parse(frame)?;
    let payload = &frame[HEADER_SIZE..];

    if payload.len() < header.payload_len() {
        return Err(FramingError::PayloadTooShort {
            required: header.payload_len(),
            actual: payload.len(),
        }
        .into());
    }

    codec.decode_to_vec(
        &payload[..header.payload_len()],
        header.symbol_count as usize,
    )
}

/// Split `message` into pieces that each fit in a single frame.
///
/// Pieces are taken greedily: each holds as many symbols as fit in 255
/// symbols and 255 code bits. An empty message yields no pieces.
///
/// # Errors
/// `HuffmanError::UnknownSymbol` for bytes outside the table.
pub fn split_message<'m>(codec: &Codec, message: &'m [u8]) -> Result<Vec<&'m [u8]>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut bits = 0;

    for (position, &symbol) in message.iter().enumerate() {
        let len = codec
            .table()
            .lookup(symbol)
            .ok_or(HuffmanError::UnknownSymbol { symbol, position })?
            .len as usize;

        if position - start == MAX_FIELD || bits + len > MAX_FIELD {
            pieces.push(&message[start..position]);
            start = position;
            bits = 0;
        }
        bits += len;
    }

    if start < message.len() {
        pieces.push(&message[start..]);
    }

    Ok(pieces)
}

/// Incremental frame receiver.
///
/// Fed one byte at a time (typically straight out of the inbound ring
/// buffer), it collects a header, then the announced payload, and yields the
/// decoded message once the frame is complete.
///
/// A malformed header or undecodable payload is reported and the decoder
/// resets to wait for the next header.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    codec: Codec,
    header: [u8; HEADER_SIZE],
    header_len: usize,
    pending: Option<FrameHeader>,
    payload: [u8; MAX_PAYLOAD],
    payload_len: usize,
}

impl FrameDecoder {
    pub fn new(codec: Codec) -> Self {
        Self {
            codec,
            header: [0; HEADER_SIZE],
            header_len: 0,
            pending: None,
            payload: [0; MAX_PAYLOAD],
            payload_len: 0,
        }
    }

    /// Feed one received byte.
    ///
    /// Returns `Ok(Some(message))` when the byte completes a frame.
    pub fn push(&mut self, byte: u8) -> Result<Option<Vec<u8>>> {
        let header = match self.pending {
            Some(header) => {
                self.payload[self.payload_len] = byte;
                self.payload_len += 1;
                header
            }
            None => {
                self.header[self.header_len] = byte;
                self.header_len += 1;
                if self.header_len < HEADER_SIZE {
                    return Ok(None);
                }

                self.header_len = 0;
                let header = FrameHeader::parse(&self.header)?;
                self.pending = Some(header);
                header
            }
        };

        if self.payload_len < header.payload_len() {
            return Ok(None);
        }

        let payload_len = self.payload_len;
        self.reset();
        self.codec
            .decode_to_vec(&self.payload[..payload_len], header.symbol_count as usize)
            .map(Some)
    }

    /// Feed a run of bytes, collecting every completed message.
    ///
    /// Stops at the first error; bytes after it are not consumed.
    pub fn push_slice(&mut self, bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut messages = Vec::new();
        for &byte in bytes {
            if let Some(message) = self.push(byte)? {
                messages.push(message);
            }
        }
        Ok(messages)
    }

    /// True when no partial frame is buffered.
    pub fn is_idle(&self) -> bool {
        self.header_len == 0 && self.pending.is_none()
    }

    /// Drop any partial frame.
    pub fn reset(&mut self) {
        self.header_len = 0;
        self.pending = None;
        self.payload_len = 0;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(Codec::default())
    }
}

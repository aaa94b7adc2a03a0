//! Error types for the serial pipeline.
//!
//! Ring buffer capacity conditions are not errors: a full or empty buffer is
//! reported through a short (or zero) transfer count. Everything here is a
//! hard failure the caller has to deal with.

use thiserror::Error;

/// Top-level error type for all operations in the crate.
///
/// Each variant corresponds to a specific failure domain:
/// - Ring: invalid arguments to a ring buffer transfer
/// - Bit I/O: reading bits past the end of an encoded buffer
/// - Huffman: encode overflow, unknown symbols, undecodable input
/// - Framing: malformed or oversized frame headers
#[derive(Debug, Error)]
pub enum Error {
    /// Ring buffer was handed an unusable argument
    #[error("ring buffer error: {0}")]
    Ring(#[from] RingError),

    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Huffman codec error (overflow, unknown symbol, invalid code)
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Frame header error
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Ring buffer argument errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RingError {
    /// The caller's buffer cannot hold the requested byte count
    #[error("invalid argument: requested {requested} bytes from a {available}-byte buffer")]
    InvalidArgument { requested: usize, available: usize },
}

/// Bit-level I/O errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitIoError {
    /// Attempted to read past the end of the buffer
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Invalid bit count (more than 32 bits in one call)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Huffman codec errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HuffmanError {
    /// Encoded output would not fit in the destination buffer
    #[error("encoded output overflows {capacity}-byte buffer")]
    Overflow { capacity: usize },

    /// Input contains a byte the code table has no code for
    #[error("symbol {symbol:#04x} at position {position} is not in the code table")]
    UnknownSymbol { symbol: u8, position: usize },

    /// Accumulated bits matched no code within the table's maximum length
    #[error("invalid huffman code at bit position {position}")]
    InvalidCode { position: usize },

    /// Decode output buffer is shorter than the requested symbol count
    #[error("output buffer too small: need {required} bytes, got {actual}")]
    OutputTooSmall { required: usize, actual: usize },
}

/// Frame header errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// Fewer than the three header bytes were supplied
    #[error("frame header too short: need {required} bytes, got {actual}")]
    HeaderTooShort { required: usize, actual: usize },

    /// Frame ends before the payload the header announces
    #[error("frame payload too short: header says {required} bytes, got {actual}")]
    PayloadTooShort { required: usize, actual: usize },

    /// Header byte count disagrees with its bit count
    #[error("byte count mismatch: {bits} bits need {expected} bytes, header says {actual}")]
    ByteCountMismatch {
        bits: usize,
        expected: usize,
        actual: usize,
    },

    /// Frame can never fit in the outbound buffer
    #[error("frame of {size} bytes exceeds {capacity}-byte outbound buffer")]
    FrameTooLarge { size: usize, capacity: usize },

    /// A header field does not fit in its single byte
    #[error("{field} = {value} exceeds the one-byte header limit of 255")]
    FieldOverflow { field: &'static str, value: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;

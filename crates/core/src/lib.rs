//! serialpipe-core: ring buffers and a static Huffman codec for serial links
//!
//! Two primitives with invariants that matter, plus the glue that makes them
//! a pipeline:
//! - Fixed-capacity circular byte buffers shared between an interrupt
//!   handler and foreground code
//! - A prefix-code compressor/decompressor driven by a precomputed table
//!
//! # Architecture
//!
//! - `ring`: RingBuffer, its critical-section wrapper, outbound/inbound channels
//! - `table`: static symbol → code table
//! - `bitio`: MSB-first bit packing into fixed buffers
//! - `huffman`: encode/decode against a code table
//! - `framing`: 3-byte frame header, message splitting, incremental receiver
//! - `link`: serial port model (interrupt handler, busy-wait transmitter)
//! - `stats`: transfer counters
//!
//! # Design Principles
//!
//! - **No panics**: codec failures are structured errors
//! - **Fixed memory**: ring capacity is a compile-time power of two and
//!   encoders write into caller-owned buffers
//! - **Short counts, not errors**: full and empty buffers clip transfers

pub mod bitio;
pub mod error;
pub mod framing;
pub mod huffman;
pub mod link;
pub mod ring;
pub mod stats;
pub mod table;

// Re-export commonly used types
pub use error::{Error, Result};
pub use huffman::Codec;
pub use link::SerialPort;
pub use ring::{Channel, Channels, RingBuffer, SharedRing};
pub use table::{CodeTable, CodeTableEntry, DEFAULT_TABLE};

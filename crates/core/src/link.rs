//! Serial port glue between the codec, the ring buffers and the wire.
//!
//! A [`SerialPort`] owns the outbound/inbound [`Channels`] pair and models
//! the two execution contexts of a single-core target:
//!
//! - **Interrupt context**: [`SerialPort::service_interrupt`] runs once per
//!   peripheral interrupt. It stores at most one received byte into the
//!   inbound buffer and, when the transmit interrupt is enabled and the
//!   transmitter is idle, moves at most one byte from the outbound buffer to
//!   the wire. It never blocks.
//! - **Foreground**: [`SerialPort::send`] encodes and frames text, waits
//!   until each whole frame fits in the outbound buffer, enqueues it and
//!   enables the transmit interrupt. [`SerialPort::receive`] drains the
//!   inbound buffer through a [`FrameDecoder`].
//!
//! The ring buffers are the only state both contexts mutate. The transmit
//! interrupt flag is only flipped inside the outbound buffer's critical
//! section, so "enqueue then enable" and "found empty then disable" cannot
//! interleave.
//!
//! # Busy-waiting
//!
//! `send` spins without timeout or cancellation while the outbound buffer
//! lacks room, and never enqueues a partial frame. Something must be
//! servicing interrupts concurrently or a frame larger than the free space
//! will spin forever.

use crate::error::{FramingError, Result};
use crate::framing::{encode_frame, split_message, FrameDecoder, HEADER_SIZE};
use crate::huffman::Codec;
use crate::ring::{Channel, Channels, DEFAULT_CAPACITY};
use crate::stats::TransferStats;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, trace, warn};

/// The peripheral side of a serial port (data register and status flags).
pub trait Wire {
    /// Transmitter can accept another byte.
    fn tx_ready(&self) -> bool;

    /// Hand one byte to the transmitter.
    fn write_byte(&mut self, byte: u8);

    /// Take one received byte, if the receiver holds one.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Wire whose transmitter output is fed straight back into its receiver.
///
/// `depth` bytes may be in flight at once; the transmitter reports busy
/// while the line is full.
#[derive(Debug)]
pub struct Loopback {
    line: VecDeque<u8>,
    depth: usize,
}

impl Loopback {
    pub fn new() -> Self {
        Self::with_depth(1)
    }

    pub fn with_depth(depth: usize) -> Self {
        Self {
            line: VecDeque::with_capacity(depth),
            depth: depth.max(1),
        }
    }

    /// Bytes transmitted but not yet received.
    pub fn in_flight(&self) -> usize {
        self.line.len()
    }
}

impl Default for Loopback {
    fn default() -> Self {
        Self::new()
    }
}

impl Wire for Loopback {
    fn tx_ready(&self) -> bool {
        self.line.len() < self.depth
    }

    fn write_byte(&mut self, byte: u8) {
        self.line.push_back(byte);
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.line.pop_front()
    }
}

/// One serial port: two ring buffers, a codec and the transmit interrupt
/// enable flag.
///
/// Share it between the interrupt participant and the foreground with an
/// `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct SerialPort<const C: usize = DEFAULT_CAPACITY> {
    channels: Channels<C>,
    codec: Codec,
    tx_interrupt: AtomicBool,
    dropped: AtomicU64,
    stats: Mutex<TransferStats>,
}

impl<const C: usize> SerialPort<C> {
    pub fn new(codec: Codec) -> Self {
        Self {
            channels: Channels::new(),
            codec,
            tx_interrupt: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
            stats: Mutex::new(TransferStats::new()),
        }
    }

    pub fn channels(&self) -> &Channels<C> {
        &self.channels
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Interrupt handler body.
    ///
    /// Moves at most one byte in each direction. Returns true if any byte
    /// moved.
    pub fn service_interrupt<W: Wire + ?Sized>(&self, wire: &mut W) -> bool {
        let mut moved = false;

        if let Some(byte) = wire.read_byte() {
            moved = true;
            if !self.channels.get(Channel::Inbound).push(byte) {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(byte, dropped, "inbound buffer full, received byte dropped");
            }
        }

        if self.tx_interrupt.load(Ordering::Acquire) && wire.tx_ready() {
            let next = self.channels.get(Channel::Outbound).critical_section(|ring| {
                let mut byte = [0u8; 1];
                match ring.dequeue(&mut byte, 1) {
                    Ok(1) => Some(byte[0]),
                    _ => {
                        self.tx_interrupt.store(false, Ordering::Release);
                        None
                    }
                }
            });

            match next {
                Some(byte) => {
                    wire.write_byte(byte);
                    moved = true;
                }
                None => trace!("outbound drained, transmit interrupt disabled"),
            }
        }

        moved
    }

    /// Compress `message` and queue it for transmission.
    ///
    /// The message is split into as many frames as the one-byte header
    /// fields require. Each frame is enqueued whole, spinning until the
    /// outbound buffer has room. Returns the number of frames sent.
    ///
    /// # Errors
    /// - `HuffmanError::UnknownSymbol` if the message has a byte outside the
    ///   code table (nothing is enqueued)
    /// - `FramingError::FrameTooLarge` if a frame exceeds the buffer capacity
    pub fn send(&self, message: &[u8]) -> Result<usize> {
        let frames = split_message(&self.codec, message)?
            .into_iter()
            .map(|piece| encode_frame(&self.codec, piece).map(|frame| (piece.len(), frame)))
            .collect::<Result<Vec<_>>>()?;

        for (symbols, frame) in &frames {
            self.enqueue_frame(frame)?;
            self.lock_stats()
                .record_frame(*symbols, frame.len() - HEADER_SIZE, frame.len());
            debug!(symbols, frame_len = frame.len(), "frame queued");
        }

        Ok(frames.len())
    }

    fn enqueue_frame(&self, frame: &[u8]) -> Result<()> {
        if frame.len() > C {
            return Err(FramingError::FrameTooLarge {
                size: frame.len(),
                capacity: C,
            }
            .into());
        }

        let outbound = self.channels.get(Channel::Outbound);
        loop {
            let queued = outbound.critical_section(|ring| -> Result<bool> {
                if ring.available() < frame.len() {
                    return Ok(false);
                }
                ring.enqueue(frame, frame.len())?;
                self.tx_interrupt.store(true, Ordering::Release);
                Ok(true)
            })?;

            if queued {
                return Ok(());
            }
            std::hint::spin_loop();
        }
    }

    /// Take one received byte, if any.
    pub fn read_byte(&self) -> Option<u8> {
        self.channels.get(Channel::Inbound).pop()
    }

    /// Feed every byte currently in the inbound buffer to `decoder`,
    /// returning the messages it completed.
    ///
    /// # Errors
    /// Stops at the first malformed frame; bytes after it stay buffered.
    pub fn receive(&self, decoder: &mut FrameDecoder) -> Result<Vec<Vec<u8>>> {
        let mut messages = Vec::new();
        while let Some(byte) = self.read_byte() {
            if let Some(message) = decoder.push(byte)? {
                self.lock_stats().frames_received += 1;
                messages.push(message);
            }
        }
        Ok(messages)
    }

    /// Spin until `decoder` completes a frame, then return its message.
    ///
    /// Like [`SerialPort::send`], there is no timeout.
    pub fn recv_message(&self, decoder: &mut FrameDecoder) -> Result<Vec<u8>> {
        loop {
            match self.read_byte() {
                Some(byte) => {
                    if let Some(message) = decoder.push(byte)? {
                        self.lock_stats().frames_received += 1;
                        return Ok(message);
                    }
                }
                None => std::hint::spin_loop(),
            }
        }
    }

    pub fn tx_interrupt_enabled(&self) -> bool {
        self.tx_interrupt.load(Ordering::Acquire)
    }

    /// Received bytes discarded because the inbound buffer was full.
    pub fn dropped_bytes(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Snapshot of the transfer counters.
    pub fn stats(&self) -> TransferStats {
        self.lock_stats().clone()
    }

    pub fn reset_stats(&self) {
        self.lock_stats().reset();
    }

    fn lock_stats(&self) -> std::sync::MutexGuard<'_, TransferStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<const C: usize> Default for SerialPort<C> {
    fn default() -> Self {
        Self::new(Codec::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, HuffmanError};

    /// Service interrupts until nothing moves.
    fn pump<const C: usize>(port: &SerialPort<C>, wire: &mut Loopback) -> usize {
        let mut calls = 0;
        while port.service_interrupt(wire) {
            calls += 1;
        }
        calls
    }

    #[test]
    fn test_send_enables_transmit_interrupt() {
        let port = SerialPort::<256>::default();
        assert!(!port.tx_interrupt_enabled());

        assert_eq!(port.send(b"hello").unwrap(), 1);
        assert!(port.tx_interrupt_enabled());
        assert!(port.channels().len(Channel::Outbound) > 3);
    }

    #[test]
    fn test_interrupt_moves_one_byte_per_call() {
        let port = SerialPort::<256>::default();
        let mut wire = Loopback::new();
        port.send(b"hi").unwrap();
        let queued = port.channels().len(Channel::Outbound);

        assert!(port.service_interrupt(&mut wire));
        assert_eq!(port.channels().len(Channel::Outbound), queued - 1);
        assert_eq!(wire.in_flight(), 1);
        assert_eq!(port.channels().len(Channel::Inbound), 0);

        // Next call receives the looped-back byte and sends another
        assert!(port.service_interrupt(&mut wire));
        assert_eq!(port.channels().len(Channel::Inbound), 1);
        assert_eq!(port.channels().len(Channel::Outbound), queued - 2);
    }

    #[test]
    fn test_loopback_round_trip() {
        let port = SerialPort::<256>::default();
        let mut wire = Loopback::new();
        let mut decoder = FrameDecoder::default();

        port.send(b"University of Colorado Boulder\n\r").unwrap();
        pump(&port, &mut wire);

        assert!(!port.tx_interrupt_enabled());
        let messages = port.receive(&mut decoder).unwrap();
        assert_eq!(messages, vec![b"University of Colorado Boulder\n\r".to_vec()]);

        let stats = port.stats();
        assert_eq!(stats.original_bytes, 32);
        assert_eq!(stats.frames_sent, 1);
        assert_eq!(stats.frames_received, 1);
        assert!(stats.encoded_bytes < stats.original_bytes);
    }

    #[test]
    fn test_unknown_symbol_enqueues_nothing() {
        let port = SerialPort::<256>::default();

        let result = port.send(b"caf\xc3\xa9");
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::UnknownSymbol { position: 3, .. }))
        ));
        assert_eq!(port.channels().len(Channel::Outbound), 0);
        assert!(!port.tx_interrupt_enabled());
    }

    #[test]
    fn test_frame_too_large_for_buffer() {
        let port = SerialPort::<16>::default();
        let result = port.send(b"this frame will never fit in sixteen bytes");
        assert!(matches!(
            result,
            Err(Error::Framing(FramingError::FrameTooLarge { capacity: 16, .. }))
        ));
    }

    #[test]
    fn test_inbound_overflow_counts_dropped_bytes() {
        let port = SerialPort::<4>::default();
        let mut wire = Loopback::with_depth(8);
        for byte in 0..6u8 {
            wire.write_byte(byte);
        }

        pump(&port, &mut wire);
        assert_eq!(port.channels().len(Channel::Inbound), 4);
        assert_eq!(port.dropped_bytes(), 2);

        let mut first = [0u8; 4];
        port.channels()
            .dequeue(Channel::Inbound, &mut first, 4)
            .unwrap();
        assert_eq!(first, [0, 1, 2, 3]);
    }

    #[test]
    fn test_reset_stats() {
        let port = SerialPort::<256>::default();
        port.send(b"count me").unwrap();
        assert_eq!(port.stats().original_bytes, 8);

        port.reset_stats();
        assert_eq!(port.stats().original_bytes, 0);
    }
}

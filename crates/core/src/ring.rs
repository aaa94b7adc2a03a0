//! Fixed-capacity circular byte buffers shared with interrupt context.
//!
//! A [`RingBuffer`] is a plain FIFO with independent read and write cursors.
//! Because the cursors are equal both when the buffer is empty and when it
//! is full, an explicit [`RingState`] flag disambiguates the two. The flag is
//! updated after every single-byte transfer, which is the only point where
//! `write == read` reliably means "just became full" (enqueue) or "just
//! became empty" (dequeue).
//!
//! [`SharedRing`] wraps a buffer in a critical section so one
//! interrupt-context participant and one foreground participant can use it
//! concurrently. [`Channels`] holds the outbound/inbound pair a serial port
//! needs, addressed by [`Channel`].
//!
//! # Short transfers
//!
//! Asking for more than fits (or more than is stored) is not an error. The
//! transfer is clipped and the clipped count is returned; a full buffer
//! accepts 0 bytes and an empty buffer yields 0 bytes. Callers that need the
//! whole payload retry.
//!
//! # Example
//! ```
//! use serialpipe_core::ring::RingBuffer;
//!
//! let mut ring = RingBuffer::<8>::new();
//! assert_eq!(ring.enqueue(b"0123456789", 10).unwrap(), 8); // clipped
//! assert!(ring.is_full());
//!
//! let mut out = [0u8; 8];
//! assert_eq!(ring.dequeue(&mut out, 8).unwrap(), 8);
//! assert_eq!(&out, b"01234567");
//! ```

use crate::error::{Result, RingError};
use std::sync::{Mutex, PoisonError};

/// Capacity used by the serial port channels.
pub const DEFAULT_CAPACITY: usize = 256;

/// Fullness of a ring buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingState {
    /// No bytes stored (`len == 0`)
    Empty,
    /// Some bytes stored, some space free
    Partial,
    /// Every slot occupied (`len == C`)
    Full,
}

/// Fixed-capacity circular byte FIFO.
///
/// `C` must be a nonzero power of two so cursor wraparound is a mask; any
/// other capacity fails to compile when the buffer is constructed.
///
/// # Invariants
/// - `write < C` and `read < C`
/// - `len == 0` iff `state == Empty`, `len == C` iff `state == Full`
/// - `write == (read + len) & (C - 1)`
#[derive(Debug, Clone)]
pub struct RingBuffer<const C: usize = DEFAULT_CAPACITY> {
    buf: [u8; C],
    write: usize,
    read: usize,
    len: usize,
    state: RingState,
}

impl<const C: usize> RingBuffer<C> {
    const MASK: usize = {
        assert!(
            C > 0 && C.is_power_of_two(),
            "ring buffer capacity must be a nonzero power of two"
        );
        C - 1
    };

    /// Create an empty buffer.
    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            buf: [0; C],
            write: 0,
            read: 0,
            len: 0,
            state: RingState::Empty,
        }
    }

    /// Enqueue up to `nbyte` bytes from the front of `src`.
    ///
    /// The count is capped at `capacity() - len()`. Returns the number of
    /// bytes actually stored, which is 0 when the buffer is full or
    /// `nbyte == 0`.
    ///
    /// # Errors
    /// `RingError::InvalidArgument` if `src` holds fewer than `nbyte` bytes.
    pub fn enqueue(&mut self, src: &[u8], nbyte: usize) -> Result<usize> {
        if nbyte > src.len() {
            return Err(RingError::InvalidArgument {
                requested: nbyte,
                available: src.len(),
            }
            .into());
        }

        if nbyte == 0 || self.state == RingState::Full {
            return Ok(0);
        }

        let nbyte = nbyte.min(C - self.len);
        self.state = RingState::Partial;

        let mut written = 0;
        while written < nbyte {
            self.buf[self.write] = src[written];
            self.write = (self.write + 1) & Self::MASK;
            written += 1;

            if self.write == self.read {
                self.state = RingState::Full;
                break;
            }
        }

        self.len += written;
        Ok(written)
    }

    /// Dequeue up to `nbyte` bytes into the front of `dst`.
    ///
    /// The count is capped at `len()`. Returns the number of bytes actually
    /// copied, which is 0 when the buffer is empty or `nbyte == 0`.
    ///
    /// # Errors
    /// `RingError::InvalidArgument` if `dst` has room for fewer than `nbyte`
    /// bytes.
    pub fn dequeue(&mut self, dst: &mut [u8], nbyte: usize) -> Result<usize> {
        if nbyte > dst.len() {
            return Err(RingError::InvalidArgument {
                requested: nbyte,
                available: dst.len(),
            }
            .into());
        }

        if nbyte == 0 || self.state == RingState::Empty {
            return Ok(0);
        }

        let nbyte = nbyte.min(self.len);
        self.state = RingState::Partial;

        let mut read = 0;
        while read < nbyte {
            dst[read] = self.buf[self.read];
            self.read = (self.read + 1) & Self::MASK;
            read += 1;

            if self.read == self.write {
                self.state = RingState::Empty;
                break;
            }
        }

        self.len -= read;
        Ok(read)
    }

    /// Number of bytes currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Total capacity in bytes (the constant `C`).
    pub const fn capacity(&self) -> usize {
        C
    }

    /// Free space in bytes.
    pub fn available(&self) -> usize {
        C - self.len
    }

    pub fn state(&self) -> RingState {
        self.state
    }

    pub fn is_empty(&self) -> bool {
        self.state == RingState::Empty
    }

    pub fn is_full(&self) -> bool {
        self.state == RingState::Full
    }
}

impl<const C: usize> Default for RingBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`RingBuffer`] behind a critical section.
///
/// Every call holds the lock for its whole duration, so neither participant
/// can observe the other's transfer half-done. Calls are short and bounded
/// (at most `C` byte copies). Intended for exactly one producer and one
/// consumer.
///
/// A poisoned lock is recovered: the buffer never panics mid-transfer, so
/// its state is consistent whenever the lock is released.
#[derive(Debug, Default)]
pub struct SharedRing<const C: usize = DEFAULT_CAPACITY> {
    inner: Mutex<RingBuffer<C>>,
}

impl<const C: usize> SharedRing<C> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RingBuffer::new()),
        }
    }

    /// Run `f` with exclusive access to the buffer.
    pub fn critical_section<R>(&self, f: impl FnOnce(&mut RingBuffer<C>) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// See [`RingBuffer::enqueue`].
    pub fn enqueue(&self, src: &[u8], nbyte: usize) -> Result<usize> {
        self.critical_section(|ring| ring.enqueue(src, nbyte))
    }

    /// See [`RingBuffer::dequeue`].
    pub fn dequeue(&self, dst: &mut [u8], nbyte: usize) -> Result<usize> {
        self.critical_section(|ring| ring.dequeue(dst, nbyte))
    }

    /// Store a single byte. Returns false if the buffer was full.
    pub fn push(&self, byte: u8) -> bool {
        self.critical_section(|ring| matches!(ring.enqueue(&[byte], 1), Ok(1)))
    }

    /// Take a single byte, if any.
    pub fn pop(&self) -> Option<u8> {
        let mut byte = [0u8; 1];
        self.critical_section(|ring| match ring.dequeue(&mut byte, 1) {
            Ok(1) => Some(byte[0]),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.critical_section(|ring| ring.len())
    }

    pub const fn capacity(&self) -> usize {
        C
    }

    pub fn available(&self) -> usize {
        self.critical_section(|ring| ring.available())
    }

    pub fn is_empty(&self) -> bool {
        self.critical_section(|ring| ring.is_empty())
    }
}

/// Logical serial channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Foreground → wire
    Outbound,
    /// Wire → foreground
    Inbound,
}

/// The outbound/inbound buffer pair of one serial port.
#[derive(Debug, Default)]
pub struct Channels<const C: usize = DEFAULT_CAPACITY> {
    outbound: SharedRing<C>,
    inbound: SharedRing<C>,
}

impl<const C: usize> Channels<C> {
    pub const fn new() -> Self {
        Self {
            outbound: SharedRing::new(),
            inbound: SharedRing::new(),
        }
    }

    /// Buffer backing `channel`.
    pub fn get(&self, channel: Channel) -> &SharedRing<C> {
        match channel {
            Channel::Outbound => &self.outbound,
            Channel::Inbound => &self.inbound,
        }
    }

    pub fn enqueue(&self, channel: Channel, src: &[u8], nbyte: usize) -> Result<usize> {
        self.get(channel).enqueue(src, nbyte)
    }

    pub fn dequeue(&self, channel: Channel, dst: &mut [u8], nbyte: usize) -> Result<usize> {
        self.get(channel).dequeue(dst, nbyte)
    }

    pub fn len(&self, channel: Channel) -> usize {
        self.get(channel).len()
    }

    pub const fn capacity(&self) -> usize {
        C
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// 512 bytes of distinct-ish text, enough to overfill a 256-byte ring twice.
    fn sample_text() -> Vec<u8> {
        b"To be, or not to be: that is the question: Whether 'tis nobler in the mind to suffer "
            .iter()
            .cycle()
            .take(512)
            .copied()
            .collect()
    }

    #[test]
    fn test_empty_on_creation() {
        let mut ring = RingBuffer::<256>::new();
        let mut out = [0u8; 256];

        assert_eq!(ring.len(), 0);
        assert_eq!(ring.capacity(), 256);
        assert_eq!(ring.state(), RingState::Empty);
        assert_eq!(ring.dequeue(&mut out, 256).unwrap(), 0);
        assert_eq!(ring.dequeue(&mut out, 1).unwrap(), 0);
    }

    #[test]
    fn test_enqueue_dequeue_preserves_order() {
        let text = sample_text();
        let mut ring = RingBuffer::<256>::new();
        let mut out = [0u8; 256];

        assert_eq!(ring.enqueue(&text, 20).unwrap(), 20);
        assert_eq!(ring.len(), 20);
        assert_eq!(ring.dequeue(&mut out, 5).unwrap(), 5);
        assert_eq!(ring.len(), 15);
        assert_eq!(ring.dequeue(&mut out[5..], 20).unwrap(), 15);
        assert_eq!(ring.len(), 0);
        assert_eq!(&out[..20], &text[..20]);
    }

    #[test]
    fn test_enqueue_clips_at_capacity() {
        let text = sample_text();
        let mut ring = RingBuffer::<256>::new();

        assert_eq!(ring.enqueue(&text, 260).unwrap(), 256);
        assert_eq!(ring.len(), 256);
        assert!(ring.is_full());

        let mut out = [0u8; 256];
        assert_eq!(ring.dequeue(&mut out, 256).unwrap(), 256);
        assert_eq!(&out[..], &text[..256]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_enqueue_into_full_returns_zero() {
        let text = sample_text();
        let mut ring = RingBuffer::<16>::new();
        ring.enqueue(&text, 16).unwrap();

        assert_eq!(ring.enqueue(b"x", 1).unwrap(), 0);
        assert_eq!(ring.len(), 16);

        let mut out = [0u8; 16];
        ring.dequeue(&mut out, 16).unwrap();
        assert_eq!(&out[..], &text[..16]);
    }

    #[test]
    fn test_zero_length_is_noop() {
        let mut ring = RingBuffer::<16>::new();
        ring.enqueue(b"abc", 3).unwrap();

        assert_eq!(ring.enqueue(b"", 0).unwrap(), 0);
        let mut out = [0u8; 4];
        assert_eq!(ring.dequeue(&mut out, 0).unwrap(), 0);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.state(), RingState::Partial);
    }

    #[test]
    fn test_invalid_argument() {
        let mut ring = RingBuffer::<16>::new();

        let result = ring.enqueue(b"ab", 3);
        assert!(matches!(
            result,
            Err(Error::Ring(RingError::InvalidArgument {
                requested: 3,
                available: 2
            }))
        ));

        // Checked before the zero-length and empty shortcuts
        let mut out: [u8; 0] = [];
        assert!(ring.dequeue(&mut out, 1).is_err());
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn test_wraparound_sequence() {
        let text = sample_text();
        let cap = 256;
        let mut ring = RingBuffer::<256>::new();
        let mut out = [0u8; 256];

        // Move both cursors off zero
        assert_eq!(ring.enqueue(&text, 20).unwrap(), 20);
        assert_eq!(ring.dequeue(&mut out, 18).unwrap(), 18);
        assert_eq!(ring.len(), 2);

        // Fill across the boundary in chunks
        let chunk = (cap - 2) / 4;
        for i in 0..4 {
            let start = i * chunk;
            assert_eq!(ring.enqueue(&text[start..], chunk).unwrap(), chunk);
            assert_eq!(ring.len(), (i + 1) * chunk + 2);
        }

        assert_eq!(ring.dequeue(&mut out, 2).unwrap(), 2);
        assert_eq!(&out[..2], &text[18..20]);

        for i in 0..chunk * 4 {
            assert_eq!(ring.dequeue(&mut out[i..], 1).unwrap(), 1);
            assert_eq!(ring.len(), chunk * 4 - i - 1);
        }
        assert_eq!(&out[..chunk * 4], &text[..chunk * 4]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_full_and_empty_with_equal_cursors() {
        let mut ring = RingBuffer::<4>::new();

        ring.enqueue(b"abcd", 4).unwrap();
        assert_eq!(ring.write, ring.read);
        assert!(ring.is_full());

        let mut out = [0u8; 4];
        ring.dequeue(&mut out, 4).unwrap();
        assert_eq!(ring.write, ring.read);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_channels_are_independent() {
        let channels = Channels::<32>::new();

        channels.enqueue(Channel::Outbound, b"hello", 5).unwrap();
        assert_eq!(channels.len(Channel::Outbound), 5);
        assert_eq!(channels.len(Channel::Inbound), 0);

        let mut out = [0u8; 5];
        assert_eq!(channels.dequeue(Channel::Inbound, &mut out, 5).unwrap(), 0);
        assert_eq!(channels.dequeue(Channel::Outbound, &mut out, 5).unwrap(), 5);
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn test_shared_push_pop() {
        let ring = SharedRing::<2>::new();

        assert!(ring.push(1));
        assert!(ring.push(2));
        assert!(!ring.push(3));
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), None);
    }
}

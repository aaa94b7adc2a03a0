//! Transfer statistics for a serial port.
//!
//! Tracks how many message bytes the foreground handed to the port, how
//! many bytes they compressed to, and how long the port has been running
//! since the last reset. The headline number is the percent reduction:
//! `(original - encoded) / original`.
//!
//! # Thread Safety
//!
//! `TransferStats` is a plain value. The serial port keeps it behind a
//! mutex and hands out snapshots.

use std::time::{Duration, Instant};

/// Counters for one serial port.
#[derive(Debug, Clone)]
pub struct TransferStats {
    /// When counting started (creation or last reset)
    pub start_time: Instant,

    /// Message bytes submitted for transmission
    pub original_bytes: u64,

    /// Encoded payload bytes, excluding frame headers
    pub encoded_bytes: u64,

    /// Bytes enqueued for the wire, headers included
    pub wire_bytes: u64,

    /// Frames enqueued
    pub frames_sent: u64,

    /// Frames decoded on the receive side
    pub frames_received: u64,
}

impl TransferStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            original_bytes: 0,
            encoded_bytes: 0,
            wire_bytes: 0,
            frames_sent: 0,
            frames_received: 0,
        }
    }

    /// Zero every counter and restart the clock.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Account for one outgoing frame.
    pub fn record_frame(&mut self, symbols: usize, payload_len: usize, frame_len: usize) {
        self.original_bytes += symbols as u64;
        self.encoded_bytes += payload_len as u64;
        self.wire_bytes += frame_len as u64;
        self.frames_sent += 1;
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Encoded size as a fraction of the original (0.0 if nothing was sent).
    pub fn compression_ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            0.0
        } else {
            self.encoded_bytes as f64 / self.original_bytes as f64
        }
    }

    /// Bytes saved by encoding, as a percentage of the original.
    pub fn percent_reduction(&self) -> f64 {
        if self.original_bytes == 0 {
            0.0
        } else {
            (1.0 - self.compression_ratio()) * 100.0
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Transfer Summary ===");
        println!("Original bytes: {}", self.original_bytes);
        println!("Reduced bytes: {}", self.encoded_bytes);
        println!("Wire bytes (with headers): {}", self.wire_bytes);
        println!("Percent reduction: {:.1}%", self.percent_reduction());
        println!("Frames sent: {}", self.frames_sent);
        println!("Frames received: {}", self.frames_received);
        println!("Time: {} ms", self.elapsed().as_millis());
        println!();
    }

    /// Export counters as `key=value` lines.
    pub fn export_text(&self) -> String {
        format!(
            "elapsed_ms={}\n\
             original_bytes={}\n\
             encoded_bytes={}\n\
             wire_bytes={}\n\
             percent_reduction={:.2}\n\
             frames_sent={}\n\
             frames_received={}\n",
            self.elapsed().as_millis(),
            self.original_bytes,
            self.encoded_bytes,
            self.wire_bytes,
            self.percent_reduction(),
            self.frames_sent,
            self.frames_received,
        )
    }
}

impl Default for TransferStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_reduction() {
        let mut stats = TransferStats::new();
        stats.record_frame(100, 60, 63);

        assert_eq!(stats.compression_ratio(), 0.6);
        assert!((stats.percent_reduction() - 40.0).abs() < 1e-9);
        assert_eq!(stats.frames_sent, 1);
        assert_eq!(stats.wire_bytes, 63);
    }

    #[test]
    fn test_empty_stats() {
        let stats = TransferStats::new();
        assert_eq!(stats.compression_ratio(), 0.0);
        assert_eq!(stats.percent_reduction(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut stats = TransferStats::new();
        stats.record_frame(10, 5, 8);
        stats.frames_received = 1;

        stats.reset();
        assert_eq!(stats.original_bytes, 0);
        assert_eq!(stats.frames_received, 0);
    }

    #[test]
    fn test_export_text() {
        let mut stats = TransferStats::new();
        stats.record_frame(32, 20, 23);

        let text = stats.export_text();
        assert!(text.contains("original_bytes=32"));
        assert!(text.contains("encoded_bytes=20"));
        assert!(text.contains("percent_reduction=37.50"));
    }
}

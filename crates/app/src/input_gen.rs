//! Message generation for the demo.
//!
//! When no text is given, we generate messages with interesting
//! compression characteristics over the code table's alphabet.
//!
//! # Design
//!
//! Generated messages mix:
//! - English-like sentences (short codes dominate, large reduction)
//! - Upper-case runs and digits (long codes, small or negative reduction)
//! - Uniformly random symbols from the table
//!
//! This makes the compression behavior visible in the summary.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serialpipe_core::table::CodeTable;

const WORDS: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "serial", "port",
    "interrupt", "buffer", "embedded", "software", "course", "testing", "message",
    "is", "a", "of", "and", "to", "in", "data", "ring", "frame", "byte",
];

/// Generate `count` messages with lengths in `min_len..=max_len`.
///
/// Every byte of every message is a symbol of `table`.
pub fn generate_messages(
    table: &CodeTable,
    seed: u64,
    count: usize,
    min_len: usize,
    max_len: usize,
) -> Vec<Vec<u8>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let alphabet: Vec<u8> = table.entries().iter().map(|e| e.symbol).collect();

    (0..count)
        .map(|_| {
            let len = rng.gen_range(min_len..=max_len.max(min_len));
            let kind: u8 = rng.gen_range(0..10);

            let mut message = match kind {
                // 60% sentences
                0..=5 => sentence(&mut rng, len),
                // 20% shouting with numbers
                6..=7 => sentence(&mut rng, len)
                    .into_iter()
                    .map(|b| if rng.gen_bool(0.2) { b'0' + (b % 10) } else { b.to_ascii_uppercase() })
                    .collect(),
                // 20% random symbols
                _ => (0..len)
                    .filter_map(|_| alphabet.choose(&mut rng).copied())
                    .collect(),
            };

            message.retain(|&b| table.contains(b));
            message.truncate(len);
            message
        })
        .collect()
}

/// Words separated by spaces, ending in a line break, cut to `len` bytes.
fn sentence(rng: &mut ChaCha8Rng, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + 8);
    while out.len() < len {
        if let Some(word) = WORDS.choose(rng) {
            out.extend_from_slice(word.as_bytes());
        }
        out.push(if rng.gen_bool(0.1) { b'\n' } else { b' ' });
    }
    out.truncate(len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialpipe_core::DEFAULT_TABLE;

    #[test]
    fn test_generate_messages() {
        let messages = generate_messages(&DEFAULT_TABLE, 42, 20, 1, 100);
        assert_eq!(messages.len(), 20);
        for message in &messages {
            assert!(message.len() <= 100);
        }
    }

    #[test]
    fn test_symbols_in_table() {
        let messages = generate_messages(&DEFAULT_TABLE, 7, 50, 10, 300);
        assert!(messages.iter().flatten().all(|&b| DEFAULT_TABLE.contains(b)));
    }

    #[test]
    fn test_determinism() {
        let a = generate_messages(&DEFAULT_TABLE, 12345, 10, 1, 200);
        let b = generate_messages(&DEFAULT_TABLE, 12345, 10, 1, 200);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds() {
        let a = generate_messages(&DEFAULT_TABLE, 1, 10, 50, 200);
        let b = generate_messages(&DEFAULT_TABLE, 2, 10, 50, 200);
        assert_ne!(a, b);
    }

    #[test]
    fn test_exact_length() {
        let messages = generate_messages(&DEFAULT_TABLE, 3, 30, 64, 64);
        assert!(messages.iter().all(|m| m.len() == 64));
    }

    #[test]
    fn test_zero_count() {
        assert!(generate_messages(&DEFAULT_TABLE, 0, 0, 1, 10).is_empty());
    }
}

//! Static prefix-code table.
//!
//! The table maps each symbol of a small fixed alphabet to a right-aligned
//! bit pattern and its length. It is produced offline (canonical Huffman
//! code over a training corpus) and compiled in as a constant; nothing here
//! builds or adapts codes at runtime.
//!
//! [`CodeTable::new`] is a `const fn`, so a malformed entry list (duplicate
//! or out-of-range symbol, bad length, code wider than its length) is a
//! compile error for `static` tables. Prefix-freedom is a property of the
//! offline generator and is only checked by [`CodeTable::is_prefix_free`].

/// Symbols are 7-bit; the lookup index has one slot per value.
pub const ALPHABET_SIZE: usize = 128;

/// Longest code the bit packer accepts.
pub const MAX_CODE_LEN: u8 = 32;

/// One symbol's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeTableEntry {
    /// Symbol byte (< 128)
    pub symbol: u8,
    /// Bit pattern, right-aligned (lowest `len` bits are the code)
    pub code: u32,
    /// Number of bits in the code (1..=32)
    pub len: u8,
}

impl CodeTableEntry {
    pub const fn new(symbol: u8, code: u32, len: u8) -> Self {
        Self { symbol, code, len }
    }
}

/// Read-only symbol → code mapping with O(1) lookup by symbol value.
#[derive(Debug, Clone)]
pub struct CodeTable {
    entries: &'static [CodeTableEntry],
    /// `index[symbol]` is the position of the symbol's entry in `entries`
    index: [Option<u8>; ALPHABET_SIZE],
    max_len: u8,
}

impl CodeTable {
    /// Build a table from a static entry list.
    ///
    /// # Panics
    /// Panics (at compile time when used in a `static`) if a symbol is
    /// repeated or >= 128, a length is 0 or > 32, a code has bits set above
    /// its length, or there are more than 128 entries.
    pub const fn new(entries: &'static [CodeTableEntry]) -> Self {
        assert!(entries.len() <= ALPHABET_SIZE, "too many code table entries");

        let mut index = [None; ALPHABET_SIZE];
        let mut max_len = 0;
        let mut i = 0;
        while i < entries.len() {
            let entry = entries[i];
            assert!((entry.symbol as usize) < ALPHABET_SIZE, "symbol outside alphabet");
            assert!(entry.len > 0 && entry.len <= MAX_CODE_LEN, "invalid code length");
            assert!(
                entry.len == 32 || entry.code >> entry.len == 0,
                "code wider than its length"
            );
            assert!(index[entry.symbol as usize].is_none(), "duplicate symbol");

            index[entry.symbol as usize] = Some(i as u8);
            if entry.len > max_len {
                max_len = entry.len;
            }
            i += 1;
        }

        Self {
            entries,
            index,
            max_len,
        }
    }

    /// Code for `symbol`, if the symbol is in the alphabet.
    #[inline]
    pub fn lookup(&self, symbol: u8) -> Option<&CodeTableEntry> {
        let slot = *self.index.get(symbol as usize)?;
        slot.map(|i| &self.entries[i as usize])
    }

    /// Symbol whose code is exactly `len` bits equal to `code`.
    ///
    /// In a prefix-free table at most one entry can match, and the first
    /// length at which a match appears is the right one.
    pub fn match_code(&self, len: u8, code: u32) -> Option<u8> {
        self.entries
            .iter()
            .find(|entry| entry.len == len && entry.code == code)
            .map(|entry| entry.symbol)
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.lookup(symbol).is_some()
    }

    pub fn entries(&self) -> &'static [CodeTableEntry] {
        self.entries
    }

    /// Length of the longest code, which bounds how many bits a decoder may
    /// accumulate before giving up.
    pub fn max_len(&self) -> u8 {
        self.max_len
    }

    /// Check that no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        self.entries.iter().enumerate().all(|(i, a)| {
            self.entries.iter().enumerate().all(|(j, b)| {
                i == j || a.len > b.len || (b.code >> (b.len - a.len)) != a.code
            })
        })
    }
}

/// Canonical Huffman code over printable ASCII plus tab, LF and CR,
/// trained on English prose.
pub static DEFAULT_TABLE: CodeTable = CodeTable::new(&DEFAULT_ENTRIES);

const DEFAULT_ENTRIES: [CodeTableEntry; 98] = [
    CodeTableEntry::new(b'\t', 0b1111111110000, 13),
    CodeTableEntry::new(b'\n', 0b11101000, 8),
    CodeTableEntry::new(b'\r', 0b11101001, 8),
    CodeTableEntry::new(b' ', 0b000, 3),
    CodeTableEntry::new(b'!', 0b11111110100, 11),
    CodeTableEntry::new(b'"', 0b1111101110, 10),
    CodeTableEntry::new(b'#', 0b11111111101110, 14),
    CodeTableEntry::new(b'$', 0b11111111101111, 14),
    CodeTableEntry::new(b'%', 0b1111111110001, 13),
    CodeTableEntry::new(b'&', 0b11111111110000, 14),
    CodeTableEntry::new(b'\'', 0b1111101111, 10),
    CodeTableEntry::new(b'(', 0b111111110100, 12),
    CodeTableEntry::new(b')', 0b111111110101, 12),
    CodeTableEntry::new(b'*', 0b11111111110001, 14),
    CodeTableEntry::new(b'+', 0b1111111110010, 13),
    CodeTableEntry::new(b',', 0b11101010, 8),
    CodeTableEntry::new(b'-', 0b1111110000, 10),
    CodeTableEntry::new(b'.', 0b11101011, 8),
    CodeTableEntry::new(b'/', 0b111111110110, 12),
    CodeTableEntry::new(b'0', 0b111101000, 9),
    CodeTableEntry::new(b'1', 0b111101001, 9),
    CodeTableEntry::new(b'2', 0b111101010, 9),
    CodeTableEntry::new(b'3', 0b111101011, 9),
    CodeTableEntry::new(b'4', 0b111101100, 9),
    CodeTableEntry::new(b'5', 0b111101101, 9),
    CodeTableEntry::new(b'6', 0b111101110, 9),
    CodeTableEntry::new(b'7', 0b111101111, 9),
    CodeTableEntry::new(b'8', 0b111110000, 9),
    CodeTableEntry::new(b'9', 0b111110001, 9),
    CodeTableEntry::new(b':', 0b11111110101, 11),
    CodeTableEntry::new(b';', 0b111111110111, 12),
    CodeTableEntry::new(b'<', 0b11111111110010, 14),
    CodeTableEntry::new(b'=', 0b1111111110011, 13),
    CodeTableEntry::new(b'>', 0b11111111110011, 14),
    CodeTableEntry::new(b'?', 0b11111110110, 11),
    CodeTableEntry::new(b'@', 0b11111111110100, 14),
    CodeTableEntry::new(b'A', 0b11101100, 8),
    CodeTableEntry::new(b'B', 0b1111110001, 10),
    CodeTableEntry::new(b'C', 0b111110010, 9),
    CodeTableEntry::new(b'D', 0b111110011, 9),
    CodeTableEntry::new(b'E', 0b1110000, 7),
    CodeTableEntry::new(b'F', 0b1111110010, 10),
    CodeTableEntry::new(b'G', 0b1111110011, 10),
    CodeTableEntry::new(b'H', 0b11101101, 8),
    CodeTableEntry::new(b'I', 0b11101110, 8),
    CodeTableEntry::new(b'J', 0b11111111110101, 14),
    CodeTableEntry::new(b'K', 0b11111110111, 11),
    CodeTableEntry::new(b'L', 0b111110100, 9),
    CodeTableEntry::new(b'M', 0b111110101, 9),
    CodeTableEntry::new(b'N', 0b11101111, 8),
    CodeTableEntry::new(b'O', 0b11110000, 8),
    CodeTableEntry::new(b'P', 0b1111110100, 10),
    CodeTableEntry::new(b'Q', 0b11111111110110, 14),
    CodeTableEntry::new(b'R', 0b11110001, 8),
    CodeTableEntry::new(b'S', 0b11110010, 8),
    CodeTableEntry::new(b'T', 0b11110011, 8),
    CodeTableEntry::new(b'U', 0b111110110, 9),
    CodeTableEntry::new(b'V', 0b11111111000, 11),
    CodeTableEntry::new(b'W', 0b1111110101, 10),
    CodeTableEntry::new(b'X', 0b11111111110111, 14),
    CodeTableEntry::new(b'Y', 0b1111110110, 10),
    CodeTableEntry::new(b'Z', 0b11111111111000, 14),
    CodeTableEntry::new(b'[', 0b1111111110100, 13),
    CodeTableEntry::new(b'\\', 0b11111111111001, 14),
    CodeTableEntry::new(b']', 0b1111111110101, 13),
    CodeTableEntry::new(b'^', 0b11111111111010, 14),
    CodeTableEntry::new(b'_', 0b1111111110110, 13),
    CodeTableEntry::new(b'`', 0b11111111111011, 14),
    CodeTableEntry::new(b'a', 0b0100, 4),
    CodeTableEntry::new(b'b', 0b1110001, 7),
    CodeTableEntry::new(b'c', 0b110000, 6),
    CodeTableEntry::new(b'd', 0b10100, 5),
    CodeTableEntry::new(b'e', 0b001, 3),
    CodeTableEntry::new(b'f', 0b110001, 6),
    CodeTableEntry::new(b'g', 0b110010, 6),
    CodeTableEntry::new(b'h', 0b10101, 5),
    CodeTableEntry::new(b'i', 0b0101, 4),
    CodeTableEntry::new(b'j', 0b1111110111, 10),
    CodeTableEntry::new(b'k', 0b1110010, 7),
    CodeTableEntry::new(b'l', 0b10110, 5),
    CodeTableEntry::new(b'm', 0b110011, 6),
    CodeTableEntry::new(b'n', 0b0110, 4),
    CodeTableEntry::new(b'o', 0b0111, 4),
    CodeTableEntry::new(b'p', 0b110100, 6),
    CodeTableEntry::new(b'q', 0b1111111000, 10),
    CodeTableEntry::new(b'r', 0b10111, 5),
    CodeTableEntry::new(b's', 0b1000, 4),
    CodeTableEntry::new(b't', 0b1001, 4),
    CodeTableEntry::new(b'u', 0b110101, 6),
    CodeTableEntry::new(b'v', 0b1110011, 7),
    CodeTableEntry::new(b'w', 0b110110, 6),
    CodeTableEntry::new(b'x', 0b1111111001, 10),
    CodeTableEntry::new(b'y', 0b110111, 6),
    CodeTableEntry::new(b'z', 0b11111111001, 11),
    CodeTableEntry::new(b'{', 0b11111111111100, 14),
    CodeTableEntry::new(b'|', 0b11111111111101, 14),
    CodeTableEntry::new(b'}', 0b11111111111110, 14),
    CodeTableEntry::new(b'~', 0b11111111111111, 14),
];

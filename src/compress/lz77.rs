//! LZ77 match finding over a 32 KiB sliding window.
//!
//! The dictionary is a hash-chained table of window-relative positions.
//! Positions are kept in `i16` and measured from a moving `base`; when the
//! relative position reaches [`REBASE_THRESHOLD`] the base advances and
//! both tables are re-indexed so every live entry stays representable.

use crate::bits::BitWriter;
use crate::decode::bit_reader::BitReader;
use crate::error::Result;

/// Sliding window size (32 KiB), the maximum back-reference distance.
pub const WINDOW_SIZE: usize = 1 << 15;

/// Minimum match length worth encoding.
pub const MIN_MATCH_LENGTH: usize = 3;

/// Maximum match length (as per DEFLATE).
pub const MAX_MATCH_LENGTH: usize = 258;

/// Hash table size; one slot per window position.
const HASH_SIZE: usize = WINDOW_SIZE;
const HASH_MASK: usize = HASH_SIZE - 1;

/// Window-relative positions live in `[0, REBASE_THRESHOLD)` so that every
/// entry of `head`/`prev` fits a signed 16-bit index.
const REBASE_THRESHOLD: usize = WINDOW_SIZE - 1;

/// Sentinel for an empty hash bucket or chain end.
const EMPTY: i16 = i16::MIN;

/// LZ77 token: either a literal byte or a back-reference into the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Uncompressed byte.
    Literal(u8),
    /// Back-reference to `length` bytes starting `distance` bytes behind
    /// the current position.
    Backref {
        /// Backward distance (1-32768).
        distance: u16,
        /// Match length (3-258).
        length: u16,
    },
}

/// Hash the 3 bytes at `pos` into a table slot.
#[inline]
fn hash3(data: &[u8], pos: usize) -> usize {
    let h = 3483u32
        .wrapping_mul(data[pos] as u32)
        .wrapping_add(23081u32.wrapping_mul(data[pos + 1] as u32))
        .wrapping_add(6954u32.wrapping_mul(data[pos + 2] as u32));
    h as usize & HASH_MASK
}

/// Sliding-window match finder with a hash-chained dictionary.
pub struct MatchFinder {
    head: Vec<i16>,
    prev: Vec<i16>,
    max_chain_depth: usize,
}

impl MatchFinder {
    /// Create a match finder for a compression level (1-9). The level maps
    /// to how far the hash chains are walked per position.
    pub fn new(level: u8) -> Self {
        let level = level.clamp(1, 9);

        let max_chain_depth = match level {
            1 => 4,
            2 => 6,
            3 => 10,
            4 => 24,
            5 => 48,
            6 => 64,
            7 => 256,
            8 => 512,
            _ => 1024,
        };

        Self {
            head: vec![EMPTY; HASH_SIZE],
            prev: vec![EMPTY; WINDOW_SIZE],
            max_chain_depth,
        }
    }

    /// Tokenize `data` and return the token stream.
    pub fn compress(&mut self, data: &[u8]) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(data.len() / 2);
        self.compress_into(data, &mut tokens);
        tokens
    }

    /// Tokenize `data` into a provided token buffer, reusing allocations.
    ///
    /// Expanding the tokens reproduces `data` exactly; one literal or one
    /// back-reference is emitted per loop step (greedy parsing).
    pub fn compress_into(&mut self, data: &[u8], tokens: &mut Vec<Token>) {
        tokens.clear();
        if data.is_empty() {
            return;
        }

        self.head.fill(EMPTY);
        self.prev.fill(EMPTY);

        // `base + pos` is the absolute lookahead index; `pos` is the
        // window-relative position all dictionary entries are measured in.
        let mut base = 0usize;
        let mut pos = 0usize;

        while base + pos < data.len() {
            let (length, distance) = self.find_longest_match(data, base, pos);

            let advance = if length < MIN_MATCH_LENGTH {
                tokens.push(Token::Literal(data[base + pos]));
                1
            } else {
                tokens.push(Token::Backref {
                    distance: distance as u16,
                    length: length as u16,
                });
                length
            };

            (base, pos) = self.record_bytes(data, base, pos, advance);
        }
    }

    /// Find the longest match for the lookahead at window position `pos`.
    ///
    /// Returns `(length, distance)`; a length below [`MIN_MATCH_LENGTH`]
    /// means no usable match. Ties go to the closest candidate since the
    /// chain is walked most-recent first and only strict improvements are
    /// kept.
    fn find_longest_match(&self, data: &[u8], base: usize, pos: usize) -> (usize, usize) {
        let lookahead = base + pos;
        let max_len = MAX_MATCH_LENGTH.min(data.len() - lookahead);

        // Too close to the end to hash; the caller emits literals from here.
        if max_len < MIN_MATCH_LENGTH {
            return (0, 0);
        }

        // Candidates at or below this position fell out of the window.
        let limit = pos as i32 - WINDOW_SIZE as i32;

        let slot = hash3(data, lookahead);
        let mut match_pos = self.head[slot] as i32;
        let mut best_length = 0usize;
        let mut best_distance = 0usize;
        let mut depth = self.max_chain_depth;

        while match_pos > limit && depth > 0 {
            let candidate = base + match_pos as usize;
            let length = match_length(data, candidate, lookahead, max_len);

            if length > best_length {
                best_length = length;
                best_distance = pos - match_pos as usize;

                if length >= max_len {
                    break;
                }
            }

            match_pos = self.prev[match_pos as usize] as i32;
            depth -= 1;
        }

        (best_length, best_distance)
    }

    /// Record `count` consumed bytes into the dictionary, advancing the
    /// lookahead. Returns the updated `(base, pos)`.
    fn record_bytes(
        &mut self,
        data: &[u8],
        mut base: usize,
        mut pos: usize,
        count: usize,
    ) -> (usize, usize) {
        for _ in 0..count {
            let absolute = base + pos;

            // Positions whose 3-byte hash probe would read past the input
            // end are skipped; they can only be covered by literals or an
            // already-emitted back-reference.
            if absolute + MIN_MATCH_LENGTH <= data.len() {
                let slot = hash3(data, absolute);
                self.prev[pos] = self.head[slot];
                self.head[slot] = pos as i16;
            }

            pos += 1;

            if pos == REBASE_THRESHOLD {
                self.rebase(pos as i32);
                base += pos;
                pos = 0;
            }
        }

        (base, pos)
    }

    /// Advance the window base by `amount`, re-indexing every dictionary
    /// entry. Entries whose adjusted position would be negative fell out of
    /// the window and become empty.
    fn rebase(&mut self, amount: i32) {
        for slot in self.head.iter_mut().chain(self.prev.iter_mut()) {
            let adjusted = *slot as i32 - amount;
            *slot = if *slot == EMPTY || adjusted < 0 {
                EMPTY
            } else {
                adjusted as i16
            };
        }
    }
}

impl Default for MatchFinder {
    fn default() -> Self {
        Self::new(6)
    }
}

/// Length of the common prefix of `data[pos1..]` and `data[pos2..]`,
/// capped at `max_len`. Compares 8 bytes at a time.
#[inline]
fn match_length(data: &[u8], pos1: usize, pos2: usize, max_len: usize) -> usize {
    let mut length = 0;

    while length + 8 <= max_len {
        let a = u64::from_ne_bytes(data[pos1 + length..pos1 + length + 8].try_into().unwrap());
        let b = u64::from_ne_bytes(data[pos2 + length..pos2 + length + 8].try_into().unwrap());
        if a != b {
            // Find the first differing byte using trailing zeros
            let xor = a ^ b;
            #[cfg(target_endian = "little")]
            {
                length += (xor.trailing_zeros() / 8) as usize;
            }
            #[cfg(target_endian = "big")]
            {
                length += (xor.leading_zeros() / 8) as usize;
            }
            return length;
        }
        length += 8;
    }

    while length < max_len && data[pos1 + length] == data[pos2 + length] {
        length += 1;
    }

    length
}

/// Expand a token stream back into the bytes it was produced from.
pub fn expand_tokens(tokens: &[Token]) -> Vec<u8> {
    let mut output = Vec::new();
    for token in tokens {
        match *token {
            Token::Literal(byte) => output.push(byte),
            Token::Backref { distance, length } => {
                debug_assert!(distance as usize <= output.len());
                let start = output.len() - distance as usize;
                // May overlap the bytes being appended.
                for i in 0..length as usize {
                    let byte = output[start + i];
                    output.push(byte);
                }
            }
        }
    }
    output
}

/// Serialize tokens into the packed interchange bit stream: a literal is a
/// 0 flag bit plus 8 data bits, a back-reference is a 1 flag bit plus a
/// 15-bit distance and a 9-bit biased length, all fields LSB first.
pub fn encode_tokens(tokens: &[Token]) -> Vec<u8> {
    let mut writer = BitWriter::with_capacity(tokens.len());
    for token in tokens {
        match *token {
            Token::Literal(byte) => {
                writer.write_bit(false);
                writer.write_bits(byte as u32, 8);
            }
            Token::Backref { distance, length } => {
                debug_assert!((1..=WINDOW_SIZE as u16).contains(&distance));
                writer.write_bit(true);
                writer.write_bits((distance - 1) as u32, 15);
                writer.write_bits((length as usize - MIN_MATCH_LENGTH) as u32, 9);
            }
        }
    }
    writer.finish()
}

/// Deserialize `count` tokens from the packed interchange bit stream.
pub fn decode_tokens(data: &[u8], count: usize) -> Result<Vec<Token>> {
    let mut reader = BitReader::new(data);
    let mut tokens = Vec::with_capacity(count);
    for _ in 0..count {
        if reader.read_bits(1)? == 0 {
            tokens.push(Token::Literal(reader.read_bits(8)? as u8));
        } else {
            let distance = reader.read_bits(15)? as u16 + 1;
            let length = reader.read_bits(9)? as usize + MIN_MATCH_LENGTH;
            tokens.push(Token::Backref {
                distance,
                length: length as u16,
            });
        }
    }
    Ok(tokens)
}

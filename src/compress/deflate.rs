//! DEFLATE block writing (RFC 1951).
//!
//! Tokenized data is framed into stored, fixed-code, or dynamic-code
//! blocks. Dynamic tables are built with package-merge, so every
//! transmitted code is optimal for its block under the 15-bit limit.

use crate::bits::BitWriter;
use crate::compress::adler32::adler32;
use crate::compress::huffman::{self, Codeword};
use crate::compress::lz77::{MatchFinder, Token, MAX_MATCH_LENGTH, MIN_MATCH_LENGTH};
use crate::compress::package_merge::package_merge_any;
use crate::error::Result;

/// Length code base values (codes 257-285).
pub(crate) const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits for length codes.
pub(crate) const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Distance code base values (codes 0-29).
pub(crate) const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for distance codes.
pub(crate) const DISTANCE_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of the code-length-alphabet lengths (RFC 1951 §3.2.7).
pub(crate) const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Maximum code length for the code-length alphabet.
const MAX_CL_CODE_LENGTH: u8 = 7;

/// Get the length code (257-285), extra bit count, and extra value for a
/// match length.
pub(crate) fn length_code(length: u16) -> (u16, u8, u16) {
    debug_assert!(
        (MIN_MATCH_LENGTH as u16..=MAX_MATCH_LENGTH as u16).contains(&length),
        "Invalid length: {}",
        length
    );

    for (i, &base) in LENGTH_BASE.iter().enumerate() {
        let next_base = if i + 1 < LENGTH_BASE.len() {
            LENGTH_BASE[i + 1]
        } else {
            259
        };
        if length >= base && length < next_base {
            let extra_bits = LENGTH_EXTRA[i];
            let extra_value = length - base;
            return (257 + i as u16, extra_bits, extra_value);
        }
    }

    // Length 258
    (285, 0, 0)
}

/// Get the distance code (0-29), extra bit count, and extra value for a
/// match distance.
pub(crate) fn distance_code(distance: u16) -> (u16, u8, u16) {
    debug_assert!(distance >= 1, "Invalid distance");

    for (i, &base) in DISTANCE_BASE.iter().enumerate() {
        let next_base = if i + 1 < DISTANCE_BASE.len() {
            DISTANCE_BASE[i + 1]
        } else {
            32769
        };
        if distance >= base && distance < next_base {
            let extra_bits = DISTANCE_EXTRA[i];
            let extra_value = distance - base;
            return (i as u16, extra_bits, extra_value);
        }
    }

    unreachable!()
}

/// Symbol frequencies tallied from a token stream, one table per alphabet.
#[derive(Debug, Clone)]
pub struct FrequencyTally {
    /// Literal (0-255), end-of-block (256), and length code (257-285)
    /// frequencies.
    pub lit_len: [u32; 286],
    /// Distance code (0-29) frequencies.
    pub dist: [u32; 30],
}

impl FrequencyTally {
    /// Count symbol occurrences for a token stream. The end-of-block
    /// symbol is always counted once.
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut tally = Self {
            lit_len: [0; 286],
            dist: [0; 30],
        };

        for token in tokens {
            match *token {
                Token::Literal(byte) => tally.lit_len[byte as usize] += 1,
                Token::Backref { distance, length } => {
                    let (len_symbol, _, _) = length_code(length);
                    tally.lit_len[len_symbol as usize] += 1;
                    let (dist_symbol, _, _) = distance_code(distance);
                    tally.dist[dist_symbol as usize] += 1;
                }
            }
        }

        tally.lit_len[256] = 1;
        tally
    }

    /// Number of literal/length codes to transmit (at least 257).
    fn num_lit_codes(&self) -> usize {
        let last = (257..286).rev().find(|&i| self.lit_len[i] > 0);
        last.map_or(257, |i| i + 1)
    }

    /// Number of distance codes to transmit (at least 1).
    fn num_dist_codes(&self) -> usize {
        let last = (0..30).rev().find(|&i| self.dist[i] > 0);
        last.map_or(1, |i| i + 1)
    }
}

/// How blocks are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockStrategy {
    /// Pick the smallest of stored, fixed, and dynamic per block.
    #[default]
    Auto,
    /// Always emit stored (uncompressed) blocks.
    Stored,
    /// Always use the fixed RFC 1951 code tables.
    Fixed,
    /// Always transmit dynamic code tables.
    Dynamic,
}

/// Tunable parameters for [`deflate_with_options`].
#[derive(Debug, Clone, Copy)]
pub struct DeflateOptions {
    /// Compression level (0-9). Level 0 stores the input uncompressed;
    /// higher levels search hash chains more deeply.
    pub level: u8,
    /// Block encoding strategy.
    pub strategy: BlockStrategy,
}

impl Default for DeflateOptions {
    fn default() -> Self {
        Self {
            level: 6,
            strategy: BlockStrategy::Auto,
        }
    }
}

/// Compress data into a raw DEFLATE stream (no zlib/gzip wrapper).
///
/// # Arguments
/// * `data` - Raw data to compress
/// * `level` - Compression level 0-9 (0 = stored)
pub fn deflate(data: &[u8], level: u8) -> Vec<u8> {
    deflate_with_options(
        data,
        &DeflateOptions {
            level,
            strategy: BlockStrategy::Auto,
        },
    )
}

/// Compress data into a raw DEFLATE stream with explicit options.
pub fn deflate_with_options(data: &[u8], options: &DeflateOptions) -> Vec<u8> {
    if options.level == 0 || options.strategy == BlockStrategy::Stored {
        return deflate_stored(data);
    }

    if data.is_empty() {
        // Empty input: a final fixed-code block holding only end-of-block.
        let mut writer = BitWriter::new();
        writer.write_bits(1, 1); // BFINAL = 1
        writer.write_bits(1, 2); // BTYPE = 01 (fixed)

        let eob = huffman::fixed_literal_codes()[256];
        writer.write_bits_msb(eob.bits as u32, eob.num_bits);
        return writer.finish();
    }

    let mut finder = MatchFinder::new(options.level);
    let tokens = finder.compress(data);
    let tally = FrequencyTally::from_tokens(&tokens);

    match options.strategy {
        BlockStrategy::Fixed => encode_fixed_huffman(&tokens),
        BlockStrategy::Dynamic => match encode_dynamic_huffman(&tokens, &tally) {
            Ok(encoded) => encoded,
            Err(_) => encode_fixed_huffman(&tokens),
        },
        BlockStrategy::Auto | BlockStrategy::Stored => {
            let fixed_bits = 3 + fixed_payload_bit_cost(&tally);

            let encoded = match DynamicTables::build(&tally) {
                Ok(tables) => {
                    let dynamic_bits = 3 + tables.header_bit_cost() + tables.payload_bit_cost(&tally);
                    if dynamic_bits < fixed_bits {
                        let mut writer = BitWriter::with_capacity(dynamic_bits / 8 + 1);
                        writer.write_bits(1, 1); // BFINAL
                        writer.write_bits(2, 2); // BTYPE = 10 (dynamic)
                        tables.write_header(&mut writer);
                        write_tokens(&mut writer, &tokens, &tables.lit_codes, &tables.dist_codes);
                        writer.finish()
                    } else {
                        encode_fixed_huffman(&tokens)
                    }
                }
                // The fixed tables always apply.
                Err(_) => encode_fixed_huffman(&tokens),
            };

            let stored_len = data.len() + 5 * data.len().div_ceil(65535);
            if stored_len < encoded.len() {
                deflate_stored(data)
            } else {
                encoded
            }
        }
    }
}

/// Encode tokens as a single final block using the fixed code tables.
fn encode_fixed_huffman(tokens: &[Token]) -> Vec<u8> {
    let lit_codes = huffman::fixed_literal_codes();
    let dist_codes = huffman::fixed_distance_codes();

    let mut writer = BitWriter::new();

    writer.write_bits(1, 1); // BFINAL
    writer.write_bits(1, 2); // BTYPE = 01 (fixed)

    write_tokens(&mut writer, tokens, lit_codes, dist_codes);

    writer.finish()
}

/// Encode tokens as a single final block with transmitted code tables.
fn encode_dynamic_huffman(tokens: &[Token], tally: &FrequencyTally) -> Result<Vec<u8>> {
    let tables = DynamicTables::build(tally)?;

    let mut writer = BitWriter::new();
    writer.write_bits(1, 1); // BFINAL
    writer.write_bits(2, 2); // BTYPE = 10 (dynamic)
    tables.write_header(&mut writer);
    write_tokens(&mut writer, tokens, &tables.lit_codes, &tables.dist_codes);

    Ok(writer.finish())
}

/// Emit the token stream plus the end-of-block symbol. Codewords go out
/// MSB first, extra bits LSB first.
fn write_tokens(
    writer: &mut BitWriter,
    tokens: &[Token],
    lit_codes: &[Codeword],
    dist_codes: &[Codeword],
) {
    for token in tokens {
        match *token {
            Token::Literal(byte) => {
                let code = lit_codes[byte as usize];
                writer.write_bits_msb(code.bits as u32, code.num_bits);
            }
            Token::Backref { distance, length } => {
                let (len_symbol, len_extra_bits, len_extra_value) = length_code(length);
                let len_code = lit_codes[len_symbol as usize];
                writer.write_bits_msb(len_code.bits as u32, len_code.num_bits);
                if len_extra_bits > 0 {
                    writer.write_bits(len_extra_value as u32, len_extra_bits);
                }

                let (dist_symbol, dist_extra_bits, dist_extra_value) = distance_code(distance);
                let dist_code = dist_codes[dist_symbol as usize];
                writer.write_bits_msb(dist_code.bits as u32, dist_code.num_bits);
                if dist_extra_bits > 0 {
                    writer.write_bits(dist_extra_value as u32, dist_extra_bits);
                }
            }
        }
    }

    let eob = lit_codes[256];
    writer.write_bits_msb(eob.bits as u32, eob.num_bits);
}

/// Everything needed to transmit and use one dynamic block's code tables.
struct DynamicTables {
    lit_lengths: Vec<u8>,
    dist_lengths: Vec<u8>,
    lit_codes: Vec<Codeword>,
    dist_codes: Vec<Codeword>,
    cl_lengths: Vec<u8>,
    cl_codes: Vec<Codeword>,
    /// Run-length coded lit/len + distance lengths as (symbol, extra).
    rle: Vec<(u8, u8)>,
    hclen: usize,
}

impl DynamicTables {
    fn build(tally: &FrequencyTally) -> Result<Self> {
        let num_lit = tally.num_lit_codes();
        let num_dist = tally.num_dist_codes();

        let lit_lengths = code_lengths_for(&tally.lit_len[..num_lit], huffman::MAX_CODE_LENGTH)?;
        let mut dist_lengths =
            code_lengths_for(&tally.dist[..num_dist], huffman::MAX_CODE_LENGTH)?;

        // At least one distance code goes on the wire even when no
        // back-reference occurred.
        if dist_lengths.iter().all(|&l| l == 0) {
            dist_lengths[0] = 1;
        }

        // RLE-code the concatenated length arrays and derive the
        // code-length-alphabet code from their symbol histogram.
        let combined: Vec<u8> = lit_lengths
            .iter()
            .chain(dist_lengths.iter())
            .copied()
            .collect();
        let rle = rle_encode_lengths(&combined);

        let mut cl_freq = [0u32; 19];
        for &(symbol, _) in &rle {
            cl_freq[symbol as usize] += 1;
        }

        let mut cl_lengths = code_lengths_for(&cl_freq, MAX_CL_CODE_LENGTH)?;

        // A one-code code-length alphabet would be an incomplete prefix
        // code on the wire; pad it with a second, unused 1-bit code.
        if cl_lengths.iter().filter(|&&l| l > 0).count() == 1 {
            let used = cl_lengths.iter().position(|&l| l > 0).unwrap_or(0);
            let filler = if used == 0 { 18 } else { 0 };
            cl_lengths[filler] = 1;
            cl_lengths[used] = 1;
        }

        let hclen = (4..=19)
            .rev()
            .find(|&i| cl_lengths[CODE_LENGTH_ORDER[i - 1]] > 0)
            .unwrap_or(4);

        let lit_codes = huffman::generate_canonical_codes(&lit_lengths);
        let dist_codes = huffman::generate_canonical_codes(&dist_lengths);
        let cl_codes = huffman::generate_canonical_codes(&cl_lengths);

        Ok(Self {
            lit_lengths,
            dist_lengths,
            lit_codes,
            dist_codes,
            cl_lengths,
            cl_codes,
            rle,
            hclen,
        })
    }

    /// Exact size in bits of the dynamic header this table set produces.
    fn header_bit_cost(&self) -> usize {
        let mut bits = 5 + 5 + 4 + 3 * self.hclen;
        for &(symbol, _) in &self.rle {
            bits += self.cl_lengths[symbol as usize] as usize;
            bits += match symbol {
                16 => 2,
                17 => 3,
                18 => 7,
                _ => 0,
            };
        }
        bits
    }

    /// Exact size in bits of the token stream under these tables.
    fn payload_bit_cost(&self, tally: &FrequencyTally) -> usize {
        payload_bit_cost(tally, &self.lit_lengths, &self.dist_lengths)
    }

    /// Write HLIT, HDIST, HCLEN, the code-length-alphabet lengths, and the
    /// RLE-coded length arrays (RFC 1951 §3.2.7).
    fn write_header(&self, writer: &mut BitWriter) {
        writer.write_bits((self.lit_lengths.len() - 257) as u32, 5);
        writer.write_bits((self.dist_lengths.len() - 1) as u32, 5);
        writer.write_bits((self.hclen - 4) as u32, 4);

        for &symbol in CODE_LENGTH_ORDER.iter().take(self.hclen) {
            writer.write_bits(self.cl_lengths[symbol] as u32, 3);
        }

        for &(symbol, extra) in &self.rle {
            let code = self.cl_codes[symbol as usize];
            writer.write_bits_msb(code.bits as u32, code.num_bits);
            match symbol {
                16 => writer.write_bits(extra as u32, 2), // 3-6 repeats
                17 => writer.write_bits(extra as u32, 3), // 3-10 zeros
                18 => writer.write_bits(extra as u32, 7), // 11-138 zeros
                _ => {}
            }
        }
    }
}

/// Optimal length-limited code lengths for a frequency table, as `u8`.
fn code_lengths_for(freqs: &[u32], limit: u8) -> Result<Vec<u8>> {
    let lengths = package_merge_any(freqs, limit)?;
    Ok(lengths.iter().map(|&l| l as u8).collect())
}

/// Token stream cost in bits under the given per-symbol code lengths.
fn payload_bit_cost(tally: &FrequencyTally, lit_lengths: &[u8], dist_lengths: &[u8]) -> usize {
    let mut bits = 0usize;

    for (symbol, &freq) in tally.lit_len.iter().enumerate() {
        if freq == 0 {
            continue;
        }
        bits += freq as usize * lit_lengths[symbol] as usize;
        if symbol >= 257 {
            bits += freq as usize * LENGTH_EXTRA[symbol - 257] as usize;
        }
    }

    for (symbol, &freq) in tally.dist.iter().enumerate() {
        if freq == 0 {
            continue;
        }
        bits += freq as usize * (dist_lengths[symbol] + DISTANCE_EXTRA[symbol]) as usize;
    }

    bits
}

/// Token stream cost in bits under the fixed RFC 1951 tables.
fn fixed_payload_bit_cost(tally: &FrequencyTally) -> usize {
    payload_bit_cost(
        tally,
        &huffman::fixed_literal_lengths(),
        &huffman::fixed_distance_lengths(),
    )
}

/// Run-length code a length array using the escapes 16 (repeat previous
/// 3-6 times), 17 (3-10 zeros), and 18 (11-138 zeros). Returns
/// (symbol, extra value) pairs.
fn rle_encode_lengths(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];
        let total_run = lengths[i..].iter().take_while(|&&l| l == len).count();
        let mut run = total_run;

        if len == 0 {
            while run > 0 {
                if run >= 11 {
                    let count = run.min(138);
                    result.push((18, (count - 11) as u8));
                    run -= count;
                } else if run >= 3 {
                    let count = run.min(10);
                    result.push((17, (count - 3) as u8));
                    run -= count;
                } else {
                    result.push((0, 0));
                    run -= 1;
                }
            }
        } else {
            // The first occurrence is always literal; repeats may use 16.
            result.push((len, 0));
            run -= 1;

            while run > 0 {
                if run >= 3 {
                    let count = run.min(6);
                    result.push((16, (count - 3) as u8));
                    run -= count;
                } else {
                    result.push((len, 0));
                    run -= 1;
                }
            }
        }

        i += total_run;
    }

    result
}

/// Compress data using DEFLATE with stored blocks (no compression).
/// Useful for already-compressed data or when speed is critical.
pub fn deflate_stored(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len() + data.len() / 65535 * 5 + 10);
    let num_chunks = data.len().div_ceil(65535).max(1);

    let mut chunks: Vec<&[u8]> = data.chunks(65535).collect();
    if chunks.is_empty() {
        chunks.push(&[]);
    }

    for (i, chunk) in chunks.iter().enumerate() {
        let is_final = i == num_chunks - 1;
        let len = chunk.len() as u16;
        let nlen = !len;

        // Block header: BFINAL + BTYPE=00, padded to the byte boundary.
        output.push(if is_final { 0x01 } else { 0x00 });

        // LEN and NLEN (little-endian)
        output.push(len as u8);
        output.push((len >> 8) as u8);
        output.push(nlen as u8);
        output.push((nlen >> 8) as u8);

        output.extend_from_slice(chunk);
    }

    output
}

/// Compress data into a zlib container (RFC 1950): a 2-byte header, the
/// DEFLATE stream, and a big-endian Adler-32 of the raw input.
pub fn deflate_zlib(data: &[u8], level: u8) -> Vec<u8> {
    // CM = 8 (deflate), CINFO = 7 (32 KiB window).
    let cmf: u8 = 0x78;
    // FLEVEL hint plus the FCHECK making the header a multiple of 31.
    let flevel: u8 = match level {
        0..=1 => 0,
        2..=5 => 1,
        6 => 2,
        _ => 3,
    };
    let mut flg = flevel << 6;
    let remainder = ((cmf as u16) << 8 | flg as u16) % 31;
    if remainder != 0 {
        flg += 31 - remainder as u8;
    }

    let body = deflate(data, level);

    let mut output = Vec::with_capacity(body.len() + 6);
    output.push(cmf);
    output.push(flg);
    output.extend_from_slice(&body);
    output.extend_from_slice(&adler32(data).to_be_bytes());
    output
}

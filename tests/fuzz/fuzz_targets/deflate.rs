//! Fuzz target for DEFLATE compression.
//!
//! Tests that compression handles arbitrary input without panicking and
//! that every stream round-trips through our own inflater.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

/// Structured input for DEFLATE fuzzing.
#[derive(Arbitrary, Debug)]
struct DeflateInput {
    /// Compression level (0-9)
    level: u8,
    /// Raw data to compress
    data: Vec<u8>,
}

fuzz_target!(|input: DeflateInput| {
    // Limit input size to avoid OOM
    if input.data.len() > 1024 * 1024 {
        return;
    }

    let level = input.level % 10;

    let compressed = flato::compress(&input.data, level);
    let restored = flato::decompress(&compressed).expect("own stream must inflate");
    assert_eq!(restored, input.data, "roundtrip mismatch");

    // The zlib container must carry a valid header as well.
    let wrapped = flato::deflate_zlib(&input.data, level);
    assert_eq!(wrapped[0] & 0x0F, 8, "invalid compression method");
    assert_eq!(
        (wrapped[0] as u16 * 256 + wrapped[1] as u16) % 31,
        0,
        "invalid header checksum"
    );
});

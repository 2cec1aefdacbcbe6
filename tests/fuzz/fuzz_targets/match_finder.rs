//! Fuzz target for the LZ77 match finder.
//!
//! Tests that match finding handles arbitrary input without panicking,
//! produces in-range tokens, and that the tokens reconstruct the input.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use flato::compress::lz77::{
    expand_tokens, MatchFinder, Token, MAX_MATCH_LENGTH, MIN_MATCH_LENGTH, WINDOW_SIZE,
};

/// Structured input for match finder fuzzing.
#[derive(Arbitrary, Debug)]
struct MatchFinderInput {
    /// Compression level (1-9)
    level: u8,
    /// Raw data to compress
    data: Vec<u8>,
}

fuzz_target!(|input: MatchFinderInput| {
    // Limit input size to avoid OOM
    if input.data.len() > 256 * 1024 {
        return;
    }

    let level = (input.level % 9).max(1);

    let mut finder = MatchFinder::new(level);
    let tokens = finder.compress(&input.data);

    for token in &tokens {
        if let Token::Backref { distance, length } = *token {
            assert!(
                (1..=WINDOW_SIZE as u16).contains(&distance),
                "distance out of range"
            );
            assert!(
                (MIN_MATCH_LENGTH as u16..=MAX_MATCH_LENGTH as u16).contains(&length),
                "length out of range"
            );
        }
    }

    assert_eq!(
        expand_tokens(&tokens),
        input.data,
        "tokens do not reconstruct original data"
    );
});

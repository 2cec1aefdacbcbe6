//! Fuzz target for the DEFLATE decoder.
//!
//! Arbitrary bytes must never panic the inflater; they either decode or
//! fail with a structured error.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // A stream can expand ~1000x; cap the input to bound the output.
    if data.len() > 64 * 1024 {
        return;
    }

    let _ = flato::decompress(data);
    let _ = flato::inflate_zlib(data);
});

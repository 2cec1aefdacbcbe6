//! # flato
//!
//! A DEFLATE-family byte-stream compressor and decompressor with
//! hand-implemented cores: a hash-chained LZ77 match finder over a 32 KiB
//! sliding window, optimal length-limited Huffman code assignment via the
//! boundary package-merge algorithm (Moffat et al. 1995), and canonical
//! prefix coding with RFC 1951 block framing.
//!
//! ## Features
//!
//! - **RFC 1951 compatible**: raw DEFLATE output any conforming inflater
//!   accepts, and vice versa
//! - **Optimal dynamic tables**: code lengths come from package-merge, not
//!   a truncation heuristic
//! - **zlib containers** (RFC 1950) with Adler-32 validation
//! - Levels 0-9 trading chain-search depth for ratio
//!
//! ## Example
//!
//! ```rust
//! let data = b"an example of some compressible example data";
//! let compressed = flato::compress(data, 6);
//! let restored = flato::decompress(&compressed).unwrap();
//! assert_eq!(restored, data);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bits;
pub mod compress;
pub mod decode;
pub mod error;

pub use compress::deflate::{
    deflate, deflate_stored, deflate_with_options, deflate_zlib, BlockStrategy, DeflateOptions,
};
pub use compress::lz77::{MatchFinder, Token};
pub use compress::package_merge::{package_merge, package_merge_any};
pub use decode::inflate::{inflate, inflate_zlib};
pub use error::{Error, Result};

/// Compress `input` into a raw DEFLATE stream.
///
/// `level` ranges 0-9: 0 stores the input uncompressed, 1 is fastest, 9
/// searches hardest. The output is a pure function of `(input, level)`.
pub fn compress(input: &[u8], level: u8) -> Vec<u8> {
    deflate(input, level)
}

/// Decompress a raw DEFLATE stream produced by [`compress`] or any other
/// conforming deflater.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    inflate(input)
}

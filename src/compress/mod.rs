//! Compression-side pipeline.
//!
//! Raw bytes flow through the match finder into a token stream, the token
//! stream is tallied per alphabet, package-merge assigns optimal
//! length-limited code lengths, and the block writer frames everything
//! into RFC 1951 blocks.

pub mod adler32;
pub mod deflate;
pub mod huffman;
pub mod lz77;
pub mod package_merge;

pub use adler32::adler32;
pub use deflate::{
    deflate, deflate_stored, deflate_with_options, deflate_zlib, BlockStrategy, DeflateOptions,
    FrequencyTally,
};
pub use lz77::{MatchFinder, Token};
pub use package_merge::{package_merge, package_merge_any};

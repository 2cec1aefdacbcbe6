//! Decompression-side pipeline: bit reading and block decoding.

pub mod bit_reader;
pub mod inflate;

pub use bit_reader::BitReader;
pub use inflate::{inflate, inflate_zlib};

//! Error types for the flato library.

use thiserror::Error;

/// Result type alias for flato operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during compression or decompression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The code length limit cannot accommodate the number of symbols
    /// (a depth-`limit` binary tree has at most `2^limit` leaves).
    #[error("code length limit {limit} is too small for {symbols} symbols")]
    LimitTooSmall {
        /// The requested depth limit.
        limit: u8,
        /// The number of symbols to code.
        symbols: usize,
    },

    /// The code length limit exceeds the supported maximum of 32.
    #[error("code length limit {0} exceeds the maximum of 32")]
    LimitTooLarge(u8),

    /// The list of frequencies is empty.
    #[error("the list of frequencies is empty")]
    EmptyFrequencies,

    /// A frequency of 0 was passed where only positive counts are allowed.
    #[error("frequencies of 0 are not allowed")]
    ZeroFrequency,

    /// Code lengths do not describe a complete prefix code (the Kraft sum
    /// is over- or under-subscribed).
    #[error("code lengths do not form a complete prefix code")]
    MalformedCodeLengths,

    /// The input ended in the middle of a symbol or block.
    #[error("unexpected end of stream")]
    TruncatedStream,

    /// A block header used the reserved block type.
    #[error("invalid block type: {0}")]
    InvalidBlockType(u8),

    /// A decoded back-reference distance is zero or reaches before the
    /// start of the produced output.
    #[error("back-reference distance {distance} exceeds the {available} bytes produced")]
    OversizeDistance {
        /// The decoded distance.
        distance: usize,
        /// Number of bytes produced so far.
        available: usize,
    },

    /// A literal/length symbol outside the RFC 1951 alphabet was decoded.
    #[error("length symbol {0} is outside the literal/length alphabet")]
    OversizeLength(u16),

    /// The stream is structurally invalid in a way that is not attributable
    /// to a single symbol (bad container header, misused run-length escape,
    /// LEN/NLEN mismatch, ...).
    #[error("malformed stream: {0}")]
    Malformed(&'static str),

    /// The container checksum did not match the decompressed payload.
    #[error("checksum mismatch: expected {expected:08X}, got {found:08X}")]
    ChecksumMismatch {
        /// Checksum stored in the container.
        expected: u32,
        /// Checksum computed over the output.
        found: u32,
    },
}

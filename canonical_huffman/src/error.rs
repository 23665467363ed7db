//! Errors reported by the codec.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Codec error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialized codebook is truncated, contains a malformed varint
    /// or describes lengths that cannot form a prefix code.
    #[error("huff: invalid codebook")]
    InvalidCodebook,

    /// Symbol outside the coded alphabet was written,
    /// or the bits read match no codeword.
    #[error("huff: unknown symbol")]
    UnknownSymbol,

    /// Frequencies without any occurring symbol.
    #[error("huff: empty alphabet")]
    EmptyAlphabet,

    /// Alphabet with too many symbols for the end-of-input slot to differ from [`crate::EOF`].
    #[error("huff: alphabet of {len} symbols is too large")]
    AlphabetTooLarge { len: usize },

    /// Huffman tree deeper than the codes can represent.
    #[error("huff: code length {len} exceeds {max}", max = crate::MAX_CODE_LEN)]
    CodeTooLong { len: u32 },

    /// Error reported by the underlying bit stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

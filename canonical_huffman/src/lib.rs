#![doc = include_str!("../README.md")]

mod error;
pub use error::{Error, Result};
pub mod bitstream;
pub use bitstream::{BitRead, BitReader, BitWrite, BitWriter};
mod codebook;
pub use codebook::{Canonical, Codebook, Symbol};
mod tree;
mod frequencies;
pub use frequencies::{count_symbols, entropy};
mod encoder;
pub use encoder::{Encoder, Writer};
mod decoder;
pub use decoder::Decoder;

/// Symbol value that stands for the end-of-input symbol, both when writing and as a result of reading.
pub const EOF: u32 = 0xFFFF_FFFF;

/// The largest supported code length, in bits.
pub const MAX_CODE_LEN: u32 = 64;

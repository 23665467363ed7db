//! Decoder of canonical Huffman codes from a bit stream.

use std::sync::Arc;

use dyn_size_of::GetSize;

use crate::bitstream::BitRead;
use crate::codebook::{Canonical, Codebook};
use crate::{Error, Result, EOF};

/// Decoder of canonical Huffman codes.
///
/// It walks the histogram of code lengths, consuming one bit per level, without building any tree.
/// Time complexity of decoding a symbol is *O(length of its code)*, memory: *O(1)*.
///
/// Cloning is cheap, clones share the canonical table.
#[derive(Clone, Debug)]
pub struct Decoder {
    canonical: Arc<Canonical>,
    /// Slot of the end-of-input symbol.
    eof: u32
}

impl Decoder {
    /// Constructs decoder for the codebook serialized by [`crate::Encoder::codebook_bytes`].
    ///
    /// Fails with [`Error::InvalidCodebook`] if `codebook` is malformed.
    pub fn new(codebook: &[u8]) -> Result<Self> {
        Self::from_codebook(Codebook::from_bytes(codebook)?)
    }

    /// Constructs decoder for the given `codebook`, whose last slot is the end-of-input symbol.
    pub fn from_codebook(mut codebook: Codebook) -> Result<Self> {
        let canonical = codebook.canonicalize()?;
        tracing::debug!(slots = codebook.len(), max_len = canonical.max_len(), "reconstructed decoder");
        Ok(Self::from_canonical(codebook.len() as u32 - 1, Arc::new(canonical)))
    }

    #[inline] pub(crate) fn from_canonical(eof: u32, canonical: Arc<Canonical>) -> Self {
        Self { canonical, eof }
    }

    /// Decodes and returns a single symbol read from `bits`; the end-of-input symbol is returned as [`EOF`].
    ///
    /// Fails with [`Error::UnknownSymbol`] if the bits read do not form any codeword,
    /// and with [`Error::Io`] if `bits` fails (including the end of `bits`).
    pub fn read_symbol<B: BitRead + ?Sized>(&self, bits: &mut B) -> Result<u32> {
        let Canonical { sorted, histogram } = self.canonical.as_ref();
        let mut offset = 0usize;    // number of codes shorter than len
        let mut code = 0u64;
        for len in 1..histogram.len() {
            code = (code << 1) | bits.read_bit()? as u64;
            offset += histogram[len - 1] as usize;
            let count = histogram[len] as u64;
            if count == 0 { continue; }
            // codes of length len are consecutive numbers, starting from the code of sorted[offset]
            let index = code.wrapping_sub(sorted[offset].code);
            if index < count {
                let value = sorted[offset + index as usize].value;
                return Ok(if value == self.eof { EOF } else { value });
            }
        }
        Err(Error::UnknownSymbol)
    }

    /// Decodes symbols from `bits` up to the end-of-input symbol, which is not included in the result.
    pub fn read_all<B: BitRead + ?Sized>(&self, bits: &mut B) -> Result<Vec<u32>> {
        let mut result = Vec::new();
        loop {
            match self.read_symbol(bits)? {
                EOF => return Ok(result),
                symbol => result.push(symbol)
            }
        }
    }

    /// Returns the slot of the end-of-input symbol, equal to the size of the input alphabet.
    #[inline] pub fn eof_slot(&self) -> u32 { self.eof }

    /// Returns the length of the longest code.
    #[inline] pub fn max_len(&self) -> u32 { self.canonical.max_len() }

    /// Returns the canonical table.
    #[inline] pub fn canonical(&self) -> &Canonical { &self.canonical }
}

impl GetSize for Decoder {
    fn size_bytes_dyn(&self) -> usize { self.canonical.size_bytes() }
    const USES_DYN_MEM: bool = true;
}

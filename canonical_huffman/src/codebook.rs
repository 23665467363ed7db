//! Codebook: code lengths of symbols, their canonical codes and serialization.

use std::io::{self, Read, Write};

use binout::{vbyte_len, vbyte_read, vbyte_write};
use dyn_size_of::GetSize;

use crate::{Error, Result, MAX_CODE_LEN};

/// Initial capacity for codebooks of not yet known size read from a stream.
const READ_CAPACITY_LIMIT: u32 = 1 << 12;

/// Codeword assigned to a symbol.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, Hash)]
pub struct Symbol {
    /// Value of the symbol, equal to its index in the codebook.
    pub value: u32,
    /// Codeword, meaningful only if `len > 0`. Its `len` lowest bits are written, the most significant first.
    pub code: u64,
    /// Length of the codeword in bits, `0` if the symbol does not occur.
    pub len: u32
}

impl GetSize for Symbol {}

/// Symbols sorted in canonical order together with the histogram of their code lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical {
    /// Coded symbols, sorted by length and then by value.
    pub(crate) sorted: Box<[Symbol]>,
    /// `histogram[len]` is the number of symbols with codes of length `len`.
    /// The last element describes the longest code (so `histogram[0]` is always `0`).
    pub(crate) histogram: Box<[u32]>
}

impl Canonical {
    /// Returns coded symbols in canonical order.
    #[inline] pub fn sorted(&self) -> &[Symbol] { &self.sorted }

    /// Returns the number of symbols for each code length.
    #[inline] pub fn histogram(&self) -> &[u32] { &self.histogram }

    /// Returns the length of the longest code.
    #[inline] pub fn max_len(&self) -> u32 { (self.histogram.len() - 1) as u32 }
}

impl GetSize for Canonical {
    fn size_bytes_dyn(&self) -> usize { self.sorted.size_bytes_dyn() + self.histogram.size_bytes_dyn() }
    const USES_DYN_MEM: bool = true;
}

/// Table of symbols indexed by their values. The last symbol is the end-of-input one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    symbols: Box<[Symbol]>
}

impl Codebook {
    /// Constructs the codebook with uncomputed codes for the given code lengths of the successive symbols.
    pub fn from_lengths<L: IntoIterator<Item = u32>>(lengths: L) -> Self {
        Self { symbols: lengths.into_iter().zip(0..).map(|(len, value)| Symbol { value, code: 0, len }).collect() }
    }

    /// Returns the number of symbol slots, including the end-of-input one.
    #[inline] pub fn len(&self) -> usize { self.symbols.len() }

    /// Returns whether `self` has no slots at all.
    #[inline] pub fn is_empty(&self) -> bool { self.symbols.is_empty() }

    /// Returns all symbols, indexed by value.
    #[inline] pub fn symbols(&self) -> &[Symbol] { &self.symbols }

    /// Returns the symbol with the given `value`.
    #[inline] pub fn get(&self, value: u32) -> Option<&Symbol> { self.symbols.get(value as usize) }

    /// Returns the length of the longest code.
    pub fn max_len(&self) -> u32 { self.symbols.iter().map(|s| s.len).max().unwrap_or(0) }

    /// Assigns canonical codes to all symbols of non-zero length and returns them in canonical order.
    ///
    /// Codes of the same length are consecutive numbers, ordered by symbol values,
    /// and the first code of each length follows (shifted left) the last code of the shorter one.
    /// Fails with [`Error::InvalidCodebook`] if no symbol is coded,
    /// some length exceeds [`MAX_CODE_LEN`] or the lengths oversubscribe the code space.
    pub fn canonicalize(&mut self) -> Result<Canonical> {
        let mut sorted: Vec<Symbol> = self.symbols.iter().filter(|s| s.len != 0).copied().collect();
        sorted.sort_by_key(|s| (s.len, s.value));
        let max_len = match sorted.last() {
            Some(s) if s.len <= MAX_CODE_LEN => s.len,
            _ => return Err(Error::InvalidCodebook)
        };
        let mut histogram = vec![0u32; max_len as usize + 1].into_boxed_slice();
        // 128 bits hold the unassigned code following a complete level of 64-bit codes
        let mut code = 0u128;
        let mut prev_len = 0;
        for symbol in sorted.iter_mut() {
            code <<= symbol.len - prev_len;
            prev_len = symbol.len;
            if code >> symbol.len != 0 { return Err(Error::InvalidCodebook); }
            symbol.code = code as u64;
            self.symbols[symbol.value as usize].code = symbol.code;
            histogram[symbol.len as usize] += 1;
            code += 1;
        }
        Ok(Canonical { sorted: sorted.into_boxed_slice(), histogram })
    }

    /// Returns number of bytes which `write` will write.
    pub fn write_bytes(&self) -> usize {
        vbyte_len(self.symbols.len() as u32) as usize +
            self.symbols.iter().map(|s| vbyte_len(s.len) as usize).sum::<usize>()
    }

    /// Writes `self` to `output` as VByte-encoded number of slots followed by the code length of each slot.
    /// Codes are not written, they are recomputed by [`Self::canonicalize`].
    pub fn write(&self, output: &mut dyn Write) -> io::Result<()> {
        vbyte_write(output, self.symbols.len() as u32)?;
        self.symbols.iter().try_for_each(|s| vbyte_write(output, s.len))
    }

    /// Returns `self` serialized by [`Self::write`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.write_bytes());
        self.write(&mut result).expect("writing to Vec never fails");
        result
    }

    /// Reads `Codebook` written by [`Self::write`] from `input`.
    pub fn read(input: &mut dyn Read) -> Result<Self> {
        let len = read_vbyte(input)?;
        if len == 0 { return Err(Error::InvalidCodebook); }
        let mut symbols = Vec::with_capacity(len.min(READ_CAPACITY_LIMIT) as usize);
        for value in 0..len {
            symbols.push(Symbol { value, code: 0, len: read_vbyte(input)? });
        }
        Ok(Self { symbols: symbols.into_boxed_slice() })
    }

    /// Reads `Codebook` written by [`Self::write`] from the beginning of `bytes`.
    ///
    /// The declared number of slots is checked against the size of `bytes` before allocation.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        let len = read_vbyte(&mut bytes)?;
        // each slot occupies at least one byte
        if len == 0 || len as usize > bytes.len() { return Err(Error::InvalidCodebook); }
        let symbols = (0..len)
            .map(|value| -> Result<Symbol> { Ok(Symbol { value, code: 0, len: read_vbyte(&mut bytes)? }) })
            .collect::<Result<Box<[_]>>>()?;
        Ok(Self { symbols })
    }
}

impl GetSize for Codebook {
    fn size_bytes_dyn(&self) -> usize { self.symbols.size_bytes_dyn() }
    const USES_DYN_MEM: bool = true;
}

/// Reads VByte value, treating its truncation or malformation as an invalid codebook.
///
/// The bytes of the value are gathered first, so that a value exceeding `u32` is rejected
/// instead of losing its highest bits.
fn read_vbyte(input: &mut dyn Read) -> Result<u32> {
    let mut buff = [0u8; 5];
    let mut len = 0;
    loop {
        input.read_exact(std::slice::from_mut(&mut buff[len])).map_err(read_error)?;
        len += 1;
        if buff[len - 1] < 0x80 { break; }
        if len == buff.len() { return Err(Error::InvalidCodebook); }
    }
    // the fifth byte holds the 4 highest bits of u32
    if len == buff.len() && buff[len - 1] > 0x0F { return Err(Error::InvalidCodebook); }
    vbyte_read(&mut &buff[..len]).map_err(read_error)
}

fn read_error(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData => Error::InvalidCodebook,
        _ => Error::Io(e)
    }
}

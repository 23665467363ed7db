//! Encoder of symbols and the writer of their codewords.

use std::borrow::Borrow;
use std::io::Write;
use std::sync::Arc;

use dyn_size_of::GetSize;

use crate::bitstream::{BitWrite, BitWriter};
use crate::codebook::{Canonical, Codebook, Symbol};
use crate::frequencies::count_symbols;
use crate::tree::code_lengths;
use crate::{Decoder, Error, Result, EOF};

/// Canonical Huffman encoder for the alphabet `0..alphabet_len()` extended by the end-of-input symbol.
pub struct Encoder {
    codebook: Codebook,
    canonical: Arc<Canonical>,
    /// Slot of the end-of-input symbol, equal to the alphabet size.
    eof: u32
}

impl Encoder {
    /// Constructs encoder for the given `counts`, where `counts[value]` is the number of occurrences of `value`.
    ///
    /// Fails with [`Error::EmptyAlphabet`] if no value occurs,
    /// with [`Error::AlphabetTooLarge`] if `counts.len()` is not less than [`EOF`]
    /// and with [`Error::CodeTooLong`] if the frequencies are so skewed that some code would exceed [`crate::MAX_CODE_LEN`].
    pub fn new(counts: &[u32]) -> Result<Self> {
        let mut codebook = Codebook::from_lengths(code_lengths(counts)?.into_vec());
        let canonical = codebook.canonicalize()?;
        tracing::debug!(slots = codebook.len(), coded = canonical.sorted().len(), max_len = canonical.max_len(), "constructed encoder");
        Ok(Self { codebook, canonical: Arc::new(canonical), eof: counts.len() as u32 })
    }

    /// Counts occurrences of all values exposed by `symbols` and constructs encoder for them.
    pub fn from_symbols<I>(symbols: I) -> Result<Self> where I: IntoIterator, I::Item: Borrow<u32> {
        Self::new(&count_symbols(symbols))
    }

    /// Maps [`EOF`] to the slot of the end-of-input symbol.
    #[inline] fn slot(&self, symbol: u32) -> u32 {
        if symbol == EOF { self.eof } else { symbol }
    }

    /// Returns the code length of `symbol` (which can be [`EOF`]), or `0` if `symbol` has no code.
    #[inline] pub fn symbol_len(&self, symbol: u32) -> u32 {
        self.codebook.get(self.slot(symbol)).map_or(0, |s| s.len)
    }

    /// Returns the codeword of `symbol` (which can be [`EOF`]), or `None` if `symbol` has no code.
    #[inline] pub fn code(&self, symbol: u32) -> Option<Symbol> {
        self.codebook.get(self.slot(symbol)).filter(|s| s.len != 0).copied()
    }

    /// Returns the slot of the end-of-input symbol.
    #[inline] pub fn eof_slot(&self) -> u32 { self.eof }

    /// Returns the number of values in the input alphabet (the end-of-input symbol excluded).
    #[inline] pub fn alphabet_len(&self) -> usize { self.eof as usize }

    /// Returns the canonicalized codebook.
    #[inline] pub fn codebook(&self) -> &Codebook { &self.codebook }

    /// Returns the serialized codebook, from which [`Decoder::new`] reconstructs the decoder.
    pub fn codebook_bytes(&self) -> Vec<u8> { self.codebook.to_bytes() }

    /// Returns the number of bits needed to encode a text with the given `counts` of values,
    /// followed by the end-of-input symbol. Values without code are not counted.
    pub fn encoded_bits(&self, counts: &[u32]) -> u64 {
        counts.iter().zip(self.codebook.symbols())
            .map(|(count, s)| *count as u64 * s.len as u64)
            .sum::<u64>() + self.symbol_len(EOF) as u64
    }

    /// Returns writer that encodes symbols to `output`.
    pub fn writer<W: Write>(&self, output: W) -> Writer<'_, BitWriter<W>> {
        Writer::new(self, BitWriter::new(output))
    }

    /// Returns decoder that shares the canonical table with `self`.
    pub fn decoder(&self) -> Decoder {
        Decoder::from_canonical(self.eof, Arc::clone(&self.canonical))
    }
}

impl GetSize for Encoder {
    fn size_bytes_dyn(&self) -> usize { self.codebook.size_bytes_dyn() + self.canonical.size_bytes() }
    const USES_DYN_MEM: bool = true;
}

/// Writes codewords of symbols to a bit stream.
///
/// The stream has to be closed to write the final partial byte.
/// Dropping the writer closes it, ignoring errors; call [`Writer::close`] to get them.
pub struct Writer<'e, B: BitWrite> {
    encoder: &'e Encoder,
    bits: B,
    closed: bool
}

impl<'e, B: BitWrite> Writer<'e, B> {
    /// Constructs writer that encodes symbols with `encoder` to `bits`.
    pub fn new(encoder: &'e Encoder, bits: B) -> Self {
        Self { encoder, bits, closed: false }
    }

    /// Writes the codeword of `symbol` (which can be [`EOF`]) and returns its length in bits.
    ///
    /// Fails with [`Error::UnknownSymbol`], writing nothing, if `symbol` has no code.
    pub fn write_symbol(&mut self, symbol: u32) -> Result<u32> {
        let slot = self.encoder.slot(symbol);
        if slot > self.encoder.eof { return Err(Error::UnknownSymbol); }
        let Symbol { code, len, .. } = self.encoder.codebook.symbols()[slot as usize];
        if len == 0 { return Err(Error::UnknownSymbol); }
        self.bits.write_bits(code, len)?;
        self.closed = false;
        Ok(len)
    }

    /// Writes all `symbols` followed by [`EOF`] and returns the number of bits written.
    pub fn write_all<I>(&mut self, symbols: I) -> Result<u64> where I: IntoIterator, I::Item: Borrow<u32> {
        let mut total = 0;
        for symbol in symbols {
            total += self.write_symbol(*symbol.borrow())? as u64;
        }
        Ok(total + self.write_symbol(EOF)? as u64)
    }

    /// Pads the final partial byte with zeros and flushes the stream.
    /// Does nothing if nothing was written since the previous call.
    pub fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.bits.flush(false)?;
            self.closed = true;
        }
        Ok(())
    }

    /// Returns the encoder used.
    #[inline] pub fn encoder(&self) -> &'e Encoder { self.encoder }

    /// Returns reference to the underlying bit stream.
    #[inline] pub fn get_ref(&self) -> &B { &self.bits }
}

impl<'e, B: BitWrite> Drop for Writer<'e, B> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;
    use std::collections::HashMap;
    use std::io;

    /// Transport whose first write fails.
    struct FailingOnce<'a> {
        output: &'a mut Vec<u8>,
        failed: bool
    }

    impl Write for FailingOnce<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(io::ErrorKind::BrokenPipe.into());
            }
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn single_symbol() {
        let encoder = Encoder::new(&[5]).unwrap();
        assert_eq!(encoder.symbol_len(0), 1);
        assert_eq!(encoder.symbol_len(EOF), 1);
        assert_eq!(encoder.symbol_len(1), 1);   // slot of EOF
        assert_eq!(encoder.eof_slot(), 1);
        let mut out = Vec::new();
        let mut writer = encoder.writer(&mut out);
        assert_eq!(writer.write_symbol(0).unwrap(), 1);
        assert_eq!(writer.write_symbol(EOF).unwrap(), 1);
        assert_eq!(writer.get_ref().bits_written(), 2);
        writer.close().unwrap();
        drop(writer);
        assert_eq!(out, [0b0100_0000]);
    }

    #[test]
    fn codes_3sym() {
        let encoder = Encoder::new(&[100, 50, 10]).unwrap();
        let codes: HashMap<u32, (u64, u32)> = [0, 1, 2, EOF].into_iter()
            .map(|s| { let c = encoder.code(s).unwrap(); (s, (c.code, c.len)) }).collect();
        assert_eq!(codes, hashmap!(
            0 => (0b0, 1),
            1 => (0b10, 2),
            2 => (0b110, 3),
            EOF => (0b111, 3)
        ));
        assert_eq!(encoder.encoded_bits(&[100, 50, 10]), 100 + 2*50 + 3*10 + 3);
    }

    #[test]
    fn symbol_len_outside_alphabet() {
        let encoder = Encoder::new(&[3, 0, 4]).unwrap();
        assert_eq!(encoder.symbol_len(1), 0);
        assert_eq!(encoder.symbol_len(4), 0);
        assert_eq!(encoder.symbol_len(EOF - 1), 0);
        assert_eq!(encoder.code(1), None);
        assert_eq!(encoder.alphabet_len(), 3);
    }

    #[test]
    fn unknown_symbol_writes_nothing() {
        let encoder = Encoder::new(&[3, 0, 4]).unwrap();
        let mut out = Vec::new();
        {
            let mut writer = encoder.writer(&mut out);
            assert!(matches!(writer.write_symbol(4), Err(Error::UnknownSymbol)));
            assert!(matches!(writer.write_symbol(1), Err(Error::UnknownSymbol)));
            assert_eq!(writer.get_ref().bits_written(), 0);
        }
        assert!(out.is_empty());
    }

    #[test]
    fn close_is_idempotent() {
        let encoder = Encoder::new(&[1, 1, 1]).unwrap();
        let mut out = Vec::new();
        let mut writer = encoder.writer(&mut out);
        assert_eq!(writer.write_all([0u32, 1, 2]).unwrap(), 8);
        writer.close().unwrap();
        writer.close().unwrap();
        drop(writer);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn stream_error_propagated() {
        // all 4 symbols have 2-bit codes, so every 4th symbol completes a byte
        let encoder = Encoder::new(&[1, 1, 1]).unwrap();
        let mut out = Vec::new();
        {
            let mut writer = encoder.writer(FailingOnce { output: &mut out, failed: false });
            for symbol in [0, 1, 2] { writer.write_symbol(symbol).unwrap(); }
            match writer.write_symbol(0) {
                Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
                other => panic!("expected stream error, got {:?}", other)
            }
            assert_eq!(writer.get_ref().bits_written(), 6);
            writer.write_all([2u32, 1, 0]).unwrap();
            writer.close().unwrap();
            writer.close().unwrap();
        }
        let decoded = encoder.decoder().read_all(&mut crate::BitReader::new(&out[..])).unwrap();
        assert_eq!(decoded, [2, 1, 0]);
    }

    #[test]
    fn drop_closes() {
        let encoder = Encoder::new(&[9, 1]).unwrap();
        let mut out = Vec::new();
        encoder.writer(&mut out).write_symbol(0).unwrap();
        assert_eq!(out, [0]);
    }

    #[test]
    fn from_symbols() {
        let encoder = Encoder::from_symbols([2u32, 2, 2, 0]).unwrap();
        assert_eq!(encoder.alphabet_len(), 3);
        assert_eq!(encoder.symbol_len(2), 1);
        assert_eq!(encoder.symbol_len(0), 2);
        assert_eq!(encoder.symbol_len(1), 0);
    }

    #[test]
    fn empty_alphabet() {
        assert!(matches!(Encoder::new(&[]), Err(Error::EmptyAlphabet)));
        assert!(matches!(Encoder::new(&[0, 0, 0]), Err(Error::EmptyAlphabet)));
    }

    #[test]
    fn size_bytes() {
        let encoder = Encoder::new(&[1, 2, 3]).unwrap();
        assert!(encoder.size_bytes() > 4 * std::mem::size_of::<Symbol>());
    }
}

//! Bit-granular streams over byte-oriented transports.
//!
//! Bits are ordered from the most significant bit of each byte.
//! [`BitWriter`] and [`BitReader`] are backed by big-endian `bitstream_io` streams.

use std::io::{self, Read, Write};

use bitstream_io::{BigEndian, BitRead as _, BitWrite as _};

/// Sink of bits.
pub trait BitWrite {
    /// Writes a single `bit`.
    fn write_bit(&mut self, bit: bool) -> io::Result<()>;

    /// Writes `len` (at most 64) lowest bits of `value`, the most significant of them first.
    fn write_bits(&mut self, value: u64, len: u32) -> io::Result<()> {
        for shift in (0..len).rev() {
            self.write_bit((value >> shift) & 1 != 0)?;
        }
        Ok(())
    }

    /// Completes the final partial byte with `pad` bits and flushes the transport.
    fn flush(&mut self, pad: bool) -> io::Result<()>;
}

/// Source of bits.
pub trait BitRead {
    /// Reads a single bit. Reports [`io::ErrorKind::UnexpectedEof`] at the end of the transport.
    fn read_bit(&mut self) -> io::Result<bool>;
}

impl<B: BitWrite + ?Sized> BitWrite for &mut B {
    #[inline] fn write_bit(&mut self, bit: bool) -> io::Result<()> { (**self).write_bit(bit) }
    #[inline] fn write_bits(&mut self, value: u64, len: u32) -> io::Result<()> { (**self).write_bits(value, len) }
    #[inline] fn flush(&mut self, pad: bool) -> io::Result<()> { (**self).flush(pad) }
}

impl<B: BitRead + ?Sized> BitRead for &mut B {
    #[inline] fn read_bit(&mut self) -> io::Result<bool> { (**self).read_bit() }
}

/// [`BitWrite`] that packs bits into bytes written to `W`.
///
/// A byte whose write to `W` fails is dropped; the following bits start a new byte.
pub struct BitWriter<W: Write> {
    bits: bitstream_io::BitWriter<W, BigEndian>,
    written: u64
}

impl<W: Write> BitWriter<W> {
    pub fn new(output: W) -> Self {
        Self { bits: bitstream_io::BitWriter::endian(output, BigEndian), written: 0 }
    }

    /// Returns the number of bits successfully accepted so far, padding excluded.
    #[inline] pub fn bits_written(&self) -> u64 { self.written }

    /// Returns the underlying transport. Pending bits that were not flushed are lost.
    #[inline] pub fn into_inner(self) -> W { self.bits.into_writer() }
}

impl<W: Write> BitWrite for BitWriter<W> {
    fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.bits.write_bit(bit)?;
        self.written += 1;
        Ok(())
    }

    fn write_bits(&mut self, value: u64, len: u32) -> io::Result<()> {
        if len == 0 { return Ok(()); }
        let value = if len < 64 { value & ((1u64 << len) - 1) } else { value };
        self.bits.write(len, value)?;
        self.written += len as u64;
        Ok(())
    }

    fn flush(&mut self, pad: bool) -> io::Result<()> {
        if pad {
            while !self.bits.byte_aligned() { self.bits.write_bit(true)?; }
        }
        self.bits.byte_align()?;
        self.bits.flush()
    }
}

/// [`BitRead`] that unpacks bits from bytes read from `R`.
pub struct BitReader<R: Read> {
    bits: bitstream_io::BitReader<R, BigEndian>
}

impl<R: Read> BitReader<R> {
    pub fn new(input: R) -> Self {
        Self { bits: bitstream_io::BitReader::endian(input, BigEndian) }
    }

    /// Returns the underlying transport. Unread bits of the current byte are lost.
    #[inline] pub fn into_inner(self) -> R { self.bits.into_reader() }
}

impl<R: Read> BitRead for BitReader<R> {
    #[inline] fn read_bit(&mut self) -> io::Result<bool> { self.bits.read_bit() }
}

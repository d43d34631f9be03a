//! Utilities for working with [`bytes::Bytes`] and bit-level I/O.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

use std::io::{self, Read, Write};

use bytes::{Buf, Bytes};

mod cow;
pub mod zero_copy;

pub use cow::{BytesCow, StringCow};
pub use zero_copy::ZeroCopyReader;

/// Extension trait for extracting chunks of bytes out of an [`io::Cursor<Bytes>`]
/// without copying the underlying buffer.
pub trait BytesCursorExt {
    /// Extracts `size` bytes from the cursor, advancing its position.
    ///
    /// Returns an [`io::ErrorKind::UnexpectedEof`] error if fewer than `size` bytes remain.
    fn extract_bytes(&mut self, size: usize) -> io::Result<Bytes>;

    /// Extracts all remaining bytes from the cursor, advancing its position to the end.
    fn extract_remaining(&mut self) -> Bytes;

    /// Returns `true` if the cursor has any remaining bytes.
    fn has_remaining(&self) -> bool;
}

impl BytesCursorExt for io::Cursor<Bytes> {
    fn extract_bytes(&mut self, size: usize) -> io::Result<Bytes> {
        if (self.get_ref().len() as u64).saturating_sub(self.position()) < size as u64 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "not enough bytes remaining"));
        }

        let pos = self.position() as usize;
        let bytes = self.get_ref().slice(pos..pos + size);
        self.set_position((pos + size) as u64);

        Ok(bytes)
    }

    fn extract_remaining(&mut self) -> Bytes {
        let pos = self.position() as usize;
        let bytes = self.get_ref().slice(pos..);
        self.set_position(self.get_ref().len() as u64);

        bytes
    }

    fn has_remaining(&self) -> bool {
        self.position() < self.get_ref().len() as u64
    }
}

/// A bit-level reader over any [`io::Read`] implementation.
///
/// Bits are read most-significant-bit first, matching the bitstream conventions used by
/// H.264/H.265 exp-golomb-coded syntax elements.
pub struct BitReader<T> {
    inner: T,
    byte: u8,
    bit_pos: u8,
}

impl<T: io::Read> BitReader<T> {
    /// Creates a new [`BitReader`] wrapping the given reader.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            byte: 0,
            bit_pos: 8,
        }
    }
}

impl<'a> BitReader<io::Cursor<&'a [u8]>> {
    /// Creates a new [`BitReader`] directly from a byte slice.
    pub fn new_from_slice(data: &'a [u8]) -> Self {
        Self::new(io::Cursor::new(data))
    }
}

impl<T: io::Read> BitReader<T> {
    fn fill(&mut self) -> io::Result<()> {
        if self.bit_pos >= 8 {
            let mut buf = [0u8; 1];
            self.inner.read_exact(&mut buf)?;
            self.byte = buf[0];
            self.bit_pos = 0;
        }

        Ok(())
    }

    /// Reads a single bit.
    pub fn read_bit(&mut self) -> io::Result<bool> {
        self.fill()?;
        let bit = (self.byte >> (7 - self.bit_pos)) & 1 == 1;
        self.bit_pos += 1;
        Ok(bit)
    }

    /// Reads up to 64 bits into a [`u64`], most-significant-bit first.
    pub fn read_bits(&mut self, bits: u8) -> io::Result<u64> {
        let mut value = 0u64;

        for _ in 0..bits {
            value <<= 1;
            value |= self.read_bit()? as u64;
        }

        Ok(value)
    }

    /// Skips over the given number of bits without returning their value.
    pub fn seek_bits(&mut self, bits: u8) -> io::Result<()> {
        for _ in 0..bits {
            self.read_bit()?;
        }

        Ok(())
    }

    /// Returns `true` if the reader is currently sitting on a byte boundary.
    pub fn is_aligned(&self) -> bool {
        self.bit_pos == 8 || self.bit_pos == 0
    }

    /// Discards any partially-read byte, aligning the reader to the next byte boundary.
    pub fn align(&mut self) {
        self.bit_pos = 8;
    }

    /// Consumes the [`BitReader`], returning the underlying reader.
    ///
    /// If the reader is not currently aligned to a byte boundary the partially consumed byte is
    /// lost.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: io::Read> io::Read for BitReader<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.is_aligned() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "bit reader is not byte-aligned"));
        }

        self.inner.read(buf)
    }
}

impl BitReader<io::Cursor<Bytes>> {
    /// Returns the bytes remaining in the underlying cursor, starting at the current byte
    /// boundary.
    pub fn get_remaining(&self) -> Bytes {
        let pos = self.inner.position() as usize;
        self.inner.get_ref().slice(pos..)
    }
}

/// A bit-level writer that buffers partial bytes until they're complete, then forwards them to
/// the wrapped [`io::Write`] implementation.
pub struct BitWriter<T> {
    inner: T,
    byte: u8,
    bit_pos: u8,
}

impl<T> Default for BitWriter<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> BitWriter<T> {
    /// Creates a new [`BitWriter`] wrapping the given writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            byte: 0,
            bit_pos: 0,
        }
    }
}

impl<T: io::Write> BitWriter<T> {
    /// Writes a single bit.
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.byte |= 1 << (7 - self.bit_pos);
        }

        self.bit_pos += 1;

        if self.bit_pos == 8 {
            self.inner.write_all(&[self.byte])?;
            self.byte = 0;
            self.bit_pos = 0;
        }

        Ok(())
    }

    /// Writes the low `bits` bits of `value`, most-significant-bit first.
    pub fn write_bits(&mut self, value: u64, bits: u8) -> io::Result<()> {
        for i in (0..bits).rev() {
            self.write_bit((value >> i) & 1 == 1)?;
        }

        Ok(())
    }

    /// Pads the current byte with zero bits (if any are pending) and flushes it to the
    /// underlying writer, returning the writer.
    pub fn finish(mut self) -> io::Result<T> {
        if self.bit_pos != 0 {
            self.inner.write_all(&[self.byte])?;
            self.byte = 0;
            self.bit_pos = 0;
        }

        Ok(self.inner)
    }
}

impl<T: io::Write> io::Write for BitWriter<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.bit_pos != 0 {
            for &byte in buf {
                self.write_bits(byte as u64, 8)?;
            }

            return Ok(buf.len());
        }

        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl BitWriter<BytesMutWriter> {
    /// Creates a new [`BitWriter`] that accumulates into a fresh [`bytes::BytesMut`] buffer.
    pub fn new_bytes_mut() -> Self {
        Self::new(BytesMutWriter(bytes::BytesMut::new()))
    }

    /// Consumes the writer, returning the accumulated bytes.
    pub fn into_inner(self) -> bytes::BytesMut {
        self.finish().expect("writing to an in-memory buffer never fails").0
    }
}

/// A thin [`io::Write`] wrapper over [`bytes::BytesMut`].
pub struct BytesMutWriter(bytes::BytesMut);

impl io::Write for BytesMutWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io::Cursor;

    use bytes::Bytes;

    use super::*;

    #[test]
    fn test_extract_bytes() {
        let data = Bytes::from_static(b"hello world");
        let mut cursor = Cursor::new(data);

        let hello = cursor.extract_bytes(5).unwrap();
        assert_eq!(&hello[..], b"hello");

        let rest = cursor.extract_remaining();
        assert_eq!(&rest[..], b" world");
        assert!(!cursor.has_remaining());
    }

    #[test]
    fn test_extract_bytes_not_enough() {
        let data = Bytes::from_static(b"hi");
        let mut cursor = Cursor::new(data);
        assert!(cursor.extract_bytes(10).is_err());
    }

    #[test]
    fn test_bit_reader_roundtrip() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bit(true).unwrap();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0xAB, 8).unwrap();
        let buf = writer.finish().unwrap();

        let mut reader = BitReader::new_from_slice(&buf);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
    }

    #[test]
    fn test_bit_reader_alignment() {
        let mut reader = BitReader::new_from_slice(&[0xFF, 0x00]);
        assert!(reader.is_aligned());
        reader.read_bit().unwrap();
        assert!(!reader.is_aligned());
        reader.seek_bits(7).unwrap();
        assert!(reader.is_aligned());
    }
}

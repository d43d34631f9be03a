//! Exponential-Golomb coding, as used by H.264/H.265 bitstream syntax elements.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

use std::io;

use rtmplex_bytes_util::{BitReader, BitWriter};

/// Extension trait adding Exp-Golomb decoding to any [`BitReader`].
pub trait BitReaderExpGolombExt {
    /// Reads an unsigned Exp-Golomb coded value (`ue(v)`).
    fn read_exp_golomb(&mut self) -> io::Result<u64>;

    /// Reads a signed Exp-Golomb coded value (`se(v)`).
    fn read_signed_exp_golomb(&mut self) -> io::Result<i64>;
}

impl<T: io::Read> BitReaderExpGolombExt for BitReader<T> {
    fn read_exp_golomb(&mut self) -> io::Result<u64> {
        let mut leading_zeros = 0u32;

        while !self.read_bit()? {
            leading_zeros += 1;

            // A conforming bitstream can't have an arbitrarily long run of leading zero bits;
            // bail out rather than spin forever on corrupt input.
            if leading_zeros > 63 {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "exp-golomb prefix too long"));
            }
        }

        let mut result: u64 = 1;
        for _ in 0..leading_zeros {
            result <<= 1;
            result |= self.read_bit()? as u64;
        }

        Ok(result - 1)
    }

    fn read_signed_exp_golomb(&mut self) -> io::Result<i64> {
        let value = self.read_exp_golomb()?;

        if value % 2 == 0 {
            Ok(-((value / 2) as i64))
        } else {
            Ok((value / 2) as i64 + 1)
        }
    }
}

/// Extension trait adding Exp-Golomb encoding to any [`BitWriter`].
pub trait BitWriterExpGolombExt {
    /// Writes an unsigned Exp-Golomb coded value (`ue(v)`).
    fn write_exp_golomb(&mut self, value: u64) -> io::Result<()>;

    /// Writes a signed Exp-Golomb coded value (`se(v)`).
    fn write_signed_exp_golomb(&mut self, value: i64) -> io::Result<()>;
}

impl<T: io::Write> BitWriterExpGolombExt for BitWriter<T> {
    fn write_exp_golomb(&mut self, value: u64) -> io::Result<()> {
        let mut number = value + 1;
        let mut leading_zeros = 0u32;

        while number > 1 {
            number >>= 1;
            leading_zeros += 1;
        }

        for _ in 0..leading_zeros {
            self.write_bit(false)?;
        }

        self.write_bits(value + 1, (leading_zeros + 1) as u8)
    }

    fn write_signed_exp_golomb(&mut self, value: i64) -> io::Result<()> {
        let mapped = if value <= 0 {
            (-value) as u64 * 2
        } else {
            value as u64 * 2 - 1
        };

        self.write_exp_golomb(mapped)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use rtmplex_bytes_util::BitReader;

    use super::*;

    #[test]
    fn test_unsigned_roundtrip() {
        for value in [0u64, 1, 2, 5, 17, 255, 1000] {
            let mut writer = BitWriter::new(Vec::new());
            writer.write_exp_golomb(value).unwrap();
            let buf = writer.finish().unwrap();

            let mut reader = BitReader::new_from_slice(&buf);
            assert_eq!(reader.read_exp_golomb().unwrap(), value);
        }
    }

    #[test]
    fn test_signed_roundtrip() {
        for value in [0i64, 1, -1, 2, -2, 100, -100] {
            let mut writer = BitWriter::new(Vec::new());
            writer.write_signed_exp_golomb(value).unwrap();
            let buf = writer.finish().unwrap();

            let mut reader = BitReader::new_from_slice(&buf);
            assert_eq!(reader.read_signed_exp_golomb().unwrap(), value);
        }
    }

    #[test]
    fn test_known_encoding() {
        // ue(v) = 0 encodes to a single '1' bit.
        let mut writer = BitWriter::new(Vec::new());
        writer.write_exp_golomb(0).unwrap();
        let buf = writer.finish().unwrap();
        assert_eq!(buf[0] & 0b1000_0000, 0b1000_0000);
    }
}

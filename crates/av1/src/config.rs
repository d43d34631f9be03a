use std::io;

use bytes::Bytes;
use rtmplex_bytes_util::{BitReader, BitWriter, BytesCursorExt};

/// AV1 Codec Configuration Record.
///
/// <https://aomediacodec.github.io/av1-isobmff/#av1codecconfigurationbox-syntax>
#[derive(Debug, Clone, PartialEq)]
pub struct AV1CodecConfigurationRecord {
    /// Must be `1`.
    pub marker: bool,
    /// Must be `1` for this version of the record.
    pub version: u8,
    /// `seq_profile` from the AV1 sequence header.
    pub seq_profile: u8,
    /// `seq_level_idx[0]` from the AV1 sequence header.
    pub seq_level_idx_0: u8,
    /// `seq_tier[0]` from the AV1 sequence header.
    pub seq_tier_0: bool,
    /// `high_bitdepth` from the AV1 sequence header's color config.
    pub high_bitdepth: bool,
    /// `twelve_bit` from the AV1 sequence header's color config.
    pub twelve_bit: bool,
    /// `mono_chrome` from the AV1 sequence header's color config.
    pub monochrome: bool,
    /// `subsampling_x` from the AV1 sequence header's color config.
    pub chroma_subsampling_x: bool,
    /// `subsampling_y` from the AV1 sequence header's color config.
    pub chroma_subsampling_y: bool,
    /// `chroma_sample_position` from the AV1 sequence header's color config.
    pub chroma_sample_position: u8,
    /// The initial presentation delay, if signalled by the encoder.
    pub initial_presentation_delay_minus_one: Option<u8>,
    /// The raw `ConfigOBUs` byte range (typically a sequence header OBU, optionally followed by
    /// metadata OBUs). This is stored verbatim rather than parsed into individual OBUs: the only
    /// consumer of this record needs the byte range intact for handing off to a decoder, not the
    /// parsed OBU structure.
    pub config_obu: Bytes,
}

impl AV1CodecConfigurationRecord {
    /// Parses an [`AV1CodecConfigurationRecord`] out of its binary representation.
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> io::Result<Self> {
        let mut bit_reader = BitReader::new(io::Cursor::new(reader.extract_remaining()));

        let marker = bit_reader.read_bit()?;
        let version = bit_reader.read_bits(7)? as u8;

        let seq_profile = bit_reader.read_bits(3)? as u8;
        let seq_level_idx_0 = bit_reader.read_bits(5)? as u8;

        let seq_tier_0 = bit_reader.read_bit()?;
        let high_bitdepth = bit_reader.read_bit()?;
        let twelve_bit = bit_reader.read_bit()?;
        let monochrome = bit_reader.read_bit()?;
        let chroma_subsampling_x = bit_reader.read_bit()?;
        let chroma_subsampling_y = bit_reader.read_bit()?;
        let chroma_sample_position = bit_reader.read_bits(2)? as u8;

        bit_reader.seek_bits(3)?; // reserved

        let initial_presentation_delay_minus_one = if bit_reader.read_bit()? {
            Some(bit_reader.read_bits(4)? as u8)
        } else {
            bit_reader.seek_bits(4)?; // reserved
            None
        };

        if !bit_reader.is_aligned() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "AV1 config header is not byte-aligned"));
        }

        let config_obu = bit_reader.get_remaining();

        Ok(Self {
            marker,
            version,
            seq_profile,
            seq_level_idx_0,
            seq_tier_0,
            high_bitdepth,
            twelve_bit,
            monochrome,
            chroma_subsampling_x,
            chroma_subsampling_y,
            chroma_sample_position,
            initial_presentation_delay_minus_one,
            config_obu,
        })
    }

    /// Returns the total byte size the record would occupy when muxed.
    pub fn size(&self) -> u64 {
        4 + self.config_obu.len() as u64
    }

    /// Serializes this record to its binary representation.
    pub fn mux<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        let mut bit_writer = BitWriter::new(writer);

        bit_writer.write_bit(self.marker)?;
        bit_writer.write_bits(self.version as u64, 7)?;

        bit_writer.write_bits(self.seq_profile as u64, 3)?;
        bit_writer.write_bits(self.seq_level_idx_0 as u64, 5)?;

        bit_writer.write_bit(self.seq_tier_0)?;
        bit_writer.write_bit(self.high_bitdepth)?;
        bit_writer.write_bit(self.twelve_bit)?;
        bit_writer.write_bit(self.monochrome)?;
        bit_writer.write_bit(self.chroma_subsampling_x)?;
        bit_writer.write_bit(self.chroma_subsampling_y)?;
        bit_writer.write_bits(self.chroma_sample_position as u64, 2)?;

        bit_writer.write_bits(0, 3)?; // reserved

        if let Some(delay) = self.initial_presentation_delay_minus_one {
            bit_writer.write_bit(true)?;
            bit_writer.write_bits(delay as u64, 4)?;
        } else {
            bit_writer.write_bit(false)?;
            bit_writer.write_bits(0, 4)?; // reserved
        }

        let writer = bit_writer.finish()?;
        writer.write_all(&self.config_obu)?;

        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn sample() -> AV1CodecConfigurationRecord {
        AV1CodecConfigurationRecord {
            marker: true,
            version: 1,
            seq_profile: 0,
            seq_level_idx_0: 5,
            seq_tier_0: false,
            high_bitdepth: false,
            twelve_bit: false,
            monochrome: false,
            chroma_subsampling_x: true,
            chroma_subsampling_y: true,
            chroma_sample_position: 0,
            initial_presentation_delay_minus_one: Some(7),
            config_obu: Bytes::from_static(b"\x0a\x0b\x00\x00\x00\x24"),
        }
    }

    #[test]
    fn test_mux_demux_roundtrip() {
        let config = sample();

        let mut buf = Vec::new();
        config.mux(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, config.size());

        let demuxed = AV1CodecConfigurationRecord::demux(&mut io::Cursor::new(Bytes::from(buf))).unwrap();
        assert_eq!(demuxed, config);
    }

    #[test]
    fn test_no_presentation_delay() {
        let mut config = sample();
        config.initial_presentation_delay_minus_one = None;

        let mut buf = Vec::new();
        config.mux(&mut buf).unwrap();

        let demuxed = AV1CodecConfigurationRecord::demux(&mut io::Cursor::new(Bytes::from(buf))).unwrap();
        assert_eq!(demuxed.initial_presentation_delay_minus_one, None);
    }
}

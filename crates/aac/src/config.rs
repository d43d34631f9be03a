use std::io;

use bytes::Bytes;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use rtmplex_bytes_util::{BitReader, BitWriter};

/// MPEG-4 Audio Specific Config.
///
/// ISO/IEC 14496-3:2019(E) - 1.6
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSpecificConfig {
    /// The type of audio object encoded.
    pub audio_object_type: AudioObjectType,
    /// The sampling frequency, in Hz.
    pub sampling_frequency: u32,
    /// The channel configuration. `0` means the channel configuration is not specified here and
    /// is carried by the stream's program config element instead.
    pub channel_configuration: u8,
    /// The remaining (unparsed) decoder-specific bits, after the fields above. Rarely needed: the
    /// fields we expose cover everything an RTMP publisher/subscriber cares about.
    pub data: Bytes,
}

/// The audio object type (profile) of an AAC stream.
///
/// ISO/IEC 14496-3:2019(E) - 1.5.1.2.6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioObjectType {
    /// AAC Main.
    AacMain,
    /// AAC Low Complexity (LC), the profile almost every encoder actually emits.
    AacLowComplexity,
    /// Any object type not specifically modeled above.
    Unknown(u16),
}

impl From<u16> for AudioObjectType {
    fn from(value: u16) -> Self {
        match value {
            1 => AudioObjectType::AacMain,
            2 => AudioObjectType::AacLowComplexity,
            _ => AudioObjectType::Unknown(value),
        }
    }
}

impl From<AudioObjectType> for u16 {
    fn from(value: AudioObjectType) -> Self {
        match value {
            AudioObjectType::AacMain => 1,
            AudioObjectType::AacLowComplexity => 2,
            AudioObjectType::Unknown(value) => value,
        }
    }
}

/// Sampling Frequency Index.
///
/// ISO/IEC 14496-3:2019(E) - 1.6.2.4 (Table 1.22)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum SampleFrequencyIndex {
    /// 96000 Hz.
    Freq96000 = 0x0,
    /// 88200 Hz.
    Freq88200 = 0x1,
    /// 64000 Hz.
    Freq64000 = 0x2,
    /// 48000 Hz.
    Freq48000 = 0x3,
    /// 44100 Hz.
    Freq44100 = 0x4,
    /// 32000 Hz.
    Freq32000 = 0x5,
    /// 24000 Hz.
    Freq24000 = 0x6,
    /// 22050 Hz.
    Freq22050 = 0x7,
    /// 16000 Hz.
    Freq16000 = 0x8,
    /// 12000 Hz.
    Freq12000 = 0x9,
    /// 11025 Hz.
    Freq11025 = 0xA,
    /// 8000 Hz.
    Freq8000 = 0xB,
    /// 7350 Hz.
    Freq7350 = 0xC,
    /// Reserved.
    FreqReserved = 0xD,
    /// Reserved.
    FreqReserved2 = 0xE,
    /// The actual frequency is carried explicitly in the next 24 bits.
    FreqEscape = 0xF,
}

impl SampleFrequencyIndex {
    /// Returns the frequency in Hz this index represents, or `0` for the reserved/escape values.
    pub fn to_freq(&self) -> u32 {
        match self {
            SampleFrequencyIndex::Freq96000 => 96000,
            SampleFrequencyIndex::Freq88200 => 88200,
            SampleFrequencyIndex::Freq64000 => 64000,
            SampleFrequencyIndex::Freq48000 => 48000,
            SampleFrequencyIndex::Freq44100 => 44100,
            SampleFrequencyIndex::Freq32000 => 32000,
            SampleFrequencyIndex::Freq24000 => 24000,
            SampleFrequencyIndex::Freq22050 => 22050,
            SampleFrequencyIndex::Freq16000 => 16000,
            SampleFrequencyIndex::Freq12000 => 12000,
            SampleFrequencyIndex::Freq11025 => 11025,
            SampleFrequencyIndex::Freq8000 => 8000,
            SampleFrequencyIndex::Freq7350 => 7350,
            SampleFrequencyIndex::FreqReserved | SampleFrequencyIndex::FreqReserved2 | SampleFrequencyIndex::FreqEscape => 0,
        }
    }

    /// Finds the table index matching a given frequency in Hz, falling back to
    /// [`SampleFrequencyIndex::FreqEscape`] for any frequency not in the table.
    pub fn from_freq(freq: u32) -> Self {
        match freq {
            96000 => SampleFrequencyIndex::Freq96000,
            88200 => SampleFrequencyIndex::Freq88200,
            64000 => SampleFrequencyIndex::Freq64000,
            48000 => SampleFrequencyIndex::Freq48000,
            44100 => SampleFrequencyIndex::Freq44100,
            32000 => SampleFrequencyIndex::Freq32000,
            24000 => SampleFrequencyIndex::Freq24000,
            22050 => SampleFrequencyIndex::Freq22050,
            16000 => SampleFrequencyIndex::Freq16000,
            12000 => SampleFrequencyIndex::Freq12000,
            11025 => SampleFrequencyIndex::Freq11025,
            8000 => SampleFrequencyIndex::Freq8000,
            7350 => SampleFrequencyIndex::Freq7350,
            _ => SampleFrequencyIndex::FreqEscape,
        }
    }
}

impl AudioSpecificConfig {
    /// Parses an [`AudioSpecificConfig`] from its raw bytes, as carried in the RTMP/FLV
    /// `AACAudioSpecificConfig` sequence header packet.
    pub fn parse(data: Bytes) -> io::Result<Self> {
        let mut bit_reader = BitReader::new(std::io::Cursor::new(data));

        let mut audio_object_type = bit_reader.read_bits(5)? as u16;
        if audio_object_type == 31 {
            audio_object_type = 32 + bit_reader.read_bits(6)? as u16;
        }

        let sampling_frequency_index = SampleFrequencyIndex::from_u8(bit_reader.read_bits(4)? as u8)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "invalid sampling frequency index"))?;

        let sampling_frequency = match sampling_frequency_index {
            SampleFrequencyIndex::FreqEscape => bit_reader.read_bits(24)? as u32,
            _ => sampling_frequency_index.to_freq(),
        };

        let channel_configuration = bit_reader.read_bits(4)? as u8;

        Ok(Self {
            audio_object_type: audio_object_type.into(),
            sampling_frequency,
            channel_configuration,
            data: bit_reader.get_remaining(),
        })
    }

    /// Returns the total byte size this config would occupy when muxed.
    pub fn size(&self) -> u64 {
        let object_type: u16 = self.audio_object_type.into();
        let object_type_bits: u64 = if object_type >= 32 { 11 } else { 5 };

        let freq_index = SampleFrequencyIndex::from_freq(self.sampling_frequency);
        let freq_bits: u64 = if matches!(freq_index, SampleFrequencyIndex::FreqEscape) { 28 } else { 4 };

        (object_type_bits + freq_bits + 4).div_ceil(8) + self.data.len() as u64
    }

    /// Serializes this config to its binary representation.
    pub fn mux<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        let mut bit_writer = BitWriter::new(writer);

        let object_type: u16 = self.audio_object_type.into();
        if object_type >= 32 {
            bit_writer.write_bits(31, 5)?;
            bit_writer.write_bits((object_type - 32) as u64, 6)?;
        } else {
            bit_writer.write_bits(object_type as u64, 5)?;
        }

        let freq_index = SampleFrequencyIndex::from_freq(self.sampling_frequency);
        bit_writer.write_bits(freq_index as u64, 4)?;
        if matches!(freq_index, SampleFrequencyIndex::FreqEscape) {
            bit_writer.write_bits(self.sampling_frequency as u64, 24)?;
        }

        bit_writer.write_bits(self.channel_configuration as u64, 4)?;

        let writer = bit_writer.finish()?;
        writer.write_all(&self.data)?;

        Ok(())
    }
}

//! FLV AAC audio data types as defined in the legacy FLV spec.

use bytes::Bytes;
use nutype_enum::nutype_enum;

nutype_enum! {
    /// FLV `AACPacketType`
    ///
    /// Indicates the type of data in [`AacAudioData`].
    ///
    /// Defined by:
    /// - Legacy FLV spec, Annex E.4.2.1
    pub enum AacPacketType(u8) {
        /// Sequence Header
        SequenceHeader = 0,
        /// Raw
        Raw = 1,
    }
}

/// FLV `AACAUDIODATA`
///
/// This is a container for AAC data.
/// This enum contains the data for the different types of AAC packets.
///
/// Defined by:
/// - Legacy FLV spec, Annex E.4.2.2
#[derive(Debug, Clone, PartialEq)]
pub enum AacAudioData {
    /// AAC Sequence Header
    SequenceHeader(Bytes),
    /// AAC Raw
    Raw(Bytes),
    /// Data we don't know how to parse
    Unknown {
        /// The type of AAC packet
        aac_packet_type: AacPacketType,
        /// The data in the packet
        data: Bytes,
    },
}

impl AacAudioData {
    /// Create a new AAC packet from the given data and packet type.
    pub fn new(aac_packet_type: AacPacketType, data: Bytes) -> Self {
        match aac_packet_type {
            AacPacketType::Raw => AacAudioData::Raw(data),
            AacPacketType::SequenceHeader => AacAudioData::SequenceHeader(data),
            _ => AacAudioData::Unknown { aac_packet_type, data },
        }
    }
}

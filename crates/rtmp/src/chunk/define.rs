//! Chunk header and basic type definitions.

use bytes::Bytes;

use crate::messages::MessageType;

/// Chunk stream id reserved for protocol control messages and commands.
///
/// Defined by:
/// - Legacy RTMP spec, 3.1
pub const CHUNK_STREAM_ID_COMMAND: u32 = 3;

/// Chunk stream id conventionally used for audio data.
pub const CHUNK_STREAM_ID_AUDIO: u32 = 4;

/// Chunk stream id conventionally used for video data.
pub const CHUNK_STREAM_ID_VIDEO: u32 = 5;

/// A chunk type represents the format of the chunk header.
///
/// Defined by:
/// - Legacy RTMP spec, 5.3.1.2
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
pub enum ChunkType {
    /// Chunk type 0 - 5.3.1.2.1
    Type0 = 0,
    /// Chunk type 1 - 5.3.1.2.2
    Type1 = 1,
    /// Chunk type 2 - 5.3.1.2.3
    Type2 = 2,
    /// Chunk type 3 - 5.3.1.1.4
    Type3 = 3,
}

impl ChunkType {
    /// The 2-bit format field always fits one of the four variants.
    pub(super) fn from_byte(byte: u8) -> Self {
        match byte & 0b11 {
            0 => Self::Type0,
            1 => Self::Type1,
            2 => Self::Type2,
            _ => Self::Type3,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChunkBasicHeader {
    /// Only used while reading the header.
    pub(super) format: ChunkType,

    /// 6 bits (if format == 0, 8 bits, if format == 1, 16 bits).
    pub chunk_stream_id: u32,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChunkMessageHeader {
    /// 3 bytes. When writing, if the timestamp is >= 0xFFFFFF, 0xFFFFFF is written instead
    /// and the real value is carried in the extended timestamp field.
    pub timestamp: u32,
    /// 3 bytes.
    pub msg_length: u32,
    /// 1 byte.
    pub msg_type_id: MessageType,
    /// 4 bytes, little-endian.
    pub msg_stream_id: u32,

    /// Only used while reading the header.
    pub(super) was_extended_timestamp: bool,
}

impl ChunkMessageHeader {
    /// Returns true if the timestamp needs to be carried in the extended timestamp field.
    #[inline]
    pub fn is_extended_timestamp(&self) -> bool {
        self.timestamp >= 0xFFFFFF
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Chunk {
    pub basic_header: ChunkBasicHeader,
    pub message_header: ChunkMessageHeader,
    pub payload: Bytes,
}

impl Chunk {
    /// Helper function to create a new chunk, always encoded with a full (Type0) header.
    pub fn new(chunk_stream_id: u32, timestamp: u32, msg_type_id: MessageType, msg_stream_id: u32, payload: Bytes) -> Self {
        Self {
            basic_header: ChunkBasicHeader {
                chunk_stream_id,
                format: ChunkType::Type0,
            },
            message_header: ChunkMessageHeader {
                timestamp,
                msg_length: payload.len() as u32,
                msg_type_id,
                msg_stream_id,
                was_extended_timestamp: false,
            },
            payload,
        }
    }
}

/// The default chunk size is 128 bytes.
///
/// Legacy RTMP spec, 5.4.1: "The maximum chunk size defaults to 128 bytes ..."
pub const INIT_CHUNK_SIZE: usize = 128;

/// Not part of the spec, but we refuse to honor a peer's requested chunk size above this.
pub const MAX_CHUNK_SIZE: usize = 4096 * 16;

/// The chunk size we request of our peer once the handshake finishes, and the size of the
/// read buffer reservations while draining the socket.
pub const CHUNK_SIZE: usize = 4096;

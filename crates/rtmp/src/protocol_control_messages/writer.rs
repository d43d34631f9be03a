//! Writing protocol control messages.

use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Bytes;

use super::{
    ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth,
    ProtocolControlMessageWindowAcknowledgementSize,
};
use crate::chunk::Chunk;
use crate::chunk::writer::ChunkWriter;
use crate::messages::MessageType;

impl ProtocolControlMessageSetChunkSize {
    /// Writes the [`ProtocolControlMessageSetChunkSize`] to the given writer.
    pub fn write(&self, io: &mut impl io::Write, writer: &ChunkWriter) -> Result<(), crate::error::RtmpError> {
        // According to spec the first bit must be 0.
        let chunk_size = self.chunk_size & 0x7FFFFFFF; // 31 bits only

        writer.write_chunk(
            io,
            Chunk::new(
                2, // chunk stream must be 2
                0, // timestamps are ignored
                MessageType::SetChunkSize,
                0, // message stream id is ignored
                Bytes::from(chunk_size.to_be_bytes().to_vec()),
            ),
        )?;

        Ok(())
    }
}

impl ProtocolControlMessageAcknowledgement {
    /// Writes the [`ProtocolControlMessageAcknowledgement`] to the given writer.
    pub fn write(&self, io: &mut impl io::Write, writer: &ChunkWriter) -> Result<(), crate::error::RtmpError> {
        writer.write_chunk(
            io,
            Chunk::new(
                2, // chunk stream must be 2
                0, // timestamps are ignored
                MessageType::Acknowledgement,
                0, // message stream id is ignored
                Bytes::from(self.sequence_number.to_be_bytes().to_vec()),
            ),
        )?;

        Ok(())
    }
}

impl ProtocolControlMessageWindowAcknowledgementSize {
    /// Writes the [`ProtocolControlMessageWindowAcknowledgementSize`] to the given writer.
    pub fn write(&self, io: &mut impl io::Write, writer: &ChunkWriter) -> Result<(), crate::error::RtmpError> {
        writer.write_chunk(
            io,
            Chunk::new(
                2, // chunk stream must be 2
                0, // timestamps are ignored
                MessageType::WindowAcknowledgementSize,
                0, // message stream id is ignored
                Bytes::from(self.acknowledgement_window_size.to_be_bytes().to_vec()),
            ),
        )?;

        Ok(())
    }
}

impl ProtocolControlMessageSetPeerBandwidth {
    /// Writes the [`ProtocolControlMessageSetPeerBandwidth`] to the given writer.
    pub fn write(&self, io: &mut impl io::Write, writer: &ChunkWriter) -> Result<(), crate::error::RtmpError> {
        let mut data = Vec::new();
        data.write_u32::<BigEndian>(self.acknowledgement_window_size)
            .expect("Failed to write window size");
        data.write_u8(self.limit_type as u8).expect("Failed to write limit type");

        writer.write_chunk(
            io,
            Chunk::new(
                2, // chunk stream must be 2
                0, // timestamps are ignored
                MessageType::SetPeerBandwidth,
                0, // message stream id is ignored
                Bytes::from(data),
            ),
        )?;

        Ok(())
    }
}

use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use super::{EventMessagePingResponse, EventMessageSetBufferLength, EventMessageStreamBegin, EventMessageStreamIsRecorded, EventType};
use crate::chunk::{Chunk, ChunkWriter};
use crate::messages::MessageType;

impl EventMessageStreamBegin {
    pub fn write(&self, writer: &ChunkWriter, io: &mut impl io::Write) -> io::Result<()> {
        let mut data = Vec::new();

        data.write_u16::<BigEndian>(EventType::StreamBegin.0).expect("write u16");
        data.write_u32::<BigEndian>(self.stream_id).expect("write u32");

        writer.write_chunk(io, Chunk::new(0x02, 0, MessageType::UserControlEvent, 0, data.into()))?;

        Ok(())
    }
}

impl EventMessageStreamIsRecorded {
    pub fn write(&self, writer: &ChunkWriter, io: &mut impl io::Write) -> io::Result<()> {
        let mut data = Vec::new();

        data.write_u16::<BigEndian>(EventType::StreamIsRecorded.0).expect("write u16");
        data.write_u32::<BigEndian>(self.stream_id).expect("write u32");

        writer.write_chunk(io, Chunk::new(0x02, 0, MessageType::UserControlEvent, 0, data.into()))?;

        Ok(())
    }
}

impl EventMessageSetBufferLength {
    pub fn write(&self, writer: &ChunkWriter, io: &mut impl io::Write) -> io::Result<()> {
        let mut data = Vec::new();

        data.write_u16::<BigEndian>(EventType::SetBufferLength.0).expect("write u16");
        data.write_u32::<BigEndian>(self.stream_id).expect("write u32");
        data.write_u32::<BigEndian>(self.buffer_length_ms).expect("write u32");

        writer.write_chunk(io, Chunk::new(0x02, 0, MessageType::UserControlEvent, 0, data.into()))?;

        Ok(())
    }
}

impl EventMessagePingResponse {
    pub fn write(&self, writer: &ChunkWriter, io: &mut impl io::Write) -> io::Result<()> {
        let mut data = Vec::new();

        data.write_u16::<BigEndian>(EventType::PingResponse.0).expect("write u16");
        data.write_u32::<BigEndian>(self.timestamp).expect("write u32");

        writer.write_chunk(io, Chunk::new(0x02, 0, MessageType::UserControlEvent, 0, data.into()))?;

        Ok(())
    }
}

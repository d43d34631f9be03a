//! Writing [`MessageData`].

use std::io;

use super::MessageData;
use crate::chunk::writer::ChunkWriter;
use crate::chunk::{CHUNK_STREAM_ID_AUDIO, CHUNK_STREAM_ID_COMMAND, CHUNK_STREAM_ID_VIDEO, Chunk};

impl MessageData<'_> {
    /// Writes the data-carrying variants of a [`MessageData`] back onto the wire.
    ///
    /// This is used by the track relay path (forwarding a publisher's audio/video/metadata
    /// straight through to subscribers) rather than by command/control-message senders, which
    /// write through their own dedicated `write` methods. Variants that never originate from
    /// relayed track data (`SetChunkSize`, `SetAcknowledgementWindowSize`, `Amf0Command`) are
    /// silently skipped, matching [`crate::command_messages::Command::write`]'s handling of
    /// commands it can't send.
    pub fn write(&self, io: &mut impl io::Write, writer: &ChunkWriter, timestamp: u32, msg_stream_id: u32) -> io::Result<()> {
        match self {
            Self::AudioData { data } => writer.write_chunk(
                io,
                Chunk::new(CHUNK_STREAM_ID_AUDIO, timestamp, super::MessageType::Audio, msg_stream_id, data.clone()),
            ),
            Self::VideoData { data } => writer.write_chunk(
                io,
                Chunk::new(CHUNK_STREAM_ID_VIDEO, timestamp, super::MessageType::Video, msg_stream_id, data.clone()),
            ),
            Self::DataAmf0 { data } => writer.write_chunk(
                io,
                Chunk::new(
                    CHUNK_STREAM_ID_COMMAND,
                    timestamp,
                    super::MessageType::DataAMF0,
                    msg_stream_id,
                    data.clone(),
                ),
            ),
            Self::Other { msg_type_id, data } => writer.write_chunk(
                io,
                Chunk::new(CHUNK_STREAM_ID_COMMAND, timestamp, *msg_type_id, msg_stream_id, data.clone()),
            ),
            Self::SetChunkSize(_) | Self::SetAcknowledgementWindowSize(_) | Self::Acknowledgement(_) | Self::Amf0Command(_) => {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::chunk::reader::ChunkReader;
    use crate::messages::MessageType;

    #[test]
    fn writes_audio_data_on_the_audio_chunk_stream() {
        let writer = ChunkWriter::default();
        let mut buf = Vec::new();

        let message = MessageData::AudioData {
            data: vec![0xAF, 0x01].into(),
        };
        message.write(&mut buf, &writer, 10, 1).unwrap();

        let mut reader = ChunkReader::default();
        let mut read_buf = BytesMut::from(&buf[..]);
        let chunk = reader.read_chunk(&mut read_buf).unwrap().unwrap();

        assert_eq!(chunk.basic_header.chunk_stream_id, CHUNK_STREAM_ID_AUDIO);
        assert_eq!(chunk.message_header.msg_type_id, MessageType::Audio);
        assert_eq!(chunk.message_header.msg_stream_id, 1);
        assert_eq!(chunk.payload, vec![0xAF, 0x01]);
    }

    #[test]
    fn skips_variants_that_are_never_relayed() {
        let writer = ChunkWriter::default();
        let mut buf = Vec::new();

        MessageData::SetChunkSize(crate::protocol_control_messages::ProtocolControlMessageSetChunkSize { chunk_size: 4096 })
            .write(&mut buf, &writer, 0, 0)
            .unwrap();

        assert!(buf.is_empty());
    }
}

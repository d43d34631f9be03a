//! Reading [`MessageData`].

use super::{MessageData, MessageType};
use crate::chunk::Chunk;
use crate::command_messages::Command;
use crate::protocol_control_messages::{
    ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize, ProtocolControlMessageWindowAcknowledgementSize,
};
use crate::user_control_messages::EventType;

impl MessageData<'_> {
    /// Reads [`MessageData`] from the given chunk.
    ///
    /// Message types that this implementation does not act on (abort, set peer bandwidth, AMF3
    /// variants, shared objects, aggregates, and user control events other than `PingRequest`)
    /// are returned as [`MessageData::Other`] with their raw payload intact.
    pub fn read(chunk: &Chunk) -> Result<Self, crate::error::RtmpError> {
        match chunk.message_header.msg_type_id {
            MessageType::SetChunkSize => {
                let data = ProtocolControlMessageSetChunkSize::read(&chunk.payload)?;
                Ok(Self::SetChunkSize(data))
            }
            MessageType::WindowAcknowledgementSize => {
                let data = ProtocolControlMessageWindowAcknowledgementSize::read(&chunk.payload)?;
                Ok(Self::SetAcknowledgementWindowSize(data))
            }
            MessageType::Acknowledgement => {
                let data = ProtocolControlMessageAcknowledgement::read(&chunk.payload)?;
                Ok(Self::Acknowledgement(data))
            }
            MessageType::Audio => Ok(Self::AudioData {
                data: chunk.payload.clone(),
            }),
            MessageType::Video => Ok(Self::VideoData {
                data: chunk.payload.clone(),
            }),
            MessageType::DataAMF0 => Ok(Self::DataAmf0 {
                data: chunk.payload.clone(),
            }),
            MessageType::CommandAMF0 => Ok(Self::Amf0Command(Command::read(chunk.payload.clone())?)),
            MessageType::UserControlEvent if chunk.payload.len() >= 6 => {
                let event_type = u16::from_be_bytes([chunk.payload[0], chunk.payload[1]]);
                if event_type == EventType::PingRequest.0 {
                    let timestamp = u32::from_be_bytes([
                        chunk.payload[2],
                        chunk.payload[3],
                        chunk.payload[4],
                        chunk.payload[5],
                    ]);
                    Ok(Self::UserControlPingRequest { timestamp })
                } else {
                    Ok(Self::Other {
                        msg_type_id: chunk.message_header.msg_type_id,
                        data: chunk.payload.clone(),
                    })
                }
            }
            msg_type_id => Ok(Self::Other {
                msg_type_id,
                data: chunk.payload.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use bytes::Bytes;
    use rtmplex_amf0::encoder::Amf0Encoder;
    use rtmplex_amf0::{Amf0Object, Amf0Value};

    use super::*;
    use crate::command_messages::CommandType;
    use crate::command_messages::netconnection::NetConnectionCommand;

    #[test]
    fn test_parse_command() {
        let mut buf = Vec::new();
        let mut encoder = Amf0Encoder::new(&mut buf);

        encoder.encode_string("connect").unwrap();
        encoder.encode_number(1.0).unwrap();
        let object: Amf0Object = [("app".into(), Amf0Value::String("testapp".into()))].into_iter().collect();
        encoder.encode_object(&object).unwrap();

        let amf_data = Bytes::from(buf);

        let chunk = Chunk::new(0, 0, MessageType::CommandAMF0, 0, amf_data);

        let message = MessageData::read(&chunk).expect("no errors");
        match message {
            MessageData::Amf0Command(command) => {
                let Command {
                    transaction_id,
                    command_type,
                } = command;
                assert_eq!(transaction_id, 1.0);

                let CommandType::NetConnection(NetConnectionCommand::Connect(connect)) = command_type else {
                    panic!("wrong command");
                };

                assert_eq!(connect.app, "testapp");
            }
            _ => unreachable!("wrong message type"),
        }
    }

    #[test]
    fn test_parse_audio_packet() {
        let chunk = Chunk::new(0, 0, MessageType::Audio, 0, vec![0x00, 0x00, 0x00, 0x00].into());

        let message = MessageData::read(&chunk).expect("no errors");
        match message {
            MessageData::AudioData { data } => {
                assert_eq!(data, vec![0x00, 0x00, 0x00, 0x00]);
            }
            _ => unreachable!("wrong message type"),
        }
    }

    #[test]
    fn test_parse_video_packet() {
        let chunk = Chunk::new(0, 0, MessageType::Video, 0, vec![0x00, 0x00, 0x00, 0x00].into());

        let message = MessageData::read(&chunk).expect("no errors");
        match message {
            MessageData::VideoData { data } => {
                assert_eq!(data, vec![0x00, 0x00, 0x00, 0x00]);
            }
            _ => unreachable!("wrong message type"),
        }
    }

    #[test]
    fn test_parse_set_chunk_size() {
        let chunk = Chunk::new(0, 0, MessageType::SetChunkSize, 0, vec![0x00, 0xFF, 0xFF, 0xFF].into());

        let message = MessageData::read(&chunk).expect("no errors");
        match message {
            MessageData::SetChunkSize(ProtocolControlMessageSetChunkSize { chunk_size }) => {
                assert_eq!(chunk_size, 0x00FFFFFF);
            }
            _ => unreachable!("wrong message type"),
        }
    }

    #[test]
    fn test_parse_window_acknowledgement_size() {
        let chunk = Chunk::new(
            0,
            0,
            MessageType::WindowAcknowledgementSize,
            0,
            vec![0x00, 0xFF, 0xFF, 0xFF].into(),
        );

        let message = MessageData::read(&chunk).expect("no errors");
        match message {
            MessageData::SetAcknowledgementWindowSize(ProtocolControlMessageWindowAcknowledgementSize {
                acknowledgement_window_size,
            }) => {
                assert_eq!(acknowledgement_window_size, 0x00FFFFFF);
            }
            _ => unreachable!("wrong message type"),
        }
    }

    #[test]
    fn test_parse_metadata() {
        let mut buf = Vec::new();

        let mut encoder = Amf0Encoder::new(&mut buf);
        encoder.encode_string("onMetaData").unwrap();
        let object: Amf0Object = [("duration".into(), Amf0Value::Number(0.0))].into_iter().collect();
        encoder.encode_object(&object).unwrap();

        let amf_data = Bytes::from(buf);
        let chunk = Chunk::new(0, 0, MessageType::DataAMF0, 0, amf_data.clone());

        let message = MessageData::read(&chunk).expect("no errors");
        match message {
            MessageData::DataAmf0 { data } => {
                assert_eq!(data, amf_data);
            }
            _ => unreachable!("wrong message type"),
        }
    }

    #[test]
    fn test_parse_acknowledgement() {
        let chunk = Chunk::new(0, 0, MessageType::Acknowledgement, 0, vec![0x00, 0xFF, 0xFF, 0xFF].into());

        let message = MessageData::read(&chunk).expect("no errors");
        match message {
            MessageData::Acknowledgement(ProtocolControlMessageAcknowledgement { sequence_number }) => {
                assert_eq!(sequence_number, 0x00FFFFFF);
            }
            _ => unreachable!("wrong message type"),
        }
    }

    #[test]
    fn test_parse_ping_request() {
        let mut data = vec![0x00, 0x06]; // EventType::PingRequest
        data.extend_from_slice(&0x1234_5678u32.to_be_bytes());
        let chunk = Chunk::new(0x02, 0, MessageType::UserControlEvent, 0, data.into());

        match MessageData::read(&chunk).expect("no errors") {
            MessageData::UserControlPingRequest { timestamp } => {
                assert_eq!(timestamp, 0x1234_5678);
            }
            _ => unreachable!("wrong message type"),
        }
    }

    #[test]
    fn test_other_user_control_events_are_preserved_as_other() {
        let data = vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x01]; // StreamBegin
        let chunk = Chunk::new(0x02, 0, MessageType::UserControlEvent, 0, data.clone().into());

        match MessageData::read(&chunk).expect("no errors") {
            MessageData::Other { msg_type_id, data: payload } => {
                assert_eq!(msg_type_id, MessageType::UserControlEvent);
                assert_eq!(payload, data);
            }
            _ => unreachable!("wrong message type"),
        }
    }

    #[test]
    fn test_unsupported_message_type_is_preserved_as_other() {
        let chunk = Chunk::new(0, 0, MessageType(42), 0, vec![0x00, 0x00, 0x00, 0x00].into());

        match MessageData::read(&chunk).expect("no errors") {
            MessageData::Other { msg_type_id, data } => {
                assert_eq!(msg_type_id, MessageType(42));
                assert_eq!(data, vec![0x00, 0x00, 0x00, 0x00]);
            }
            _ => unreachable!("wrong message type"),
        }
    }
}

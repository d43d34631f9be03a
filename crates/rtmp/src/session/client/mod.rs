//! RTMP client-publisher session.
//!
//! Drives the handshake and command sequence a real encoder performs against this server: it
//! doesn't implement anything the server side doesn't already parse or emit, it just drives the
//! conversation from the other end.

use std::borrow::Cow;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use rtmplex_amf0::Amf0Value;
use rtmplex_bytes_util::{BytesCursorExt, StringCow};
use rtmplex_future_ext::FutureExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::chunk::CHUNK_SIZE;
use crate::chunk::reader::ChunkReader;
use crate::chunk::writer::ChunkWriter;
use crate::command_messages::netconnection::{NetConnectionCommand, NetConnectionCommandConnect};
use crate::command_messages::netstream::{NetStreamCommand, NetStreamCommandPublishPublishingType};
use crate::command_messages::{Command, CommandType, UnknownCommand};
use crate::error::RtmpError;
use crate::handshake::SimpleHandshakeClient;
use crate::messages::MessageData;
use crate::protocol_control_messages::{
    ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize, ProtocolControlMessageWindowAcknowledgementSize,
};
use crate::track::{self, Tracks};
use crate::user_control_messages::{EventMessagePingResponse, EventMessageSetBufferLength};

mod error;

pub use error::ClientSessionError;

/// Data read back from the server by a [`ClientSession::play`] subscriber session.
#[derive(Debug, Clone)]
pub enum ClientSessionData {
    /// Video data (usually FLV `VIDEODATA`).
    Video {
        /// The video data.
        data: Bytes,
    },
    /// Audio data (usually FLV `AUDIODATA`).
    Audio {
        /// The audio data.
        data: Bytes,
    },
    /// AMF0 metadata (e.g. `onMetaData`).
    Amf0 {
        /// The metadata.
        data: Bytes,
    },
}

/// A RTMP client session acting as a publisher or subscriber: it connects, creates a stream,
/// then either publishes it ([`Self::publish`]) and pushes audio/video/metadata messages to the
/// server, or plays it ([`Self::play`]) and reads them back via [`Self::read_data`].
pub struct ClientSession<S> {
    io: S,
    read_buf: BytesMut,
    write_buf: Vec<u8>,
    chunk_reader: ChunkReader,
    chunk_writer: ChunkWriter,
    next_transaction_id: f64,
    stream_id: u32,
    /// Number of bytes written to the peer so far, wrapping at `u32::MAX` (§4.1/§4.4).
    bytes_written: u32,
    /// The last `sequence_number` we've seen in a peer `Acknowledgement`.
    last_ack_received: u32,
    /// The window-ack size the peer advertised via `SetWindowAckSize`/`SetPeerBandwidth`, if any.
    peer_window_ack_size: Option<u32>,
}

impl<S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin> ClientSession<S> {
    /// Performs the handshake, connects to `app`, creates a stream and publishes `stream_key`
    /// as a live stream, returning a session ready to have track data pushed to it.
    pub async fn publish(io: S, app: impl Into<Cow<'static, str>>, stream_key: impl Into<Cow<'static, str>>) -> Result<Self, RtmpError> {
        let mut session = Self {
            io,
            read_buf: BytesMut::new(),
            write_buf: Vec::new(),
            chunk_reader: ChunkReader::default(),
            chunk_writer: ChunkWriter::default(),
            next_transaction_id: 1.0,
            stream_id: 0,
            bytes_written: 0,
            last_ack_received: 0,
            peer_window_ack_size: None,
        };

        let stream_key = stream_key.into();

        session.drive_handshake().await?;
        session.send_set_chunk_size().await?;
        session.connect(app.into()).await?;
        // §4.9 step 3 / §8 Scenario 2: `releaseStream` and `FCPublish` precede `createStream`
        // when publishing. Neither expects a reply.
        session.release_stream(stream_key.clone()).await?;
        session.fc_publish(stream_key.clone()).await?;
        session.create_stream().await?;
        session.publish_stream(stream_key).await?;

        Ok(session)
    }

    /// Performs the handshake, connects to `app`, creates a stream and `play`s `stream_key`,
    /// returning a session ready to have [`Self::read_data`] called in a loop. §4.9's
    /// client-subscriber sequence: `connect`, `createStream` (cmd id 2), `SetBufferLength`
    /// (100ms), `play` (cmd id 3), expecting `onStatus NetStream.Play.Start`.
    pub async fn play(io: S, app: impl Into<Cow<'static, str>>, stream_key: impl Into<Cow<'static, str>>) -> Result<Self, RtmpError> {
        let mut session = Self {
            io,
            read_buf: BytesMut::new(),
            write_buf: Vec::new(),
            chunk_reader: ChunkReader::default(),
            chunk_writer: ChunkWriter::default(),
            next_transaction_id: 1.0,
            stream_id: 0,
            bytes_written: 0,
            last_ack_received: 0,
            peer_window_ack_size: None,
        };

        session.drive_handshake().await?;
        session.send_set_chunk_size().await?;
        session.connect(app.into()).await?;
        session.create_stream().await?;
        session.play_stream(stream_key.into()).await?;

        Ok(session)
    }

    /// ID of the stream that was created with [`Self::publish`]/[`Self::play`].
    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    /// Reads the next audio, video or metadata message the server sends on a [`Self::play`]
    /// session, blocking until one arrives. Protocol control messages (`SetChunkSize`, window-ack
    /// size, `Acknowledgement`) are handled transparently and never returned here.
    pub async fn read_data(&mut self) -> Result<ClientSessionData, RtmpError> {
        self.wait_for(|msg| {
            Ok(match msg {
                MessageData::VideoData { data } => Some(ClientSessionData::Video { data }),
                MessageData::AudioData { data } => Some(ClientSessionData::Audio { data }),
                MessageData::DataAmf0 { data } => Some(ClientSessionData::Amf0 { data }),
                _ => None,
            })
        })
        .await
    }

    /// Pushes a video message (usually FLV `VIDEODATA`) to the server.
    pub async fn write_video(&mut self, timestamp: u32, data: Bytes) -> Result<(), RtmpError> {
        self.check_flow_control().await?;
        MessageData::VideoData { data }.write(&mut self.write_buf, &self.chunk_writer, timestamp, self.stream_id)?;
        self.flush().await
    }

    /// Pushes an audio message (usually FLV `AUDIODATA`) to the server.
    pub async fn write_audio(&mut self, timestamp: u32, data: Bytes) -> Result<(), RtmpError> {
        self.check_flow_control().await?;
        MessageData::AudioData { data }.write(&mut self.write_buf, &self.chunk_writer, timestamp, self.stream_id)?;
        self.flush().await
    }

    /// Pushes an AMF0 metadata message (e.g. `@setDataFrame onMetaData`) to the server.
    pub async fn write_metadata(&mut self, timestamp: u32, data: Bytes) -> Result<(), RtmpError> {
        self.check_flow_control().await?;
        MessageData::DataAmf0 { data }.write(&mut self.write_buf, &self.chunk_writer, timestamp, self.stream_id)?;
        self.flush().await
    }

    /// Enforces §4.4's outgoing window-ack rule: opportunistically drains any `Acknowledgement`
    /// the peer has already sent without blocking, then fails if the peer hasn't kept up with the
    /// window it advertised. Comparison is modular (mod 2^32) so the 32-bit byte counters wrap
    /// the same way the reader's do.
    async fn check_flow_control(&mut self) -> Result<(), RtmpError> {
        self.drain_acknowledgements().await?;

        if let Some(window) = self.peer_window_ack_size {
            let diff = self.bytes_written.wrapping_sub(self.last_ack_received);
            if diff > window {
                return Err(ClientSessionError::FlowControlStalled.into());
            }
        }

        Ok(())
    }

    /// Reads and processes any messages the peer has already sent without blocking for more to
    /// arrive, so that `Acknowledgement`s sitting in the socket buffer are reflected in
    /// `last_ack_received` before a stall check. A zero-duration timeout around the read makes
    /// this a non-blocking poll: `with_timeout` always polls the inner read once before checking
    /// the deadline, so already-buffered bytes are still picked up.
    async fn drain_acknowledgements(&mut self) -> Result<(), RtmpError> {
        loop {
            while let Some(chunk) = self.chunk_reader.read_chunk(&mut self.read_buf)? {
                let msg = MessageData::read(&chunk)?;
                self.handle_control_message(&msg)?;
            }

            self.flush().await?;
            self.read_buf.reserve(CHUNK_SIZE);

            match self.io.read_buf(&mut self.read_buf).with_timeout(Duration::ZERO).await {
                Ok(Ok(0)) => return Err(ClientSessionError::ConnectionClosed.into()),
                Ok(Ok(_)) => continue,
                Ok(Err(err)) => return Err(err.into()),
                Err(_elapsed) => return Ok(()), // nothing buffered right now, don't block waiting for more
            }
        }
    }

    /// Handles a protocol control message transparently, the way §4.5 describes. Returns `true`
    /// if `msg` was one of these and has already been dealt with.
    fn handle_control_message(&mut self, msg: &MessageData<'_>) -> Result<bool, RtmpError> {
        match msg {
            MessageData::SetChunkSize(ProtocolControlMessageSetChunkSize { chunk_size }) => {
                if !self.chunk_reader.update_max_chunk_size(*chunk_size as usize) {
                    return Err(ClientSessionError::InvalidChunkSize(*chunk_size as usize).into());
                }
                Ok(true)
            }
            MessageData::SetAcknowledgementWindowSize(ProtocolControlMessageWindowAcknowledgementSize {
                acknowledgement_window_size,
            }) => {
                self.peer_window_ack_size = Some(*acknowledgement_window_size);
                Ok(true)
            }
            MessageData::Acknowledgement(ProtocolControlMessageAcknowledgement { sequence_number }) => {
                self.last_ack_received = *sequence_number;
                Ok(true)
            }
            MessageData::UserControlPingRequest { timestamp } => {
                EventMessagePingResponse { timestamp: *timestamp }.write(&self.chunk_writer, &mut self.write_buf)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Announces `tracks` per §4.8: an `@setDataFrame`/`onMetaData` message, then whichever of
    /// an AVC video sequence header and an AAC audio sequence header the tracks support.
    pub async fn publish_tracks(&mut self, timestamp: u32, tracks: &Tracks) -> Result<(), RtmpError> {
        let (metadata, video, audio) = track::write_tracks(tracks)?;

        self.write_metadata(timestamp, metadata).await?;

        if let Some(video) = video {
            self.write_video(timestamp, video).await?;
        }

        if let Some(audio) = audio {
            self.write_audio(timestamp, audio).await?;
        }

        Ok(())
    }

    /// Cleanly stops publishing by sending `deleteStream` and flushing it to the server.
    pub async fn stop(mut self) -> Result<(), RtmpError> {
        let transaction_id = self.next_transaction_id();
        let stream_id = self.stream_id as f64;

        Command {
            command_type: CommandType::NetStream(NetStreamCommand::DeleteStream { stream_id }),
            transaction_id,
        }
        .write_client(&mut self.write_buf, &self.chunk_writer)?;

        self.flush().await
    }

    fn next_transaction_id(&mut self) -> f64 {
        let id = self.next_transaction_id;
        self.next_transaction_id += 1.0;
        id
    }

    async fn drive_handshake(&mut self) -> Result<(), RtmpError> {
        let mut handshaker = SimpleHandshakeClient::default();

        while !handshaker.is_finished() {
            let needed = handshaker.bytes_needed();

            while self.read_buf.len() < needed {
                self.read_buf.reserve(needed - self.read_buf.len());

                let n = self
                    .io
                    .read_buf(&mut self.read_buf)
                    .with_timeout(Duration::from_secs(5))
                    .await
                    .map_err(ClientSessionError::Timeout)??;

                if n == 0 {
                    return Err(ClientSessionError::ConnectionClosed.into());
                }
            }

            let mut cursor = std::io::Cursor::new(self.read_buf.split().freeze());
            handshaker.handshake(&mut cursor, &mut self.write_buf)?;

            let over_read = cursor.extract_remaining();
            if !over_read.is_empty() {
                self.read_buf.extend_from_slice(&over_read);
            }

            self.flush().await?;
        }

        Ok(())
    }

    async fn send_set_chunk_size(&mut self) -> Result<(), RtmpError> {
        ProtocolControlMessageSetChunkSize {
            chunk_size: CHUNK_SIZE as u32,
        }
        .write(&mut self.write_buf, &self.chunk_writer)?;
        self.chunk_writer.set_chunk_size(CHUNK_SIZE);

        self.flush().await
    }

    async fn connect(&mut self, app: Cow<'static, str>) -> Result<(), RtmpError> {
        let transaction_id = self.next_transaction_id();

        Command {
            command_type: CommandType::NetConnection(NetConnectionCommand::Connect(NetConnectionCommandConnect {
                app,
                caps_ex: None,
                others: Cow::Owned(Vec::new()),
            })),
            transaction_id,
        }
        .write_client(&mut self.write_buf, &self.chunk_writer)?;

        self.flush().await?;

        self.wait_for(|msg| {
            let Some(unknown) = as_unknown_command(&msg) else {
                return Ok(None);
            };

            if unknown.command_name.as_str() != "_result" && unknown.command_name.as_str() != "_error" {
                return Ok(None);
            }

            let (level, code, description) = unknown.values.get(1).map(status_fields).unwrap_or_default();

            if unknown.command_name.as_str() == "_error" || level == Some("error") {
                return Err(ClientSessionError::ConnectRejected {
                    code: code.unwrap_or_default().to_string(),
                    description: description.unwrap_or_default().to_string(),
                }
                .into());
            }

            Ok(Some(()))
        })
        .await
    }

    async fn create_stream(&mut self) -> Result<(), RtmpError> {
        let transaction_id = self.next_transaction_id();

        Command {
            command_type: CommandType::NetConnection(NetConnectionCommand::CreateStream),
            transaction_id,
        }
        .write_client(&mut self.write_buf, &self.chunk_writer)?;

        self.flush().await?;

        let stream_id = self
            .wait_for(|msg| {
                let Some(unknown) = as_unknown_command(&msg) else {
                    return Ok(None);
                };

                if unknown.command_name.as_str() != "_result" {
                    return Ok(None);
                }

                let stream_id = unknown.values.get(1).and_then(amf0_as_number).unwrap_or(0.0);

                Ok(Some(stream_id as u32))
            })
            .await?;

        self.stream_id = stream_id;

        Ok(())
    }

    /// `releaseStream`: asks the server to free up `stream_key` from any stale publisher. No
    /// reply is expected (§4.9 step 3).
    async fn release_stream(&mut self, stream_key: Cow<'static, str>) -> Result<(), RtmpError> {
        let transaction_id = self.next_transaction_id();

        Command {
            command_type: CommandType::NetConnection(NetConnectionCommand::ReleaseStream { stream_key }),
            transaction_id,
        }
        .write_client(&mut self.write_buf, &self.chunk_writer)?;

        self.flush().await
    }

    /// `FCPublish`: legacy companion to `releaseStream` sent right before `createStream`. No
    /// reply is expected (§4.9 step 3).
    async fn fc_publish(&mut self, stream_key: Cow<'static, str>) -> Result<(), RtmpError> {
        let transaction_id = self.next_transaction_id();

        Command {
            command_type: CommandType::NetConnection(NetConnectionCommand::FcPublish { stream_key }),
            transaction_id,
        }
        .write_client(&mut self.write_buf, &self.chunk_writer)?;

        self.flush().await
    }

    async fn publish_stream(&mut self, stream_key: Cow<'static, str>) -> Result<(), RtmpError> {
        let transaction_id = self.next_transaction_id();

        Command {
            command_type: CommandType::NetStream(NetStreamCommand::Publish {
                publishing_name: StringCow::from(stream_key),
                publishing_type: NetStreamCommandPublishPublishingType::Live,
            }),
            transaction_id,
        }
        .write_client(&mut self.write_buf, &self.chunk_writer)?;

        self.flush().await?;

        self.wait_for(|msg| {
            let Some(unknown) = as_unknown_command(&msg) else {
                return Ok(None);
            };

            if unknown.command_name.as_str() != "onStatus" {
                return Ok(None);
            }

            let (level, code, description) = unknown.values.get(1).map(status_fields).unwrap_or_default();

            if level == Some("error") {
                return Err(ClientSessionError::PublishRejected {
                    code: code.unwrap_or_default().to_string(),
                    description: description.unwrap_or_default().to_string(),
                }
                .into());
            }

            Ok(Some(()))
        })
        .await
    }

    async fn play_stream(&mut self, stream_key: Cow<'static, str>) -> Result<(), RtmpError> {
        EventMessageSetBufferLength {
            stream_id: self.stream_id,
            buffer_length_ms: 100,
        }
        .write(&self.chunk_writer, &mut self.write_buf)?;

        let transaction_id = self.next_transaction_id();

        Command {
            command_type: CommandType::NetStream(NetStreamCommand::Play {
                values: vec![Amf0Value::String(StringCow::from(stream_key))],
            }),
            transaction_id,
        }
        .write_client(&mut self.write_buf, &self.chunk_writer)?;

        self.flush().await?;

        self.wait_for(|msg| {
            let Some(unknown) = as_unknown_command(&msg) else {
                return Ok(None);
            };

            if unknown.command_name.as_str() != "onStatus" {
                return Ok(None);
            }

            let (level, code, description) = unknown.values.get(1).map(status_fields).unwrap_or_default();

            if level == Some("error") {
                return Err(ClientSessionError::PlayRejected {
                    code: code.unwrap_or_default().to_string(),
                    description: description.unwrap_or_default().to_string(),
                }
                .into());
            }

            // §4.9: the server replies with several onStatus messages for one `play` (Reset,
            // Start, Data.Start, PublishNotify) — only `Play.Start` confirms playback began.
            if code == Some(crate::command_messages::on_status::codes::NET_STREAM_PLAY_START) {
                Ok(Some(()))
            } else {
                Ok(None)
            }
        })
        .await
    }

    /// Reads chunks, handing each decoded message to `f`, until `f` returns `Some`.
    ///
    /// `SetChunkSize`, window-ack size and `Acknowledgement` messages are handled transparently
    /// regardless of what `f` does with them, per §4.5 ("the message reader/writer also ...").
    async fn wait_for<T>(&mut self, mut f: impl for<'a> FnMut(MessageData<'a>) -> Result<Option<T>, RtmpError>) -> Result<T, RtmpError> {
        loop {
            while let Some(chunk) = self.chunk_reader.read_chunk(&mut self.read_buf)? {
                let msg = MessageData::read(&chunk)?;

                if self.handle_control_message(&msg)? {
                    self.flush().await?;
                    continue;
                }

                if let Some(result) = f(msg)? {
                    return Ok(result);
                }
            }

            self.read_buf.reserve(CHUNK_SIZE);

            let n = self
                .io
                .read_buf(&mut self.read_buf)
                .with_timeout(Duration::from_secs(5))
                .await
                .map_err(ClientSessionError::Timeout)??;

            if n == 0 {
                return Err(ClientSessionError::ConnectionClosed.into());
            }
        }
    }

    async fn flush(&mut self) -> Result<(), RtmpError> {
        if !self.write_buf.is_empty() {
            self.io
                .write_all(self.write_buf.as_ref())
                .with_timeout(Duration::from_secs(2))
                .await
                .map_err(ClientSessionError::Timeout)??;
            self.bytes_written = self.bytes_written.wrapping_add(self.write_buf.len() as u32);
            self.write_buf.clear();
        }

        Ok(())
    }
}

fn as_unknown_command<'a, 'b>(msg: &'b MessageData<'a>) -> Option<&'b UnknownCommand<'a>> {
    match msg {
        MessageData::Amf0Command(Command {
            command_type: CommandType::Unknown(unknown),
            ..
        }) => Some(unknown),
        _ => None,
    }
}

fn amf0_object_field<'a>(object: &'a rtmplex_amf0::Amf0Object<'a>, key: &str) -> Option<&'a Amf0Value<'a>> {
    object.iter().find(|(k, _)| k.as_str() == key).map(|(_, v)| v)
}

fn amf0_as_str(value: &Amf0Value<'_>) -> Option<&str> {
    match value {
        Amf0Value::String(s) => Some(s.as_str()),
        _ => None,
    }
}

fn amf0_as_number(value: &Amf0Value<'_>) -> Option<f64> {
    match value {
        Amf0Value::Number(n) => Some(*n),
        _ => None,
    }
}

/// Extracts `(level, code, description)` out of an onStatus/`_result`/`_error` info object.
fn status_fields<'a>(info: &'a Amf0Value<'a>) -> (Option<&'a str>, Option<&'a str>, Option<&'a str>) {
    let Amf0Value::Object(object) = info else {
        return (None, None, None);
    };

    (
        amf0_object_field(object, "level").and_then(amf0_as_str),
        amf0_object_field(object, "code").and_then(amf0_as_str),
        amf0_object_field(object, "description").and_then(amf0_as_str),
    )
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    /// A session wired to one end of an in-memory duplex pipe. The other end is kept alive for
    /// the caller's duration so that a non-blocking drain sees "no data yet" rather than EOF.
    fn test_session() -> (ClientSession<tokio::io::DuplexStream>, tokio::io::DuplexStream) {
        let (io, peer) = tokio::io::duplex(4096);

        (
            ClientSession {
                io,
                read_buf: BytesMut::new(),
                write_buf: Vec::new(),
                chunk_reader: ChunkReader::default(),
                chunk_writer: ChunkWriter::default(),
                next_transaction_id: 1.0,
                stream_id: 1,
                bytes_written: 0,
                last_ack_received: 0,
                peer_window_ack_size: None,
            },
            peer,
        )
    }

    #[tokio::test]
    async fn flow_control_passes_without_a_peer_advertised_window() {
        let (mut session, _peer) = test_session();
        session.bytes_written = 1_000_000;
        assert!(session.check_flow_control().await.is_ok());
    }

    #[tokio::test]
    async fn flow_control_passes_within_the_window() {
        let (mut session, _peer) = test_session();
        session.peer_window_ack_size = Some(1000);
        session.bytes_written = 900;
        assert!(session.check_flow_control().await.is_ok());
    }

    #[tokio::test]
    async fn flow_control_stalls_once_the_window_is_exhausted() {
        let (mut session, _peer) = test_session();
        session.peer_window_ack_size = Some(1000);
        session.bytes_written = 2000;

        let err = session.check_flow_control().await.unwrap_err();
        assert!(matches!(err, RtmpError::ClientSession(ClientSessionError::FlowControlStalled)));
    }

    /// Testable property 4 (window-ack wrap-around): stall detection near the `u32` boundary
    /// behaves identically to the zero-origin case.
    #[tokio::test]
    async fn flow_control_stall_detection_survives_the_u32_wraparound() {
        let (mut session, _peer) = test_session();
        session.peer_window_ack_size = Some(1000);
        session.last_ack_received = 4_294_967_096;
        session.bytes_written = 4_294_967_096u32.wrapping_add(2000);

        let err = session.check_flow_control().await.unwrap_err();
        assert!(matches!(err, RtmpError::ClientSession(ClientSessionError::FlowControlStalled)));
    }

    #[tokio::test]
    async fn handle_control_message_records_acknowledgement() {
        let (mut session, _peer) = test_session();
        session.peer_window_ack_size = Some(1000);
        session.bytes_written = 2000;

        let handled = session
            .handle_control_message(&MessageData::Acknowledgement(
                crate::protocol_control_messages::ProtocolControlMessageAcknowledgement { sequence_number: 1500 },
            ))
            .unwrap();
        assert!(handled);

        assert!(session.check_flow_control().await.is_ok());
    }
}

//! Writing [`Command`].

use std::fmt::Display;
use std::io;

use bytes::{BufMut, Bytes, BytesMut};

use super::error::CommandError;
use super::{Command, CommandResultLevel, CommandType};
use crate::chunk::writer::ChunkWriter;
use crate::chunk::{CHUNK_STREAM_ID_COMMAND, Chunk};
use crate::error::RtmpError;
use crate::messages::MessageType;

impl AsRef<str> for CommandResultLevel {
    fn as_ref(&self) -> &str {
        match self {
            CommandResultLevel::Warning => "warning",
            CommandResultLevel::Status => "status",
            CommandResultLevel::Error => "error",
            CommandResultLevel::Unknown(s) => s,
        }
    }
}

impl Display for CommandResultLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandResultLevel::Warning => write!(f, "warning"),
            CommandResultLevel::Status => write!(f, "status"),
            CommandResultLevel::Error => write!(f, "error"),
            CommandResultLevel::Unknown(s) => write!(f, "{s}"),
        }
    }
}

impl Command<'_> {
    fn write_amf0_chunk(io: &mut impl io::Write, writer: &ChunkWriter, payload: Bytes) -> io::Result<()> {
        writer.write_chunk(
            io,
            Chunk::new(CHUNK_STREAM_ID_COMMAND, 0, MessageType::CommandAMF0, 0, payload),
        )
    }

    /// Writes a [`Command`] to the given writer.
    ///
    /// Skips unknown commands.
    pub fn write(self, io: &mut impl io::Write, writer: &ChunkWriter) -> Result<(), RtmpError> {
        let mut buf = BytesMut::new();
        let mut buf_writer = (&mut buf).writer();

        match self.command_type {
            CommandType::NetConnection(command) => {
                command.write(&mut buf_writer, self.transaction_id)?;
            }
            CommandType::NetStream(_) => {
                return Err(RtmpError::from(CommandError::NoClientImplementation));
            }
            CommandType::OnStatus(command) => {
                command.write(&mut buf_writer, self.transaction_id)?;
            }
            // don't write unknown commands
            CommandType::Unknown { .. } => {}
        }

        Self::write_amf0_chunk(io, writer, buf.freeze())?;

        Ok(())
    }

    /// Writes the variants of a [`Command`] that a client, rather than a server, sends.
    pub fn write_client(self, io: &mut impl io::Write, writer: &ChunkWriter) -> Result<(), RtmpError> {
        let mut buf = BytesMut::new();
        let mut buf_writer = (&mut buf).writer();

        match self.command_type {
            CommandType::NetConnection(command) => {
                command.write_client(&mut buf_writer, self.transaction_id)?;
            }
            CommandType::NetStream(command) => {
                command.write_client(&mut buf_writer, self.transaction_id)?;
            }
            CommandType::OnStatus(_) => {
                return Err(RtmpError::from(CommandError::NoServerImplementation));
            }
            // don't write unknown commands
            CommandType::Unknown { .. } => {}
        }

        Self::write_amf0_chunk(io, writer, buf.freeze())?;

        Ok(())
    }
}

//! Writing [`NetStreamCommand`].
//!
//! Only the variants a client sends are implemented: the server never originates a
//! `NetStreamCommand`, it only reads the ones the client sends (see
//! [`NetStreamCommand::read`](super::NetStreamCommand::read)).

use std::io;

use rtmplex_amf0::encoder::Amf0Encoder;
use serde::Serialize;

use super::NetStreamCommand;
use crate::command_messages::error::CommandError;

impl NetStreamCommand<'_> {
    /// Writes a [`NetStreamCommand`] that a client sends to the given writer.
    pub fn write_client(&self, buf: &mut impl io::Write, transaction_id: f64) -> Result<(), CommandError> {
        let mut encoder = Amf0Encoder::new(buf);

        match self {
            Self::Publish {
                publishing_name,
                publishing_type,
            } => {
                encoder.encode_string("publish")?;
                encoder.encode_number(transaction_id)?;
                encoder.encode_null()?;
                encoder.encode_string(publishing_name.as_str())?;
                publishing_type.serialize(&mut encoder)?;
            }
            Self::DeleteStream { stream_id } => {
                encoder.encode_string("deleteStream")?;
                encoder.encode_number(transaction_id)?;
                encoder.encode_null()?;
                encoder.encode_number(*stream_id)?;
            }
            Self::CloseStream => {
                encoder.encode_string("closeStream")?;
                encoder.encode_number(transaction_id)?;
                encoder.encode_null()?;
            }
            Self::Play { values } => {
                encoder.encode_string("play")?;
                encoder.encode_number(transaction_id)?;
                encoder.encode_null()?;

                for value in values {
                    value.serialize(&mut encoder)?;
                }
            }
            Self::Play2 { .. } | Self::ReceiveAudio { .. } | Self::ReceiveVideo { .. } | Self::Seek { .. } | Self::Pause { .. } => {
                return Err(CommandError::PlaybackNotSupported);
            }
        }

        Ok(())
    }
}

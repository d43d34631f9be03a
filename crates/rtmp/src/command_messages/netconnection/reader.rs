//! Reading [`NetConnectionCommand`].

use bytes::Bytes;
use rtmplex_amf0::decoder::Amf0Decoder;
use rtmplex_bytes_util::zero_copy::BytesBuf;

use super::NetConnectionCommand;
use crate::command_messages::error::CommandError;

impl NetConnectionCommand<'_> {
    /// Reads a [`NetConnectionCommand`] from the given decoder.
    ///
    /// Returns `Ok(None)` if the `command_name` is not recognized.
    pub fn read(command_name: &str, decoder: &mut Amf0Decoder<BytesBuf<Bytes>>) -> Result<Option<Self>, CommandError> {
        match command_name {
            "connect" => {
                let command_object = decoder.deserialize()?;
                Ok(Some(Self::Connect(command_object)))
            }
            "call" => Ok(Some(Self::Call)),
            "close" => Ok(Some(Self::Close)),
            "createStream" => Ok(Some(Self::CreateStream)),
            _ => Ok(None),
        }
    }
}

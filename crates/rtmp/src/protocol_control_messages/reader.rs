//! Reading protocol control messages.

use std::io::{self, Cursor};

use byteorder::{BigEndian, ReadBytesExt};

use super::{
    ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize, ProtocolControlMessageWindowAcknowledgementSize,
};

impl ProtocolControlMessageSetChunkSize {
    /// Reads a [`ProtocolControlMessageSetChunkSize`] from the given data.
    pub fn read(data: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(data);
        let chunk_size = cursor.read_u32::<BigEndian>()?;

        Ok(Self { chunk_size })
    }
}

impl ProtocolControlMessageAcknowledgement {
    /// Reads a [`ProtocolControlMessageAcknowledgement`] from the given data.
    pub fn read(data: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(data);
        let sequence_number = cursor.read_u32::<BigEndian>()?;

        Ok(Self { sequence_number })
    }
}

impl ProtocolControlMessageWindowAcknowledgementSize {
    /// Reads a [`ProtocolControlMessageWindowAcknowledgementSize`] from the given data.
    pub fn read(data: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(data);
        let acknowledgement_window_size = cursor.read_u32::<BigEndian>()?;

        Ok(Self {
            acknowledgement_window_size,
        })
    }
}

use std::io::{self, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use rand::Rng;
use rtmplex_bytes_util::BytesCursorExt;

use super::current_time;
use super::define::{self, RtmpVersion};

/// Where a [`SimpleHandshakeClient`] is in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClientHandshakeState {
    /// Haven't sent C0/C1 yet.
    WriteC0C1,
    /// Waiting for S0, S1 and S2.
    ReadS0S1S2,
    /// Handshake complete.
    Finish,
}

/// The client side of the simple RTMP handshake.
/// RTMP Spec 1.0 - 5.2
///
/// This never attempts the complex, digest-based handshake: our own
/// [`HandshakeServer`](super::HandshakeServer) falls back to the simple handshake the moment a
/// client's C1 fails digest verification, so a simple client handshake interoperates with it
/// transparently, and is all a publisher talking to this server needs.
pub struct SimpleHandshakeClient {
    state: ClientHandshakeState,
    c1_timestamp: u32,
}

impl Default for SimpleHandshakeClient {
    fn default() -> Self {
        Self {
            state: ClientHandshakeState::WriteC0C1,
            c1_timestamp: 0,
        }
    }
}

impl SimpleHandshakeClient {
    /// Returns true if the handshake is finished.
    pub fn is_finished(&self) -> bool {
        self.state == ClientHandshakeState::Finish
    }

    /// The number of bytes that must be read from the peer before [`Self::handshake`] can make
    /// progress in the current state. Zero while we still have to send C0/C1 first.
    pub fn bytes_needed(&self) -> usize {
        match self.state {
            ClientHandshakeState::WriteC0C1 => 0,
            ClientHandshakeState::ReadS0S1S2 => 1 + define::RTMP_HANDSHAKE_SIZE * 2,
            ClientHandshakeState::Finish => 0,
        }
    }

    /// Perform the handshake, writing to the output and reading from the input.
    pub fn handshake(&mut self, input: &mut io::Cursor<Bytes>, output: &mut Vec<u8>) -> Result<(), crate::error::RtmpError> {
        match self.state {
            ClientHandshakeState::WriteC0C1 => {
                self.write_c0(output)?;
                self.write_c1(output)?;
                self.state = ClientHandshakeState::ReadS0S1S2;
            }
            ClientHandshakeState::ReadS0S1S2 => {
                self.read_s0(input)?;
                let (s1_timestamp, s1_random) = self.read_s1(input)?;
                // We don't validate S2's contents; we only need to consume it off the wire.
                input.extract_bytes(define::RTMP_HANDSHAKE_SIZE)?;

                self.write_c2(output, s1_timestamp, &s1_random)?;
                self.state = ClientHandshakeState::Finish;
            }
            ClientHandshakeState::Finish => {}
        }

        Ok(())
    }

    /// Defined in RTMP Specification 1.0 - 5.2.2
    fn write_c0(&mut self, output: &mut Vec<u8>) -> Result<(), crate::error::RtmpError> {
        output.write_u8(RtmpVersion::Version3.0)?;

        Ok(())
    }

    /// Defined in RTMP Specification 1.0 - 5.2.3
    fn write_c1(&mut self, output: &mut Vec<u8>) -> Result<(), crate::error::RtmpError> {
        self.c1_timestamp = current_time();
        output.write_u32::<BigEndian>(self.c1_timestamp)?;

        // Zero (4 bytes): This field MUST be all 0s.
        output.write_u32::<BigEndian>(0)?;

        let mut rng = rand::rng();
        for _ in 0..1528 {
            output.write_u8(rng.random())?;
        }

        Ok(())
    }

    fn read_s0(&mut self, input: &mut io::Cursor<Bytes>) -> Result<(), crate::error::RtmpError> {
        // We accept whatever version the server selected; we only speak version 3 ourselves.
        input.read_u8()?;

        Ok(())
    }

    fn read_s1(&mut self, input: &mut io::Cursor<Bytes>) -> Result<(u32, Bytes), crate::error::RtmpError> {
        let timestamp = input.read_u32::<BigEndian>()?;

        // Zero (4 bytes), ignored.
        input.read_u32::<BigEndian>()?;

        let random = input.extract_bytes(define::RTMP_HANDSHAKE_SIZE - define::TIME_VERSION_LENGTH)?;

        Ok((timestamp, random))
    }

    /// Defined in RTMP Specification 1.0 - 5.2.4
    fn write_c2(&mut self, output: &mut Vec<u8>, s1_timestamp: u32, s1_random: &[u8]) -> Result<(), crate::error::RtmpError> {
        output.write_u32::<BigEndian>(s1_timestamp)?;
        output.write_u32::<BigEndian>(current_time())?;
        output.write_all(s1_random)?;

        Ok(())
    }
}

//! The RTMP handshake.
//!
//! RTMP Spec 1.0 - 5.2 defines a simple handshake based on an opaque
//! timestamp and random data. Most real-world clients instead perform the
//! "complex" handshake used by Adobe's implementations, which embeds an
//! HMAC-SHA256 digest in C1/S1 so each side can prove it understands the
//! scheme. [`HandshakeServer`] starts out assuming the complex handshake and
//! falls back to the simple one the moment a client's C1 fails digest
//! verification.
//!
//! Order of messages:
//! ```text
//! Client -> C0 -> Server
//! Client -> C1 -> Server
//! Client <- S0 <- Server
//! Client <- S1 <- Server
//! Client <- S2 <- Server
//! Client -> C2 -> Server
//! ```

mod client;
mod define;
pub mod complex;
mod simple;

use std::io;
use std::time::SystemTime;

use bytes::Bytes;

pub use self::client::SimpleHandshakeClient;
pub use self::define::{RTMP_HANDSHAKE_SIZE, RtmpVersion, ServerHandshakeState, TIME_VERSION_LENGTH};
use self::complex::ComplexHandshakeServer;
use self::simple::SimpleHandshakeServer;

/// Current time, in the truncated form used as the handshake's "time" field.
///
/// Neither endpoint relies on this for anything but bandwidth estimation, so
/// any monotonically-useless value is fine; we use nanoseconds since the
/// epoch truncated to 32 bits like most other RTMP implementations.
pub fn current_time() -> u32 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u32)
        .unwrap_or(0)
}

/// Drives the server side of an RTMP handshake, preferring the complex
/// (digest-based) handshake and falling back to the simple one transparently.
pub enum HandshakeServer {
    /// Performing (or finished with) the simple handshake.
    Simple(SimpleHandshakeServer),
    /// Performing (or finished with) the complex handshake.
    Complex(ComplexHandshakeServer),
}

impl Default for HandshakeServer {
    fn default() -> Self {
        Self::Complex(ComplexHandshakeServer::default())
    }
}

impl HandshakeServer {
    /// Returns true once the handshake has completed.
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Simple(handshaker) => handshaker.is_finished(),
            Self::Complex(handshaker) => handshaker.is_finished(),
        }
    }

    /// Feeds `input` through the handshake state machine, appending whatever
    /// response bytes are due to `output`.
    pub fn handshake(&mut self, input: &mut io::Cursor<Bytes>, output: &mut Vec<u8>) -> Result<(), crate::error::RtmpError> {
        match self {
            Self::Complex(handshaker) => {
                // Not every client speaks the complex handshake. If this fails
                // we rewind and retry as a plain simple handshake instead of
                // giving up on the connection.
                let position = input.position();

                if handshaker.handshake(input, output).is_err() {
                    let mut simple = SimpleHandshakeServer::default();

                    input.set_position(position);
                    simple.handshake(input, output)?;

                    *self = Self::Simple(simple);
                }
            }
            Self::Simple(handshaker) => {
                handshaker.handshake(input, output)?;
            }
        }

        Ok(())
    }
}

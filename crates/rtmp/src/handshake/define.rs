//! Constants and small types shared by the simple and complex handshake
//! implementations.

/// Size in bytes of the random data exchanged in C1/S1 and C2/S2, not
/// counting the leading C0/S0 version byte.
///
/// RTMP Spec 1.0 - 5.2.
pub const RTMP_HANDSHAKE_SIZE: usize = 1536;

/// Combined size of the time and version fields at the start of C1/S1.
pub const TIME_VERSION_LENGTH: usize = 8;

nutype_enum::nutype_enum! {
    /// RTMP version advertised in C0/S0.
    pub enum RtmpVersion(u8) {
        /// The only version in active use today, and the only one this
        /// server negotiates to.
        Version3 = 3,
    }
}

/// Where a [`HandshakeServer`](super::HandshakeServer) is in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerHandshakeState {
    /// Waiting for C0 and C1.
    ReadC0C1,
    /// Waiting for C2.
    ReadC2,
    /// Handshake complete.
    Finish,
}

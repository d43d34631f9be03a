//! General RTMP error type.

use crate::chunk::error::ChunkReadError;
use crate::command_messages::error::CommandError;
use crate::handshake::complex::error::ComplexHandshakeError;
use crate::session::client::ClientSessionError;
use crate::session::server::ServerSessionError;
use crate::track::TrackError;

/// RTMP error.
#[derive(Debug, thiserror::Error)]
pub enum RtmpError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Chunk read error.
    #[error("chunk read error: {0}")]
    ChunkRead(#[from] ChunkReadError),
    /// Command error.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
    /// Complex handshake error.
    #[error("complex handshake error: {0}")]
    ComplexHandshake(#[from] ComplexHandshakeError),
    /// Server session error.
    #[error("session error: {0}")]
    Session(#[from] ServerSessionError),
    /// Client session error.
    #[error("client session error: {0}")]
    ClientSession(#[from] ClientSessionError),
    /// Track discovery/emission error.
    #[error("track error: {0}")]
    Track(#[from] TrackError),
}

impl RtmpError {
    /// Returns true if the error indicates that the peer has closed the connection.
    pub fn is_client_closed(&self) -> bool {
        match self {
            Self::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::UnexpectedEof
            ),
            Self::Session(ServerSessionError::Timeout(_)) => true,
            Self::ClientSession(ClientSessionError::Timeout(_) | ClientSessionError::ConnectionClosed) => true,
            _ => false,
        }
    }
}

//! Error type for client sessions.

/// Errors that can occur during a client session.
#[derive(Debug, thiserror::Error)]
pub enum ClientSessionError {
    /// Timeout.
    #[error("timeout: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),
    /// The server closed the connection, or sent something we couldn't parse, before
    /// responding to a command we were waiting on.
    #[error("connection closed while waiting for a response")]
    ConnectionClosed,
    /// The server rejected our `connect` command.
    #[error("server rejected connect: {code}: {description}")]
    ConnectRejected {
        /// The `code` field of the rejecting onStatus/_error response.
        code: String,
        /// The `description` field of the rejecting onStatus/_error response.
        description: String,
    },
    /// The server rejected our `publish` command.
    #[error("server rejected publish: {code}: {description}")]
    PublishRejected {
        /// The `code` field of the rejecting onStatus response.
        code: String,
        /// The `description` field of the rejecting onStatus response.
        description: String,
    },
    /// The server rejected our `play` command.
    #[error("server rejected play: {code}: {description}")]
    PlayRejected {
        /// The `code` field of the rejecting onStatus response.
        code: String,
        /// The `description` field of the rejecting onStatus response.
        description: String,
    },
    /// The server sent us a chunk size we refuse to honor.
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),
    /// The outgoing window-ack window has been exhausted with no `Acknowledge` received from the
    /// peer; writing more data would violate the peer's advertised flow-control window.
    #[error("no acknowledge received within window")]
    FlowControlStalled,
}

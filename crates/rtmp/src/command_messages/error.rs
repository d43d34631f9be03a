//! Errors produced while reading or writing command messages.

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("amf0: {0}")]
    Amf0(#[from] rtmplex_amf0::Amf0Error),
    #[error("no app name of type string in connect command")]
    NoAppName,
    #[error("invalid onStatus info object")]
    InvalidOnStatusInfoObject,
    #[error("this command is only ever sent by a client, the server-side writer can't send it")]
    NoClientImplementation,
    #[error("this command is only ever sent by a server, the client-side writer can't send it")]
    NoServerImplementation,
    #[error("this NetStream command is a playback operation, which this client does not implement")]
    PlaybackNotSupported,
}

//! Error type for track discovery and emission.

/// Errors that can occur while reading or writing codec tracks out of/into RTMP messages.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// Failed to demux the FLV-shaped audio/video tag carried in the message.
    #[error("flv: {0}")]
    Flv(#[from] rtmplex_flv::error::FlvError),
    /// A sequence header parsed as structurally invalid (bad SPS, AAC config, AV1 record, ...).
    #[error("invalid codec config: {0}")]
    CodecConfigInvalid(#[from] std::io::Error),
    /// Failed to encode the `onMetaData`/sequence-header AMF0 payload.
    #[error("amf0: {0}")]
    Amf0(#[from] rtmplex_amf0::Amf0Error),
    /// The metadata-declared or detected codec id has no support in this crate.
    #[error("unsupported codec id: {0}")]
    UnsupportedCodec(u8),
    /// Neither a video nor an audio track could be constructed after the discovery window closed.
    #[error("no supported tracks found")]
    NoSupportedTracks,
}

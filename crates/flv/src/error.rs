/// Errors produced while demuxing FLV tags, headers, and codec payloads.
#[derive(Debug, thiserror::Error)]
pub enum FlvError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid signature in header: 0x{0:x}")]
    InvalidSignature(u32),
    #[error("invalid data offset: {0}")]
    InvalidDataOffset(u32),
    #[error("tag encryption is not supported")]
    UnsupportedTagEncryption,
    #[error("nested multitracks are not allowed")]
    NestedMultitracks,
    #[error("invalid modExData, expected at least {expected_bytes} bytes")]
    InvalidModExData { expected_bytes: usize },
    #[error("amf0: {0}")]
    Amf0(#[from] rtmplex_amf0::Amf0Error),
    #[error("unknown tag type: {0}")]
    UnknownTagType(u8),
}

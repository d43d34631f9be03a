//! Codec track discovery and emission.
//!
//! Bridges FLV-shaped `AUDIODATA`/`VIDEODATA`/`onMetaData` payloads carried in RTMP audio, video
//! and data messages with the codec parameter crates (`h264`, `h265`, `av1`, `aac`). [`TrackReader`]
//! consumes the start of a published stream and discovers codec tracks; [`write_tracks`] does the
//! inverse for a publishing client.

use rtmplex_aac::AudioSpecificConfig;
use rtmplex_av1::AV1CodecConfigurationRecord;
use rtmplex_h264::AVCDecoderConfigurationRecord;
use rtmplex_h265::HEVCDecoderConfigurationRecord;

mod error;
mod reader;
mod writer;

pub use error::TrackError;
pub use reader::TrackReader;
pub use writer::write_tracks;

/// A discovered H.264/AVC video track.
#[derive(Debug, Clone, PartialEq)]
pub struct H264Track {
    /// The AVCC decoder configuration record (contains SPS/PPS).
    pub config: AVCDecoderConfigurationRecord,
}

/// A discovered H.265/HEVC video track.
#[derive(Debug, Clone, PartialEq)]
pub struct H265Track {
    /// The HEVC decoder configuration record (contains VPS/SPS/PPS NAL arrays).
    pub config: HEVCDecoderConfigurationRecord,
}

/// A discovered AV1 video track.
#[derive(Debug, Clone, PartialEq)]
pub struct Av1Track {
    /// The AV1 codec configuration record.
    pub config: AV1CodecConfigurationRecord,
}

/// A discovered video track, tagged by codec.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoTrack {
    /// H.264/AVC.
    H264(H264Track),
    /// H.265/HEVC.
    H265(H265Track),
    /// AV1.
    Av1(Av1Track),
}

/// A discovered AAC audio track.
#[derive(Debug, Clone, PartialEq)]
pub struct AacTrack {
    /// The parsed `AudioSpecificConfig`.
    pub config: AudioSpecificConfig,
}

/// The set of codec tracks discovered for a published stream.
///
/// Either field may be absent: a stream can publish audio only, video only, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tracks {
    /// The video track, if one was discovered.
    pub video: Option<VideoTrack>,
    /// The audio track, if one was discovered.
    pub audio: Option<AacTrack>,
}

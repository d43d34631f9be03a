//! Discovers codec tracks out of a publisher's audio/video/metadata messages.

use bytes::{Buf, Bytes};
use rtmplex_aac::AudioSpecificConfig;
use rtmplex_flv::audio::AudioData;
use rtmplex_flv::audio::body::AudioTagBody;
use rtmplex_flv::audio::body::enhanced::{AudioPacket, ExAudioTagBody};
use rtmplex_flv::audio::body::legacy::LegacyAudioTagBody;
use rtmplex_flv::audio::body::legacy::aac::AacAudioData;
use rtmplex_flv::audio::header::enhanced::AudioFourCc;
use rtmplex_flv::script::ScriptData;
use rtmplex_flv::video::VideoData;
use rtmplex_flv::video::body::VideoTagBody;
use rtmplex_flv::video::body::enhanced::{ExVideoTagBody, VideoPacket, VideoPacketSequenceStart};
use rtmplex_flv::video::body::legacy::LegacyVideoTagBody;
use rtmplex_h265::{HEVCDecoderConfigurationRecord, NaluArray, NaluType};

use super::{AacTrack, Av1Track, H264Track, H265Track, TrackError, Tracks, VideoTrack};

/// The discovery window, in milliseconds of DTS, used when `onMetaData` doesn't arrive (or
/// doesn't arrive before the first audio/video messages).
const DISCOVERY_WINDOW_MS: u32 = 1000;

/// Incrementally discovers [`Tracks`] from the audio, video and data messages of a publishing
/// session.
///
/// Feed it every `AUDIODATA`/`VIDEODATA`/`onMetaData` message in arrival order via
/// [`Self::on_audio`], [`Self::on_video`] and [`Self::on_metadata`]. Once [`Self::is_ready`]
/// returns true, or [`Self::discovery_expired`] does, call [`Self::finish`].
#[derive(Debug, Default)]
pub struct TrackReader {
    tracks: Tracks,
    first_timestamp: Option<u32>,
}

impl TrackReader {
    /// Creates an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tracks discovered so far.
    pub fn tracks(&self) -> &Tracks {
        &self.tracks
    }

    /// True once at least one video or audio track has been discovered.
    pub fn is_ready(&self) -> bool {
        self.tracks.video.is_some() || self.tracks.audio.is_some()
    }

    /// True once the one-second discovery window (§4.7) has elapsed, by DTS, without any track
    /// being discovered.
    pub fn discovery_expired(&self, timestamp: u32) -> bool {
        !self.is_ready() && self.first_timestamp.is_some_and(|first| timestamp.wrapping_sub(first) >= DISCOVERY_WINDOW_MS)
    }

    /// Finalizes discovery, failing if neither a video nor an audio track was found.
    pub fn finish(&self) -> Result<&Tracks, TrackError> {
        if self.is_ready() { Ok(&self.tracks) } else { Err(TrackError::NoSupportedTracks) }
    }

    /// Processes an `onMetaData` (or `@setDataFrame`-wrapped `onMetaData`) data message.
    ///
    /// The actual tracks are still built from sequence headers on the audio/video messages; this
    /// only walks past the wrapper to confirm metadata was present, per §4.7's discovery rule (the
    /// reader widens its fallback window when metadata never arrives at all).
    pub fn on_metadata(&mut self, data: Bytes) -> Result<(), TrackError> {
        let mut cursor = std::io::Cursor::new(data);
        ScriptData::demux(&mut cursor)?;
        Ok(())
    }

    /// Processes an `AUDIODATA` message.
    pub fn on_audio(&mut self, timestamp: u32, data: Bytes) -> Result<(), TrackError> {
        self.note_timestamp(timestamp);

        if self.tracks.audio.is_some() {
            return Ok(());
        }

        let mut cursor = std::io::Cursor::new(data);
        let audio = AudioData::demux(&mut cursor)?;

        let sequence_header = match audio.body {
            AudioTagBody::Legacy(LegacyAudioTagBody::Aac(AacAudioData::SequenceHeader(data))) => Some(data),
            AudioTagBody::Enhanced(ExAudioTagBody::NoMultitrack {
                audio_four_cc: AudioFourCc::Aac,
                packet: AudioPacket::SequenceStart { header_data },
            }) => Some(header_data),
            _ => None,
        };

        if let Some(data) = sequence_header {
            let config = AudioSpecificConfig::parse(data).map_err(TrackError::CodecConfigInvalid)?;
            self.tracks.audio = Some(AacTrack { config });
        }

        Ok(())
    }

    /// Processes a `VIDEODATA` message.
    pub fn on_video(&mut self, timestamp: u32, data: Bytes) -> Result<(), TrackError> {
        self.note_timestamp(timestamp);

        if self.tracks.video.is_some() {
            return Ok(());
        }

        let mut cursor = std::io::Cursor::new(data);
        let video = VideoData::demux(&mut cursor)?;

        match video.body {
            VideoTagBody::Legacy(LegacyVideoTagBody::AvcVideoPacketSeqHdr(config)) => {
                self.tracks.video = Some(VideoTrack::H264(H264Track { config }));
            }
            // OBS pre-29.1 packs VPS+SPS+PPS into an ordinary AVC NALU keyframe instead of a
            // proper sequence header. Detect it by scanning the AVCC payload for HEVC NAL types.
            VideoTagBody::Legacy(LegacyVideoTagBody::Other { data }) => {
                if let Some(config) = scan_avcc_for_hevc_params(&data) {
                    self.tracks.video = Some(VideoTrack::H265(H265Track { config }));
                }
            }
            VideoTagBody::Enhanced(ExVideoTagBody::NoMultitrack {
                packet: VideoPacket::SequenceStart(seq_start),
                ..
            }) => {
                self.tracks.video = match seq_start {
                    VideoPacketSequenceStart::Avc(config) => Some(VideoTrack::H264(H264Track { config })),
                    VideoPacketSequenceStart::Hevc(config) => Some(VideoTrack::H265(H265Track { config })),
                    VideoPacketSequenceStart::Av1(config) => Some(VideoTrack::Av1(Av1Track { config })),
                    VideoPacketSequenceStart::Other(_) => None,
                };
            }
            _ => {}
        }

        Ok(())
    }

    fn note_timestamp(&mut self, timestamp: u32) {
        self.first_timestamp.get_or_insert(timestamp);
    }
}

/// Scans an AVCC length-prefixed NALU payload for HEVC VPS/SPS/PPS, assuming 4-byte NALU
/// lengths (there's no decoder config yet to say otherwise; this matches what OBS itself emits).
///
/// Returns `None` unless all three parameter sets are found, since a partial HEVC config isn't
/// usable by a decoder.
fn scan_avcc_for_hevc_params(data: &Bytes) -> Option<HEVCDecoderConfigurationRecord> {
    let mut vps = Vec::new();
    let mut sps = Vec::new();
    let mut pps = Vec::new();

    let mut reader = std::io::Cursor::new(data.clone());
    while reader.has_remaining() {
        if reader.remaining() < 4 {
            break;
        }
        let len = reader.get_u32() as usize;
        if reader.remaining() < len || len == 0 {
            break;
        }
        let nalu = reader.copy_to_bytes(len);

        match NaluType::from((nalu[0] >> 1) & 0x3F) {
            NaluType::Vps => vps.push(nalu),
            NaluType::Sps => sps.push(nalu),
            NaluType::Pps => pps.push(nalu),
            NaluType::Unknown(_) => {}
        }
    }

    if vps.is_empty() || sps.is_empty() || pps.is_empty() {
        return None;
    }

    Some(HEVCDecoderConfigurationRecord {
        configuration_version: 1,
        general_profile_space: 0,
        general_tier_flag: false,
        general_profile_idc: 0,
        general_profile_compatibility_flags: 0,
        general_constraint_indicator_flags: 0,
        general_level_idc: 0,
        min_spatial_segmentation_idc: 0,
        chroma_format_idc: 0,
        bit_depth_luma_minus8: 0,
        bit_depth_chroma_minus8: 0,
        parallelism_type: 0,
        avg_frame_rate: 0,
        constant_frame_rate: 0,
        num_temporal_layers: 0,
        temporal_id_nested: false,
        length_size_minus_one: 3,
        arrays: vec![
            NaluArray {
                array_completeness: true,
                nal_unit_type: NaluType::Vps,
                nalus: vps,
            },
            NaluArray {
                array_completeness: true,
                nal_unit_type: NaluType::Sps,
                nalus: sps,
            },
            NaluArray {
                array_completeness: true,
                nal_unit_type: NaluType::Pps,
                nalus: pps,
            },
        ],
    })
}

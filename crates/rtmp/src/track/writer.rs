//! Emits `onMetaData` and codec sequence headers for a publishing client.

use bytes::Bytes;
use rtmplex_aac::AudioSpecificConfig;
use rtmplex_amf0::Amf0Value;
use rtmplex_amf0::encoder::Amf0Encoder;
use rtmplex_bytes_util::StringCow;
use rtmplex_h264::AVCDecoderConfigurationRecord;

use super::{TrackError, Tracks, VideoTrack};

/// FLV legacy `VideoCodecId::Avc`.
const VIDEO_CODEC_ID_AVC: f64 = 7.0;
/// FLV legacy `SoundFormat::Aac`.
const AUDIO_CODEC_ID_AAC: f64 = 10.0;

/// Announces `tracks` to a publisher-facing peer: an `@setDataFrame`/`onMetaData` message, then,
/// for whichever tracks can be expressed in the legacy (non-Enhanced) wire format, a sequence
/// header message.
///
/// Returns `(metadata, video_sequence_header, audio_sequence_header)`, any of the latter two being
/// `None` if that track isn't present or can't be expressed without Enhanced RTMP (H.265/AV1
/// announcements are a future extension, per §4.8).
pub fn write_tracks(tracks: &Tracks) -> Result<(Bytes, Option<Bytes>, Option<Bytes>), TrackError> {
    let metadata = encode_on_meta_data(tracks)?;

    let video = match &tracks.video {
        Some(VideoTrack::H264(h264)) if !h264.config.sps.is_empty() && !h264.config.pps.is_empty() => {
            Some(encode_avc_sequence_header(&h264.config)?)
        }
        _ => None,
    };

    let audio = match &tracks.audio {
        Some(aac) => Some(encode_aac_sequence_header(&aac.config)?),
        None => None,
    };

    Ok((metadata, video, audio))
}

fn encode_on_meta_data(tracks: &Tracks) -> Result<Bytes, TrackError> {
    let mut buf = Vec::new();
    let mut encoder = Amf0Encoder::new(&mut buf);

    encoder.encode_string("@setDataFrame")?;
    encoder.encode_string("onMetaData")?;

    let mut fields: Vec<(StringCow, Amf0Value)> = Vec::new();
    if matches!(tracks.video, Some(VideoTrack::H264(_))) {
        fields.push(("videocodecid".into(), Amf0Value::Number(VIDEO_CODEC_ID_AVC)));
    }
    if tracks.audio.is_some() {
        fields.push(("audiocodecid".into(), Amf0Value::Number(AUDIO_CODEC_ID_AAC)));
    }

    encoder.encode_object(&fields.into())?;

    Ok(Bytes::from(buf))
}

/// FLV legacy `VIDEODATA` tag: frame type (keyframe) + codec id (AVC), AVC packet type (sequence
/// header), a zeroed composition time, then the muxed AVCC record.
fn encode_avc_sequence_header(config: &AVCDecoderConfigurationRecord) -> Result<Bytes, TrackError> {
    let mut buf = Vec::with_capacity(5 + config.size() as usize);

    const KEY_FRAME: u8 = 1;
    const CODEC_ID_AVC: u8 = 7;
    const AVC_PACKET_TYPE_SEQ_HDR: u8 = 0;

    buf.push((KEY_FRAME << 4) | CODEC_ID_AVC);
    buf.push(AVC_PACKET_TYPE_SEQ_HDR);
    buf.extend_from_slice(&[0, 0, 0]); // composition time offset

    config.mux(&mut buf).map_err(TrackError::CodecConfigInvalid)?;

    Ok(Bytes::from(buf))
}

/// FLV legacy `AUDIODATA` tag: sound format (AAC) + arbitrary rate/size/type bits (AAC ignores
/// them, the `AudioSpecificConfig` carries the real values), AAC packet type (sequence header),
/// then the muxed `AudioSpecificConfig`.
fn encode_aac_sequence_header(config: &AudioSpecificConfig) -> Result<Bytes, TrackError> {
    let mut buf = Vec::with_capacity(2 + config.size() as usize);

    const SOUND_FORMAT_AAC: u8 = 10;
    const SOUND_RATE_44K: u8 = 3;
    const SOUND_SIZE_16_BIT: u8 = 1;
    const SOUND_TYPE_STEREO: u8 = 1;
    const AAC_PACKET_TYPE_SEQ_HDR: u8 = 0;

    buf.push((SOUND_FORMAT_AAC << 4) | (SOUND_RATE_44K << 2) | (SOUND_SIZE_16_BIT << 1) | SOUND_TYPE_STEREO);
    buf.push(AAC_PACKET_TYPE_SEQ_HDR);

    config.mux(&mut buf).map_err(TrackError::CodecConfigInvalid)?;

    Ok(Bytes::from(buf))
}

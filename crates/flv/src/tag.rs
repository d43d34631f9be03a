//! FLV tags.

use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use bytes::Bytes;
use rtmplex_bytes_util::BytesCursorExt;

use crate::audio::AudioData;
use crate::error::FlvError;
use crate::script::ScriptData;
use crate::video::VideoData;

/// The body of an [`FlvTag`], dispatched on the tag-type byte.
///
/// Defined by:
/// - Legacy FLV spec, Annex E.4
#[derive(Debug, Clone, PartialEq)]
pub enum FlvTagData<'a> {
    /// `AUDIODATA`.
    Audio(AudioData),
    /// `VIDEODATA`.
    Video(VideoData),
    /// `SCRIPTDATAOBJECT`.
    ScriptData(ScriptData<'a>),
    /// A tag type this demuxer doesn't recognize.
    Unknown {
        /// The raw tag-type byte.
        tag_type: u8,
        /// The tag body, unparsed.
        data: Bytes,
    },
}

/// A single FLV tag: the 11-byte tag header plus its type-dependent body.
///
/// Defined by:
/// - Legacy FLV spec, Annex E.4.1
#[derive(Debug, Clone, PartialEq)]
pub struct FlvTag<'a> {
    /// The timestamp of the tag, in milliseconds.
    ///
    /// This is the 24-bit `Timestamp` field combined with the 8-bit `TimestampExtended` field,
    /// forming a single 32-bit value per the legacy spec.
    pub timestamp_ms: u32,
    /// The stream id the tag belongs to. Always 0 in practice.
    pub stream_id: u32,
    /// The body of the tag.
    pub data: FlvTagData<'a>,
}

impl FlvTag<'_> {
    /// Demux a single [`FlvTag`] from the given reader.
    ///
    /// The reader must be positioned at the start of a tag header (i.e. just after the
    /// `PreviousTagSize` field of the preceding tag, if any).
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> Result<Self, FlvError> {
        let tag_type = reader.read_u8()?;
        let data_size = reader.read_u24::<BigEndian>()?;
        let timestamp = reader.read_u24::<BigEndian>()?;
        let timestamp_extended = reader.read_u8()?;
        let timestamp = (u32::from(timestamp_extended) << 24) | timestamp;
        let stream_id = reader.read_u24::<BigEndian>()?;

        let body = reader.extract_bytes(data_size as usize)?;
        let mut body_reader = io::Cursor::new(body);

        let data = match tag_type {
            8 => FlvTagData::Audio(AudioData::demux(&mut body_reader)?),
            9 => FlvTagData::Video(VideoData::demux(&mut body_reader)?),
            18 => FlvTagData::ScriptData(ScriptData::demux(&mut body_reader)?),
            _ => FlvTagData::Unknown {
                tag_type,
                data: body_reader.extract_remaining(),
            },
        };

        Ok(FlvTag {
            timestamp_ms: timestamp,
            stream_id,
            data,
        })
    }
}

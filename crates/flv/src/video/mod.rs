use std::io;

use body::VideoTagBody;
use bytes::Bytes;
use header::VideoTagHeader;

use crate::error::FlvError;

pub mod body;
pub mod header;

/// FLV `VIDEODATA` tag
///
/// This is a container for video data.
/// This enum contains the data for the different types of video tags.
/// Defined by:
/// - video_file_format_spec_v10.pdf (Chapter 1 - The FLV File Format - Video tags)
/// - video_file_format_spec_v10_1.pdf (Annex E.4.3.1 - VIDEODATA)
#[derive(Debug, Clone, PartialEq)]
pub struct VideoData {
    /// The header of the video data.
    pub header: VideoTagHeader,
    /// The body of the video data.
    pub body: VideoTagBody,
}

impl VideoData {
    /// Demux a video data from the given reader
    #[allow(clippy::unusual_byte_groupings)]
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> Result<Self, FlvError> {
        let header = VideoTagHeader::demux(reader)?;
        let body = VideoTagBody::demux(&header, reader)?;

        Ok(VideoData { header, body })
    }
}

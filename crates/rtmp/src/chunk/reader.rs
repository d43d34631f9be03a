//! Reading [`Chunk`]s out of a byte buffer.

use std::cmp::min;
use std::collections::HashMap;
use std::io::{Cursor, Seek, SeekFrom};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use bytes::BytesMut;

use super::define::{Chunk, ChunkBasicHeader, ChunkMessageHeader, ChunkType, INIT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use super::error::ChunkReadError;
use crate::messages::MessageType;

// Limits on memory used for partial/previous chunk bookkeeping. Under normal
// operation we should never come close to these; they exist to bound a
// malicious peer's ability to make us allocate without bound.
const MAX_PARTIAL_CHUNK_SIZE: usize = 10 * 1024 * 1024;
const MAX_PREVIOUS_CHUNK_HEADERS: usize = 100;
const MAX_PARTIAL_CHUNK_COUNT: usize = 4;

/// Reads chunks out of a buffer supplied by the caller.
///
/// The caller owns the receive buffer; each call to [`ChunkReader::read_chunk`] consumes
/// as many leading bytes as make up a complete chunk and leaves the rest untouched. A
/// return of `Ok(None)` means the buffer doesn't yet hold a full chunk; the caller should
/// read more bytes off the socket and try again.
pub struct ChunkReader {
    /// Chunk stream id -> most recent message header seen on that stream. Needed because
    /// Type1/Type2/Type3 headers are deltas against the previous header.
    previous_chunk_headers: HashMap<u32, ChunkMessageHeader>,

    /// (chunk stream id, message stream id) -> accumulated payload of an in-progress message
    /// that spans more than one chunk.
    partial_chunks: HashMap<(u32, u32), BytesMut>,

    max_chunk_size: usize,
}

impl Default for ChunkReader {
    fn default() -> Self {
        Self {
            previous_chunk_headers: HashMap::new(),
            partial_chunks: HashMap::new(),
            max_chunk_size: INIT_CHUNK_SIZE,
        }
    }
}

impl ChunkReader {
    /// Applies a peer-requested chunk size change.
    ///
    /// Returns `false` if the requested size is out of the accepted range, in which case the
    /// connection should be closed.
    pub fn update_max_chunk_size(&mut self, chunk_size: usize) -> bool {
        if !(INIT_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
            false
        } else {
            self.max_chunk_size = chunk_size;
            true
        }
    }

    /// Attempts to read a single chunk out of `buf`, consuming the bytes it used.
    ///
    /// Returns `Ok(None)` if there isn't enough data yet; the caller should wait for more
    /// bytes and call again. Returns `Err` only for protocol violations; the connection
    /// should be closed in that case.
    pub fn read_chunk(&mut self, buf: &mut BytesMut) -> Result<Option<Chunk>, ChunkReadError> {
        loop {
            let mut cursor = Cursor::new(&buf[..]);

            let header = match self.read_basic_header(&mut cursor) {
                Ok(header) => header,
                Err(None) => return Ok(None),
                Err(Some(err)) => return Err(err),
            };

            let message_header = match self.read_message_header(&header, &mut cursor) {
                Ok(message_header) => message_header,
                Err(None) => return Ok(None),
                Err(Some(err)) => return Err(err),
            };

            let (payload_start, payload_end) = match self.payload_range(&header, &message_header, &mut cursor) {
                Ok(range) => range,
                Err(None) => return Ok(None),
                Err(Some(err)) => return Err(err),
            };

            let consumed = cursor.position() as usize;
            if consumed > buf.len() {
                return Ok(None);
            }

            let data = buf.split_to(consumed).freeze();
            let payload = data.slice(payload_start..payload_end);

            let count = if self.previous_chunk_headers.contains_key(&header.chunk_stream_id) {
                self.previous_chunk_headers.len()
            } else {
                self.previous_chunk_headers.len() + 1
            };

            if count > MAX_PREVIOUS_CHUNK_HEADERS {
                return Err(ChunkReadError::TooManyPreviousChunkHeaders);
            }

            self.previous_chunk_headers
                .insert(header.chunk_stream_id, message_header.clone());

            if payload.len() == message_header.msg_length as usize {
                return Ok(Some(Chunk {
                    basic_header: header,
                    message_header,
                    payload,
                }));
            }

            let key = (header.chunk_stream_id, message_header.msg_stream_id);
            let partial_chunk = match self.partial_chunks.get_mut(&key) {
                Some(partial_chunk) => partial_chunk,
                None => {
                    if self.partial_chunks.len() >= MAX_PARTIAL_CHUNK_COUNT {
                        return Err(ChunkReadError::TooManyPartialChunks);
                    }

                    self.partial_chunks.insert(key, BytesMut::new());
                    self.partial_chunks.get_mut(&key).expect("we just inserted it")
                }
            };

            let length = {
                if partial_chunk.len() + payload.len() > MAX_PARTIAL_CHUNK_SIZE {
                    return Err(ChunkReadError::PartialChunkTooLarge(partial_chunk.len() + payload.len()));
                }

                partial_chunk.extend_from_slice(&payload[..]);
                partial_chunk.len()
            };

            if length == message_header.msg_length as usize {
                return Ok(Some(Chunk {
                    basic_header: header,
                    message_header,
                    payload: self.partial_chunks.remove(&key).unwrap().freeze(),
                }));
            }

            // Not enough of this message yet. Loop again: there may be another, unrelated
            // chunk already buffered that we can return instead of stalling.
        }
    }

    fn read_basic_header(&self, cursor: &mut Cursor<&[u8]>) -> Result<ChunkBasicHeader, Option<ChunkReadError>> {
        let byte = cursor.read_u8().map_err(|_| None)?;
        let format = ChunkType::from_byte(byte >> 6);

        let chunk_stream_id = match (byte & 0b0011_1111) as u32 {
            0 => 64 + cursor.read_u8().map_err(|_| None)? as u32,
            1 => 64 + cursor.read_u8().map_err(|_| None)? as u32 + cursor.read_u8().map_err(|_| None)? as u32 * 256,
            csid => csid,
        };

        Ok(ChunkBasicHeader { chunk_stream_id, format })
    }

    fn read_message_header(
        &self,
        header: &ChunkBasicHeader,
        cursor: &mut Cursor<&[u8]>,
    ) -> Result<ChunkMessageHeader, Option<ChunkReadError>> {
        match header.format {
            ChunkType::Type0 => {
                let timestamp = cursor.read_u24::<BigEndian>().map_err(|_| None)?;
                let msg_length = cursor.read_u24::<BigEndian>().map_err(|_| None)?;
                if msg_length as usize > MAX_PARTIAL_CHUNK_SIZE {
                    return Err(Some(ChunkReadError::PartialChunkTooLarge(msg_length as usize)));
                }

                let msg_type_id = MessageType(cursor.read_u8().map_err(|_| None)?);
                let msg_stream_id = cursor.read_u32::<LittleEndian>().map_err(|_| None)?;

                if timestamp == 0xFFFFFF {
                    return Err(Some(ChunkReadError::ExtendedTimestampUnsupported));
                }

                Ok(ChunkMessageHeader {
                    timestamp,
                    msg_length,
                    msg_type_id,
                    msg_stream_id,
                    was_extended_timestamp: false,
                })
            }
            ChunkType::Type1 => {
                let timestamp_delta = cursor.read_u24::<BigEndian>().map_err(|_| None)?;
                let msg_length = cursor.read_u24::<BigEndian>().map_err(|_| None)?;
                if msg_length as usize > MAX_PARTIAL_CHUNK_SIZE {
                    return Err(Some(ChunkReadError::PartialChunkTooLarge(msg_length as usize)));
                }

                let msg_type_id = MessageType(cursor.read_u8().map_err(|_| None)?);

                if timestamp_delta == 0xFFFFFF {
                    return Err(Some(ChunkReadError::ExtendedTimestampUnsupported));
                }

                let previous_header = self
                    .previous_chunk_headers
                    .get(&header.chunk_stream_id)
                    .ok_or(ChunkReadError::MissingPreviousChunkHeader(header.chunk_stream_id))?;

                let timestamp = previous_header.timestamp.checked_add(timestamp_delta).unwrap_or_else(|| {
                    tracing::warn!(
                        previous = previous_header.timestamp,
                        delta = timestamp_delta,
                        "chunk timestamp overflow, clamping to previous value"
                    );
                    previous_header.timestamp
                });

                Ok(ChunkMessageHeader {
                    timestamp,
                    msg_length,
                    msg_type_id,
                    msg_stream_id: previous_header.msg_stream_id,
                    was_extended_timestamp: false,
                })
            }
            ChunkType::Type2 => {
                let timestamp_delta = cursor.read_u24::<BigEndian>().map_err(|_| None)?;

                if timestamp_delta == 0xFFFFFF {
                    return Err(Some(ChunkReadError::ExtendedTimestampUnsupported));
                }

                let previous_header = self
                    .previous_chunk_headers
                    .get(&header.chunk_stream_id)
                    .ok_or(ChunkReadError::MissingPreviousChunkHeader(header.chunk_stream_id))?;

                let timestamp = previous_header
                    .timestamp
                    .checked_add(timestamp_delta)
                    .ok_or_else(|| ChunkReadError::TimestampOverflow(previous_header.timestamp, timestamp_delta))?;

                Ok(ChunkMessageHeader {
                    timestamp,
                    msg_length: previous_header.msg_length,
                    msg_type_id: previous_header.msg_type_id,
                    msg_stream_id: previous_header.msg_stream_id,
                    was_extended_timestamp: false,
                })
            }
            ChunkType::Type3 => {
                let previous_header = self
                    .previous_chunk_headers
                    .get(&header.chunk_stream_id)
                    .ok_or(ChunkReadError::MissingPreviousChunkHeader(header.chunk_stream_id))?
                    .clone();

                Ok(previous_header)
            }
        }
    }

    fn payload_range(
        &self,
        header: &ChunkBasicHeader,
        message_header: &ChunkMessageHeader,
        cursor: &mut Cursor<&[u8]>,
    ) -> Result<(usize, usize), Option<ChunkReadError>> {
        let key = (header.chunk_stream_id, message_header.msg_stream_id);

        let remaining = message_header.msg_length as usize - self.partial_chunks.get(&key).map(BytesMut::len).unwrap_or(0);
        let need = min(remaining, self.max_chunk_size);

        let pos = cursor.position() as usize;
        if need > cursor.get_ref().len().saturating_sub(pos) {
            return Err(None);
        }
        cursor.seek(SeekFrom::Current(need as i64)).map_err(|_| None)?;

        Ok((pos, pos + need))
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn reads_a_single_type0_chunk() {
        let mut reader = ChunkReader::default();

        #[rustfmt::skip]
        let mut buf = BytesMut::from(&[
            0x03, // fmt 0, csid 3
            0x00, 0x00, 0x00, // timestamp
            0x00, 0x00, 0x04, // message length
            0x14, // CommandAMF0
            0x00, 0x00, 0x00, 0x00, // msg stream id
            0xDE, 0xAD, 0xBE, 0xEF,
        ][..]);

        let chunk = reader.read_chunk(&mut buf).unwrap().unwrap();
        assert_eq!(chunk.basic_header.chunk_stream_id, 3);
        assert_eq!(chunk.message_header.msg_length, 4);
        assert_eq!(chunk.payload, Bytes::from_static(&[0xDE, 0xAD, 0xBE, 0xEF]));
        assert!(buf.is_empty());
    }

    #[test]
    fn waits_for_more_data() {
        let mut reader = ChunkReader::default();
        let mut buf = BytesMut::from(&[0x03, 0x00, 0x00][..]);
        assert!(reader.read_chunk(&mut buf).unwrap().is_none());
    }

    #[test]
    fn reassembles_a_multi_chunk_message() {
        let mut reader = ChunkReader::default();
        reader.update_max_chunk_size(4);

        #[rustfmt::skip]
        let mut buf = BytesMut::from(&[
            0x03,
            0x00, 0x00, 0x00,
            0x00, 0x00, 0x08, // 8 byte message split across two 4 byte chunks
            0x14,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x02, 0x03,
        ][..]);
        assert!(reader.read_chunk(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&[
            0xC3, // fmt 3, csid 3
            0x04, 0x05, 0x06, 0x07,
        ]);

        let chunk = reader.read_chunk(&mut buf).unwrap().unwrap();
        assert_eq!(chunk.payload, Bytes::from_static(&[0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]));
    }

    #[test]
    fn type3_without_a_previous_header_errors() {
        let mut reader = ChunkReader::default();
        let mut buf = BytesMut::from(&[0xC3][..]);
        assert!(matches!(
            reader.read_chunk(&mut buf),
            Err(ChunkReadError::MissingPreviousChunkHeader(3))
        ));
    }

    #[test]
    fn type0_extended_timestamp_is_rejected() {
        let mut reader = ChunkReader::default();

        #[rustfmt::skip]
        let mut buf = BytesMut::from(&[
            0x03, // fmt 0, csid 3
            0xFF, 0xFF, 0xFF, // timestamp marker: extended timestamp follows
            0x00, 0x00, 0x04, // message length
            0x14, // CommandAMF0
            0x00, 0x00, 0x00, 0x00, // msg stream id
            0x00, 0x00, 0x00, 0x01, // extended timestamp (not supported)
            0xDE, 0xAD, 0xBE, 0xEF,
        ][..]);

        assert!(matches!(
            reader.read_chunk(&mut buf),
            Err(ChunkReadError::ExtendedTimestampUnsupported)
        ));
    }

    #[test]
    fn type2_extended_timestamp_delta_is_rejected() {
        let mut reader = ChunkReader::default();

        #[rustfmt::skip]
        let mut buf = BytesMut::from(&[
            0x03, // fmt 0, csid 3
            0x00, 0x00, 0x00, // timestamp
            0x00, 0x00, 0x04, // message length
            0x14, // CommandAMF0
            0x00, 0x00, 0x00, 0x00, // msg stream id
            0xDE, 0xAD, 0xBE, 0xEF,
        ][..]);
        reader.read_chunk(&mut buf).unwrap().unwrap();

        #[rustfmt::skip]
        let mut buf = BytesMut::from(&[
            0x83, // fmt 2, csid 3
            0xFF, 0xFF, 0xFF, // timestamp delta marker: extended timestamp follows
        ][..]);

        assert!(matches!(
            reader.read_chunk(&mut buf),
            Err(ChunkReadError::ExtendedTimestampUnsupported)
        ));
    }

    #[test]
    fn extended_csid_is_decoded() {
        let mut reader = ChunkReader::default();

        #[rustfmt::skip]
        let mut buf = BytesMut::from(&[
            0x00, 0x00, // fmt 0, csid 0 -> extended csid 64
            0x00, 0x00, 0x00,
            0x00, 0x00, 0x01,
            0x14,
            0x00, 0x00, 0x00, 0x00,
            0xAB,
        ][..]);

        let chunk = reader.read_chunk(&mut buf).unwrap().unwrap();
        assert_eq!(chunk.basic_header.chunk_stream_id, 64);
    }
}

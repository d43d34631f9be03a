//! Chunking: splitting RTMP messages into chunks for the wire, and reassembling them.
//!
//! Legacy RTMP spec, 5.3.

pub mod define;
pub mod error;
pub mod reader;
pub mod writer;

pub use define::{CHUNK_SIZE, CHUNK_STREAM_ID_AUDIO, CHUNK_STREAM_ID_COMMAND, CHUNK_STREAM_ID_VIDEO, Chunk};
pub use error::ChunkReadError;
pub use reader::ChunkReader;
pub use writer::ChunkWriter;

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

mod chunk;
mod command_messages;
mod error;
mod handshake;
mod messages;
mod protocol_control_messages;
mod session;
mod track;
mod user_control_messages;

pub use error::RtmpError;
pub use session::{ClientSession, ClientSessionData, ClientSessionError, ServerSession, ServerSessionError, SessionData, SessionHandler};
pub use track::{AacTrack, Av1Track, H264Track, H265Track, TrackError, TrackReader, Tracks, VideoTrack};

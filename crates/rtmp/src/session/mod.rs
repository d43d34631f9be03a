//! High-level API to drive RTMP sessions.

pub mod client;
pub mod server;

pub use client::{ClientSession, ClientSessionData, ClientSessionError};
pub use server::{ServerSession, ServerSessionError, SessionData, SessionHandler};

//! NetConnection command messages.

use std::borrow::Cow;
use std::fmt;

use rtmplex_amf0::{Amf0Object, Amf0Value};
use serde::de::{MapAccess, Visitor};
use serde_derive::Serialize;

use super::on_status::codes::NET_CONNECTION_CONNECT_SUCCESS;
use crate::command_messages::CommandResultLevel;

pub mod reader;
pub mod writer;

/// NetConnection command `connect`.
///
/// Defined by:
/// - Legacy RTMP spec, 7.2.1.1
/// - Enhanced RTMP spec, page 36-37, Enhancing NetConnection connect Command
#[derive(Debug, Clone, PartialEq)]
pub struct NetConnectionCommandConnect<'a> {
    /// Tells the server application name the client is connected to.
    pub app: Cow<'a, str>,
    /// represents capability flags which can be combined via a
    /// Bitwise OR to indicate which extended set of capabilities (i.e.,
    /// beyond the legacy RTMP specification) are supported via E-RTMP.
    /// See enum [`CapsExMask`] for the enumerated values representing the
    /// assigned bits.
    pub caps_ex: Option<CapsExMask>,
    /// All other parameters.
    ///
    /// Defined by:
    /// - Legacy RTMP spec, page 30
    /// - Enhanced RTMP spec, page 36-37
    pub others: Amf0Object<'a>,
}

/// Extended capabilities mask used by the [enhanced connect command](NetConnectionCommandConnect).
#[bitmask_enum::bitmask(u8)]
pub enum CapsExMask {
    /// Support for reconnection
    Reconnect = 0x01,
    /// Support for multitrack
    Multitrack = 0x02,
    /// Can parse ModEx signal
    ModEx = 0x04,
    /// Support for nano offset
    TimestampNanoOffset = 0x08,
}

impl<'de> serde::de::Deserialize<'de> for NetConnectionCommandConnect<'de> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ConnectVisitor;

        impl<'de> Visitor<'de> for ConnectVisitor {
            type Value = NetConnectionCommandConnect<'de>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a connect command object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut app = None;
                let mut caps_ex = None;
                let mut others = Vec::new();

                while let Some(key) = map.next_key::<rtmplex_bytes_util::StringCow<'de>>()? {
                    match key.as_str() {
                        "app" => app = Some(map.next_value()?),
                        "capsEx" => {
                            let bits: f64 = map.next_value()?;
                            caps_ex = Some(CapsExMask::from(bits as u8));
                        }
                        _ => {
                            let value = map.next_value::<Amf0Value<'de>>()?;
                            others.push((key, value));
                        }
                    }
                }

                let app = app.ok_or_else(|| serde::de::Error::missing_field("app"))?;

                Ok(NetConnectionCommandConnect {
                    app,
                    caps_ex,
                    others: others.into(),
                })
            }
        }

        deserializer.deserialize_map(ConnectVisitor)
    }
}

/// The `properties` object of a [`NetConnectionCommandConnectResult`].
///
/// Defined by:
/// - Legacy RTMP spec, 7.2.1.1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetConnectionCommandConnectProperties<'a> {
    /// Flash Media Server version.
    ///
    /// Usually set to "FMS/3,0,1,123".
    #[serde(rename = "fmsVer")]
    pub fmsver: Cow<'a, str>,
    /// No idea what this means, but it is used by other media servers as well.
    ///
    /// Usually set to 31.0.
    pub capabilities: f64,
}

impl Default for NetConnectionCommandConnectProperties<'_> {
    fn default() -> Self {
        Self {
            fmsver: Cow::Borrowed("FMS/3,0,1,123"),
            capabilities: 31.0,
        }
    }
}

/// The `information` object of a [`NetConnectionCommandConnectResult`].
///
/// Defined by:
/// - Legacy RTMP spec, 7.2.1.1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetConnectionCommandConnectInformation<'a> {
    /// Result level.
    pub level: CommandResultLevel,
    /// Result code.
    ///
    /// Usually set to [`NET_CONNECTION_CONNECT_SUCCESS`].
    pub code: Cow<'a, str>,
    /// Result description.
    ///
    /// Usually set to "Connection Succeeded.".
    pub description: Cow<'a, str>,
    /// Not sure what this means but it may stand for the AMF encoding version.
    ///
    /// Usually set to 0.0.
    #[serde(rename = "objectEncoding")]
    pub encoding: f64,
}

impl Default for NetConnectionCommandConnectInformation<'_> {
    fn default() -> Self {
        Self {
            level: CommandResultLevel::Status,
            code: Cow::Borrowed(NET_CONNECTION_CONNECT_SUCCESS),
            description: Cow::Borrowed("Connection Succeeded."),
            encoding: 0.0,
        }
    }
}

/// NetConnection command `connect` result.
///
/// Defined by:
/// - Legacy RTMP spec, 7.2.1.1
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetConnectionCommandConnectResult<'a> {
    /// The `properties` object (server/FMS version info).
    pub properties: NetConnectionCommandConnectProperties<'a>,
    /// The `information` object (result level, code, description).
    pub information: NetConnectionCommandConnectInformation<'a>,
}

/// NetConnection commands as defined in 7.2.1.
#[derive(Debug, Clone, PartialEq)]
pub enum NetConnectionCommand<'a> {
    /// Connect command.
    Connect(NetConnectionCommandConnect<'a>),
    /// Connect result.
    ///
    /// Sent from server to client in response to [`NetConnectionCommand::Connect`].
    ConnectResult(NetConnectionCommandConnectResult<'a>),
    /// Call command.
    Call,
    /// Close command.
    Close,
    /// Create stream command.
    CreateStream,
    /// Create stream result.
    ///
    /// Sent from server to client in response to [`NetConnectionCommand::CreateStream`].
    CreateStreamResult {
        /// ID of the created stream.
        stream_id: f64,
    },
    /// `releaseStream` command.
    ///
    /// Sent by a publishing client before `createStream`, asking the server to free up the
    /// stream key from any stale publisher still holding it. No response is expected.
    ReleaseStream {
        /// The stream key to release.
        stream_key: Cow<'a, str>,
    },
    /// `FCPublish` command.
    ///
    /// A legacy Flash Media Server command that publishing clients (and most modern encoders,
    /// for compatibility) send right after `releaseStream` and before `createStream`. No
    /// response is expected.
    FcPublish {
        /// The stream key about to be published.
        stream_key: Cow<'a, str>,
    },
}

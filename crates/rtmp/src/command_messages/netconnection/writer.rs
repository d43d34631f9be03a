//! Writing [`NetConnectionCommand`].

use std::borrow::Cow;
use std::io;

use rtmplex_amf0::Amf0Value;
use rtmplex_amf0::encoder::Amf0Encoder;

use super::{NetConnectionCommand, NetConnectionCommandConnectResult};
use crate::command_messages::error::CommandError;

impl NetConnectionCommand<'_> {
    /// Writes a [`NetConnectionCommand`] to the given writer.
    pub fn write(self, buf: &mut impl io::Write, transaction_id: f64) -> Result<(), CommandError> {
        let mut encoder = Amf0Encoder::new(buf);

        match self {
            Self::ConnectResult(NetConnectionCommandConnectResult { properties, information }) => {
                encoder.encode_string("_result")?;
                encoder.encode_number(transaction_id)?;
                encoder.serialize(&properties)?;
                encoder.serialize(&information)?;
            }
            Self::CreateStreamResult { stream_id } => {
                encoder.encode_string("_result")?;
                encoder.encode_number(transaction_id)?;
                encoder.encode_null()?;
                encoder.encode_number(stream_id)?;
            }
            Self::Connect(..) | Self::Call | Self::Close | Self::CreateStream | Self::ReleaseStream { .. } | Self::FcPublish { .. } => {
                return Err(CommandError::NoClientImplementation);
            }
        }

        Ok(())
    }

    /// Writes the variants of a [`NetConnectionCommand`] that a client, rather than a
    /// server, sends.
    pub fn write_client(&self, buf: &mut impl io::Write, transaction_id: f64) -> Result<(), CommandError> {
        let mut encoder = Amf0Encoder::new(buf);

        match self {
            Self::Connect(connect) => {
                encoder.encode_string("connect")?;
                encoder.encode_number(transaction_id)?;

                let mut object: Vec<_> = vec![("app".into(), Amf0Value::String(connect.app.as_ref().to_owned().into()))];

                if let Some(caps_ex) = connect.caps_ex {
                    object.push(("capsEx".into(), Amf0Value::Number(caps_ex.bits() as f64)));
                }

                object.extend(connect.others.iter().cloned());

                encoder.encode_object(&Cow::Owned(object))?;
            }
            Self::CreateStream => {
                encoder.encode_string("createStream")?;
                encoder.encode_number(transaction_id)?;
                encoder.encode_null()?;
            }
            Self::ReleaseStream { stream_key } => {
                encoder.encode_string("releaseStream")?;
                encoder.encode_number(transaction_id)?;
                encoder.encode_null()?;
                encoder.encode_string(stream_key.as_ref())?;
            }
            Self::FcPublish { stream_key } => {
                encoder.encode_string("FCPublish")?;
                encoder.encode_number(transaction_id)?;
                encoder.encode_null()?;
                encoder.encode_string(stream_key.as_ref())?;
            }
            Self::Call | Self::Close | Self::ConnectResult(..) | Self::CreateStreamResult { .. } => {
                return Err(CommandError::NoServerImplementation);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod client_tests {
    use bytes::{BufMut, BytesMut};
    use rtmplex_amf0::Amf0Value;
    use rtmplex_amf0::decoder::Amf0Decoder;

    use super::*;
    use crate::command_messages::netconnection::NetConnectionCommandConnect;

    #[test]
    fn test_write_client_connect() {
        let mut buf = BytesMut::new();

        NetConnectionCommand::Connect(NetConnectionCommandConnect {
            app: "live".into(),
            caps_ex: None,
            others: Cow::Owned(Vec::new()),
        })
        .write_client(&mut (&mut buf).writer(), 1.0)
        .expect("write");

        let mut deserializer = Amf0Decoder::from_buf(buf.freeze());
        let values = deserializer.decode_all().unwrap();

        assert_eq!(values.len(), 3);
        assert_eq!(values[0], Amf0Value::String("connect".into()));
        assert_eq!(values[1], Amf0Value::Number(1.0));
        assert_eq!(
            values[2],
            Amf0Value::Object(Cow::Owned(vec![("app".into(), Amf0Value::String("live".into()))]))
        );
    }

    #[test]
    fn test_write_client_create_stream() {
        let mut buf = BytesMut::new();

        NetConnectionCommand::CreateStream
            .write_client(&mut (&mut buf).writer(), 4.0)
            .expect("write");

        let mut deserializer = Amf0Decoder::from_buf(buf.freeze());
        let values = deserializer.decode_all().unwrap();

        assert_eq!(values.len(), 3);
        assert_eq!(values[0], Amf0Value::String("createStream".into()));
        assert_eq!(values[1], Amf0Value::Number(4.0));
        assert_eq!(values[2], Amf0Value::Null);
    }

    #[test]
    fn test_write_client_release_stream() {
        let mut buf = BytesMut::new();

        NetConnectionCommand::ReleaseStream {
            stream_key: "stream-key".into(),
        }
        .write_client(&mut (&mut buf).writer(), 2.0)
        .expect("write");

        let mut deserializer = Amf0Decoder::from_buf(buf.freeze());
        let values = deserializer.decode_all().unwrap();

        assert_eq!(values.len(), 4);
        assert_eq!(values[0], Amf0Value::String("releaseStream".into()));
        assert_eq!(values[1], Amf0Value::Number(2.0));
        assert_eq!(values[2], Amf0Value::Null);
        assert_eq!(values[3], Amf0Value::String("stream-key".into()));
    }

    #[test]
    fn test_write_client_fc_publish() {
        let mut buf = BytesMut::new();

        NetConnectionCommand::FcPublish {
            stream_key: "stream-key".into(),
        }
        .write_client(&mut (&mut buf).writer(), 3.0)
        .expect("write");

        let mut deserializer = Amf0Decoder::from_buf(buf.freeze());
        let values = deserializer.decode_all().unwrap();

        assert_eq!(values.len(), 4);
        assert_eq!(values[0], Amf0Value::String("FCPublish".into()));
        assert_eq!(values[1], Amf0Value::Number(3.0));
        assert_eq!(values[2], Amf0Value::Null);
        assert_eq!(values[3], Amf0Value::String("stream-key".into()));
    }

    #[test]
    fn test_write_client_rejects_server_only_variants() {
        let mut buf = Vec::new();

        let err = NetConnectionCommand::CreateStreamResult { stream_id: 1.0 }
            .write_client(&mut buf, 1.0)
            .unwrap_err();

        assert!(matches!(err, CommandError::NoServerImplementation));
    }
}

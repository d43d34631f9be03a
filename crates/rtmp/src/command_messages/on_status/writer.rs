//! Writing [`OnStatus`].

use std::io;

use rtmplex_amf0::Amf0Value;
use serde::Serialize;

use super::OnStatus;
use crate::command_messages::error::CommandError;

impl OnStatus<'_> {
    /// Writes an [`OnStatus`] command to the given writer.
    pub fn write(self, buf: &mut impl io::Write, transaction_id: f64) -> Result<(), CommandError> {
        let mut serializer = rtmplex_amf0::Amf0Encoder::new(buf);

        "onStatus".serialize(&mut serializer)?;
        transaction_id.serialize(&mut serializer)?;
        // command object is null
        ().serialize(&mut serializer)?;

        let mut info_object = Vec::new();

        info_object.push(("level".into(), Amf0Value::String(self.level.to_string().into())));
        info_object.push(("code".into(), Amf0Value::String(self.code.into())));

        if let Some(description) = self.description {
            info_object.push(("description".into(), Amf0Value::String(description)));
        }

        if let Some(others) = self.others {
            info_object.extend(others.into_owned());
        }

        info_object.serialize(&mut serializer)?;

        Ok(())
    }
}

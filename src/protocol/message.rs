//! Live Link messages

use std::sync::Arc;

use crate::amf::AmfValue;
use crate::error::ProtocolError;
use crate::subject::{FrameUpdate, SubjectSchema};

use super::constants::*;

/// A message sent from the producer to the consumer
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Connection greeting
    Hello { interface: String, version: i32 },

    /// A subject's schema, either freshly declared or replayed
    Subject(Arc<SubjectSchema>),

    /// One frame of a registered subject
    Frame(FrameUpdate),

    /// Producer is closing the link
    Goodbye { interface: String },
}

impl Message {
    /// Command name on the wire
    pub fn command(&self) -> &'static str {
        match self {
            Message::Hello { .. } => CMD_HELLO,
            Message::Subject(_) => CMD_SUBJECT,
            Message::Frame(_) => CMD_FRAME,
            Message::Goodbye { .. } => CMD_GOODBYE,
        }
    }

    /// Name of the subject this message is about, if any
    pub fn subject_name(&self) -> Option<&str> {
        match self {
            Message::Subject(schema) => Some(schema.name()),
            Message::Frame(frame) => Some(frame.subject()),
            Message::Hello { .. } | Message::Goodbye { .. } => None,
        }
    }

    /// AMF0 values making up the message body
    pub fn to_amf(&self) -> Vec<AmfValue> {
        let body = match self {
            Message::Hello { interface, version } => AmfValue::object()
                .with("interface", interface.as_str())
                .with("version", *version)
                .build(),
            Message::Subject(schema) => schema.to_amf(),
            Message::Frame(frame) => frame.to_amf(),
            Message::Goodbye { interface } => AmfValue::object()
                .with("interface", interface.as_str())
                .build(),
        };

        vec![AmfValue::String(self.command().to_string()), body]
    }
}

/// A decoded message as seen by a consumer
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub command: String,
    pub body: AmfValue,
}

impl RawMessage {
    /// Subject name carried in the body, if any
    pub fn subject(&self) -> Option<&str> {
        self.body.get_string("subject")
    }
}

impl TryFrom<Vec<AmfValue>> for RawMessage {
    type Error = ProtocolError;

    fn try_from(values: Vec<AmfValue>) -> Result<Self, Self::Error> {
        let mut values = values.into_iter();

        let command = match values.next() {
            Some(AmfValue::String(command)) => command,
            Some(other) => {
                return Err(ProtocolError::UnexpectedMessage(format!(
                    "expected command name, got {:?}",
                    other
                )))
            }
            None => return Err(ProtocolError::UnexpectedMessage("empty message".into())),
        };

        let body = values.next().unwrap_or_default();
        if values.next().is_some() {
            return Err(ProtocolError::UnexpectedMessage(format!(
                "trailing values after {} body",
                command
            )));
        }

        Ok(Self { command, body })
    }
}

//! Messages exchanged between the widget controller and the embedded frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error text signatures that indicate a bad bot id rather than a transient
/// failure.
const CONFIGURATION_ERROR_SIGNATURES: [&str; 2] = ["Bot not found", "not configured"];

/// A fire-and-forget message on the cross-document channel. There are no
/// sequence numbers or acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// frame → controller: the frame loaded its bot configuration.
    #[serde(rename = "CHATBOT_READY")]
    Ready,
    #[serde(rename = "CHATBOT_OPEN")]
    Open,
    #[serde(rename = "CHATBOT_CLOSE")]
    Close,
    #[serde(rename = "CHATBOT_MINIMIZE")]
    Minimize,
    /// controller → frame: inject a user message.
    #[serde(rename = "CHATBOT_SEND_MESSAGE")]
    SendMessage {
        #[serde(default)]
        message: String,
    },
    /// frame → controller: informational echo of a sent message.
    #[serde(rename = "CHATBOT_MESSAGE_SENT")]
    MessageSent {
        #[serde(default)]
        message: String,
    },
    /// frame → controller: user-visible failure description.
    #[serde(rename = "CHATBOT_ERROR")]
    Error {
        #[serde(default)]
        error: String,
    },
}

impl ControlMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            ControlMessage::Ready => "CHATBOT_READY",
            ControlMessage::Open => "CHATBOT_OPEN",
            ControlMessage::Close => "CHATBOT_CLOSE",
            ControlMessage::Minimize => "CHATBOT_MINIMIZE",
            ControlMessage::SendMessage { .. } => "CHATBOT_SEND_MESSAGE",
            ControlMessage::MessageSent { .. } => "CHATBOT_MESSAGE_SENT",
            ControlMessage::Error { .. } => "CHATBOT_ERROR",
        }
    }

    /// Decode arbitrary event data. Anything that is not a recognised
    /// control message yields `None`.
    pub fn from_value(data: &Value) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

pub fn is_configuration_error(error: &str) -> bool {
    CONFIGURATION_ERROR_SIGNATURES
        .iter()
        .any(|signature| error.contains(signature))
}

//! Gateway wire format: inbound client frames and outbound server envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// Display name used when a `join` frame carries no `user`.
pub const DEFAULT_USER_NAME: &str = "Usuário";

// ---------------------------------------------------------------------------
// Client → Server message
// ---------------------------------------------------------------------------

/// A message received from the client over WebSocket.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Join(JoinPayload),
    Message(ChatPayload),
}

impl ClientMessage {
    /// Parse a raw text frame.
    ///
    /// The `type` field is checked before the rest of the payload so that an
    /// unknown type is reported as such rather than as a shape mismatch.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::InvalidJson)?;

        let kind = match value.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            _ => return Err(ProtocolError::MissingType),
        };

        match kind.as_str() {
            "join" => serde_json::from_value(value)
                .map(ClientMessage::Join)
                .map_err(|source| ProtocolError::InvalidPayload { kind: kind.clone(), source }),
            "message" => serde_json::from_value(value)
                .map(ClientMessage::Message)
                .map_err(|source| ProtocolError::InvalidPayload { kind: kind.clone(), source }),
            _ => Err(ProtocolError::UnknownType(kind.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// JOIN payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JoinPayload {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

// ---------------------------------------------------------------------------
// MESSAGE payload
// ---------------------------------------------------------------------------

/// Sender fields are taken from the frame as-is; the server does not look
/// them up from the session.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

// ---------------------------------------------------------------------------
// Server → Client message
// ---------------------------------------------------------------------------

/// A message sent from the server to the client over WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum ServerMessage {
    System(SystemEvent),
    Message(ChatEvent),
    Participants(Vec<Profile>),
}

/// A system notice such as "X entrou na conversa.".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemEvent {
    pub text: String,
    pub time: i64,
}

/// A chat line with a snapshot of its sender.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub time: i64,
}

/// One roster entry in a `participants` broadcast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub user: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl SystemEvent {
    pub fn joined(display_name: &str, time: i64) -> Self {
        Self {
            text: format!("{display_name} entrou na conversa."),
            time,
        }
    }

    /// First-person notice sent only to the joining connection.
    pub fn welcome(time: i64) -> Self {
        Self {
            text: "Entraste no Buddy Chat.".to_string(),
            time,
        }
    }

    pub fn left(display_name: &str, time: i64) -> Self {
        Self {
            text: format!("{display_name} saiu da conversa."),
            time,
        }
    }
}

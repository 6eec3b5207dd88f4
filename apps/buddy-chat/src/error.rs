use thiserror::Error;

/// Why an inbound frame was dropped.
///
/// None of these are reported to the client; the hub logs them and keeps the
/// connection in its current state.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("frame has no string `type` field")]
    MissingType,

    #[error("unknown frame type `{0}`")]
    UnknownType(String),

    #[error("malformed `{kind}` payload: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A failed delivery to a single connection.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("failed to serialize outbound message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("connection {0} is closed")]
    Closed(String),
}

//! Best-effort delivery of server messages to registered connections.
//!
//! Messages are serialized once and the same frame is queued on every
//! recipient. A closed or failing recipient is skipped; delivery to the others
//! carries on.

use std::sync::Arc;

use crate::error::SendError;

use super::events::ServerMessage;
use super::registry::SessionRegistry;
use super::session::{ConnectionHandle, ConnectionId, Frame};

fn encode(message: &ServerMessage) -> Result<Frame, SendError> {
    Ok(Arc::from(serde_json::to_string(message)?))
}

/// Deliver `message` to a single connection.
pub fn send_to(connection: &ConnectionHandle, message: &ServerMessage) -> Result<(), SendError> {
    connection.send_frame(encode(message)?)
}

/// Deliver `message` to every open session in the registry, except the one
/// whose connection is `exclude`. Returns the number of connections reached.
pub fn broadcast(
    registry: &SessionRegistry,
    message: &ServerMessage,
    exclude: Option<&ConnectionId>,
) -> usize {
    let frame = match encode(message) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::error!(%err, "dropping unserializable broadcast");
            return 0;
        }
    };

    let mut delivered = 0;
    for session in registry.iter() {
        let connection = &session.connection;
        if exclude == Some(connection.id()) || !connection.is_open() {
            continue;
        }
        match connection.send_frame(frame.clone()) {
            Ok(()) => delivered += 1,
            Err(err) => {
                tracing::debug!(conn_id = %connection.id(), %err, "skipping recipient");
            }
        }
    }
    delivered
}

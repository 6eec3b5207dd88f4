//! Per-connection handles, connection lifecycle, and participant identity.

use std::fmt;
use std::sync::Arc;

use buddy_common::id::{prefix, PrefixedId};
use tokio::sync::mpsc;

use crate::error::SendError;

use super::events::Profile;

/// Serialized outbound frame, shared between every recipient of a broadcast.
pub type Frame = Arc<str>;

/// Unique identifier of one WebSocket connection (`conn_` prefixed ULID).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl PrefixedId for ConnectionId {
    const PREFIX: &'static str = prefix::CONNECTION;
}

impl ConnectionId {
    pub fn new() -> Self {
        Self(Self::generate())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sending half of a connection's outbound queue.
///
/// The receiving half is drained by the connection's writer task; once that
/// task exits the handle reports itself closed.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Frame>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<Frame>) -> Self {
        Self { id, tx }
    }

    /// Create a handle with a fresh id together with the receiver its writer
    /// task should drain.
    pub fn open() -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(ConnectionId::new(), tx), rx)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queue an already-serialized frame. Never blocks.
    pub fn send_frame(&self, frame: Frame) -> Result<(), SendError> {
        self.tx
            .send(frame)
            .map_err(|_| SendError::Closed(self.id.to_string()))
    }
}

/// Lifecycle of a connection as seen by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accepted but has not sent `join` yet. Receives no broadcasts.
    Unjoined,
    Joined,
    /// Terminal.
    Closed,
}

/// A participant's profile, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// May be empty; empty emails collide into a single identity.
    pub email: String,
    pub display_name: String,
    pub avatar: Option<String>,
}

impl Identity {
    pub fn profile(&self) -> Profile {
        Profile {
            user: self.display_name.clone(),
            email: self.email.clone(),
            picture: self.avatar.clone(),
        }
    }
}

/// An identity bound to its current connection.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub connection: ConnectionHandle,
}

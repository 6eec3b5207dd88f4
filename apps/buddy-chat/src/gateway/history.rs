//! Append-only conversation history, replayed to every joining connection.

use super::events::{ChatEvent, ServerMessage, SystemEvent};
use super::fanout;
use super::session::ConnectionHandle;

/// A stored event. Immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    System(SystemEvent),
    Chat(ChatEvent),
}

impl HistoryEntry {
    /// The envelope this entry is replayed in.
    pub fn to_message(&self) -> ServerMessage {
        match self {
            HistoryEntry::System(event) => ServerMessage::System(event.clone()),
            HistoryEntry::Chat(event) => ServerMessage::Message(event.clone()),
        }
    }
}

/// In-memory log in append order. Unbounded.
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Send every stored entry, oldest first, to one connection.
    ///
    /// Stops early if the connection goes away mid-replay. Returns the number
    /// of entries queued.
    pub fn replay(&self, connection: &ConnectionHandle) -> usize {
        for (sent, entry) in self.entries.iter().enumerate() {
            if let Err(err) = fanout::send_to(connection, &entry.to_message()) {
                tracing::debug!(conn_id = %connection.id(), %err, "history replay aborted");
                return sent;
            }
        }
        self.entries.len()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

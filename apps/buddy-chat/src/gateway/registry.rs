//! Session registry: one active session per email, in join order.

use super::events::Profile;
use super::session::{ConnectionHandle, ConnectionId, Identity, Session};

/// Result of [`SessionRegistry::join`].
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// `false` when an existing session was taken over by a new connection.
    pub is_new: bool,
    pub session: Session,
}

/// Active sessions in insertion order.
///
/// Owned by the hub task and only touched from there, so it needs no locking.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `identity` to `connection`.
    ///
    /// An existing session with the same email keeps its roster position; its
    /// connection is replaced and its profile refreshed.
    pub fn join(&mut self, identity: Identity, connection: ConnectionHandle) -> JoinOutcome {
        if let Some(existing) = self
            .sessions
            .iter_mut()
            .find(|s| s.identity.email == identity.email)
        {
            existing.identity = identity;
            existing.connection = connection;
            return JoinOutcome {
                is_new: false,
                session: existing.clone(),
            };
        }

        let session = Session {
            identity,
            connection,
        };
        self.sessions.push(session.clone());
        JoinOutcome {
            is_new: true,
            session,
        }
    }

    /// Remove the session whose *current* connection is `connection_id`.
    ///
    /// Returns `None` when no session matches, which is the case for a
    /// connection that never joined or was superseded by a reconnect.
    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<Session> {
        let index = self
            .sessions
            .iter()
            .position(|s| s.connection.id() == connection_id)?;
        Some(self.sessions.remove(index))
    }

    pub fn get(&self, email: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.identity.email == email)
    }

    /// Roster snapshot for a `participants` broadcast.
    pub fn list_profiles(&self) -> Vec<Profile> {
        self.sessions.iter().map(|s| s.identity.profile()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

//! The chat hub: owns sessions and history and applies connection events one
//! at a time.
//!
//! Every connection task forwards its lifecycle and inbound frames to a single
//! hub task over an unbounded queue. Each event runs to completion (registry
//! mutation, history append, fanout) before the next one is taken, which is
//! what keeps history order, replay order and roster snapshots consistent
//! without locks.

use std::collections::HashMap;

use buddy_common::now_millis;
use tokio::sync::mpsc;

use super::events::{
    ChatEvent, ChatPayload, ClientMessage, JoinPayload, ServerMessage, SystemEvent,
    DEFAULT_USER_NAME,
};
use super::fanout;
use super::history::{HistoryEntry, HistoryLog};
use super::registry::SessionRegistry;
use super::responder;
use super::session::{ConnectionHandle, ConnectionId, ConnectionState, Identity};

/// How the scripted responder presents itself in chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotProfile {
    /// Also the mention token, prefixed with `@`.
    pub name: String,
    pub email: String,
}

/// Input to the hub task.
#[derive(Debug)]
pub enum HubEvent {
    Connected(ConnectionHandle),
    Frame { conn_id: ConnectionId, text: String },
    Closed(ConnectionId),
}

struct ConnectionEntry {
    handle: ConnectionHandle,
    state: ConnectionState,
}

/// Session registry, history log and connection table, plus the protocol
/// state machine that drives them.
pub struct ChatHub {
    bot: BotProfile,
    registry: SessionRegistry,
    history: HistoryLog,
    connections: HashMap<ConnectionId, ConnectionEntry>,
}

impl ChatHub {
    pub fn new(bot: BotProfile) -> Self {
        Self {
            bot,
            registry: SessionRegistry::new(),
            history: HistoryLog::new(),
            connections: HashMap::new(),
        }
    }

    /// Move the hub onto its own task. The task stops once every
    /// [`HubHandle`] has been dropped.
    pub fn spawn(mut self) -> HubHandle {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                self.handle_event(event);
            }
            tracing::info!(
                history = self.history.len(),
                sessions = self.registry.len(),
                "chat hub stopped"
            );
        });
        HubHandle { tx }
    }

    pub fn handle_event(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connected(handle) => self.connect(handle),
            HubEvent::Frame { conn_id, text } => self.receive(&conn_id, &text),
            HubEvent::Closed(conn_id) => self.close(&conn_id),
        }
    }

    pub fn connect(&mut self, handle: ConnectionHandle) {
        tracing::debug!(conn_id = %handle.id(), "connection registered");
        self.connections.insert(
            handle.id().clone(),
            ConnectionEntry {
                handle,
                state: ConnectionState::Unjoined,
            },
        );
    }

    /// Handle one inbound text frame. Bad input is logged and dropped.
    pub fn receive(&mut self, conn_id: &ConnectionId, text: &str) {
        let state = self.connection_state(conn_id);
        let message = match ClientMessage::parse(text) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(%conn_id, %err, "dropping inbound frame");
                return;
            }
        };

        match (state, message) {
            (ConnectionState::Unjoined, ClientMessage::Join(payload)) => self.join(conn_id, payload),
            (ConnectionState::Joined, ClientMessage::Message(payload)) => self.chat(payload),
            (state, ClientMessage::Join(_)) => {
                tracing::warn!(%conn_id, ?state, "ignoring join on a connection that is not unjoined");
            }
            (state, ClientMessage::Message(_)) => {
                tracing::warn!(%conn_id, ?state, "ignoring chat message before join");
            }
        }
    }

    /// Handle the transport reporting that a connection is gone.
    pub fn close(&mut self, conn_id: &ConnectionId) {
        match self.connections.remove(conn_id) {
            Some(entry) => {
                tracing::debug!(%conn_id, from = ?entry.state, "connection closed");
            }
            None => tracing::debug!(%conn_id, "close for unknown connection"),
        }

        // Superseded connections no longer own a session; their close is silent.
        let Some(session) = self.registry.remove(conn_id) else {
            return;
        };

        tracing::info!(
            %conn_id,
            email = %session.identity.email,
            remaining = self.registry.len(),
            "participant left"
        );

        let left = SystemEvent::left(&session.identity.display_name, now_millis());
        self.history.append(HistoryEntry::System(left.clone()));
        fanout::broadcast(&self.registry, &ServerMessage::System(left), None);
        self.broadcast_roster();
    }

    /// Current state of a connection. Connections the hub no longer tracks
    /// are reported as closed.
    pub fn connection_state(&self, conn_id: &ConnectionId) -> ConnectionState {
        self.connections
            .get(conn_id)
            .map(|entry| entry.state)
            .unwrap_or(ConnectionState::Closed)
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    fn join(&mut self, conn_id: &ConnectionId, payload: JoinPayload) {
        let Some(handle) = self.connections.get(conn_id).map(|e| e.handle.clone()) else {
            return;
        };

        let identity = self.identity_for(payload);
        let outcome = self.registry.join(identity, handle.clone());
        let identity = &outcome.session.identity;

        // Replay before anything new is sent so the joiner sees prior events
        // first and its own join notice after them.
        let replayed = self.history.replay(&handle);

        if outcome.is_new {
            let now = now_millis();
            let joined = SystemEvent::joined(&identity.display_name, now);
            self.history.append(HistoryEntry::System(joined.clone()));

            if let Err(err) = fanout::send_to(&handle, &ServerMessage::System(SystemEvent::welcome(now))) {
                tracing::debug!(%conn_id, %err, "failed to send welcome");
            }
            fanout::broadcast(&self.registry, &ServerMessage::System(joined), Some(conn_id));

            tracing::info!(
                %conn_id,
                email = %identity.email,
                user = %identity.display_name,
                replayed,
                "participant joined"
            );
        } else {
            tracing::info!(
                %conn_id,
                email = %identity.email,
                replayed,
                "participant reconnected"
            );
        }

        self.broadcast_roster();

        if let Some(entry) = self.connections.get_mut(conn_id) {
            entry.state = ConnectionState::Joined;
        }
    }

    /// Build the identity for a join. On reconnect, fields the frame leaves
    /// out keep their stored values.
    fn identity_for(&self, payload: JoinPayload) -> Identity {
        let email = payload.email.unwrap_or_default();
        let user = payload.user.filter(|u| !u.is_empty());

        match self.registry.get(&email) {
            Some(existing) => Identity {
                display_name: user.unwrap_or_else(|| existing.identity.display_name.clone()),
                avatar: payload.picture.or_else(|| existing.identity.avatar.clone()),
                email,
            },
            None => Identity {
                display_name: user.unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
                avatar: payload.picture,
                email,
            },
        }
    }

    fn chat(&mut self, payload: ChatPayload) {
        let event = ChatEvent {
            user: payload.user,
            email: payload.email,
            picture: payload.picture,
            text: payload.text,
            time: now_millis(),
        };

        let reply = event
            .text
            .as_deref()
            .filter(|text| responder::mentions(text, &self.bot.name))
            .map(responder::reply);

        self.publish(event);

        if let Some(reply) = reply {
            tracing::debug!(animation = reply.animation, "bot mentioned");
            self.publish(ChatEvent {
                user: Some(self.bot.name.clone()),
                email: Some(self.bot.email.clone()),
                picture: Some(reply.animation.to_string()),
                text: Some(reply.text.to_string()),
                time: now_millis(),
            });
        }
    }

    /// Append a chat line and echo it to everyone, sender included.
    fn publish(&mut self, event: ChatEvent) {
        self.history.append(HistoryEntry::Chat(event.clone()));
        fanout::broadcast(&self.registry, &ServerMessage::Message(event), None);
    }

    fn broadcast_roster(&self) {
        let roster = self.registry.list_profiles();
        tracing::debug!(count = roster.len(), "broadcasting participants");
        fanout::broadcast(&self.registry, &ServerMessage::Participants(roster), None);
    }
}

/// Cloneable sender into the hub task. Stored in `AppState`.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubEvent>,
}

impl HubHandle {
    /// Register a freshly accepted connection. Returns `false` if the hub has
    /// stopped.
    pub fn connect(&self, handle: ConnectionHandle) -> bool {
        self.send(HubEvent::Connected(handle))
    }

    pub fn frame(&self, conn_id: &ConnectionId, text: String) -> bool {
        self.send(HubEvent::Frame {
            conn_id: conn_id.clone(),
            text,
        })
    }

    pub fn closed(&self, conn_id: &ConnectionId) -> bool {
        self.send(HubEvent::Closed(conn_id.clone()))
    }

    fn send(&self, event: HubEvent) -> bool {
        if self.tx.send(event).is_err() {
            tracing::warn!("chat hub is not running");
            return false;
        }
        true
    }
}

use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::models::ServerEvent;

/// Outbound handle for one connection. The socket task drains the
/// receiving end into the websocket sink, so sends never block.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

struct ConnectionEntry {
    sender: EventSender,
    room: Option<String>,
}

/// Live connections and the room each one is currently joined to.
///
/// The registry is the anchor for teardown: a connection is registered on
/// transport handshake and unregistered exactly once on disconnect,
/// whether or not it ever joined a room.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    pub fn register(&mut self, connection_id: &str, sender: EventSender) {
        self.connections
            .insert(connection_id.to_string(), ConnectionEntry { sender, room: None });
    }

    /// Remove a connection, returning the room it was still joined to.
    pub fn unregister(&mut self, connection_id: &str) -> Option<String> {
        self.connections
            .remove(connection_id)
            .and_then(|entry| entry.room)
    }

    pub fn current_room(&self, connection_id: &str) -> Option<String> {
        self.connections
            .get(connection_id)
            .and_then(|entry| entry.room.clone())
    }

    pub fn set_room(&mut self, connection_id: &str, room: Option<String>) {
        if let Some(entry) = self.connections.get_mut(connection_id) {
            entry.room = room;
        }
    }

    pub fn sender(&self, connection_id: &str) -> Option<&EventSender> {
        self.connections.get(connection_id).map(|entry| &entry.sender)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn joined_count(&self) -> usize {
        self.connections
            .values()
            .filter(|entry| entry.room.is_some())
            .count()
    }
}
